// Presentation layer - JSON surface consumed by the dashboard views
pub mod app_state;
pub mod handlers;
pub mod router;
