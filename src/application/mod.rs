// Application layer - Orchestration services over the relief API port
pub mod allocation_service;
pub mod dashboard_service;
pub mod error;
pub mod notifier;
pub mod relief_api;
pub mod request_service;
pub mod session;
pub mod single_flight;

#[cfg(test)]
pub mod fake_api;
