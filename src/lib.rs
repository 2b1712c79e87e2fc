// relief-dashboard - Resource distribution and dashboard-state orchestration
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
