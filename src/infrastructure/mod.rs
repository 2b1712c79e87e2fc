// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod dto;
pub mod http_api;
