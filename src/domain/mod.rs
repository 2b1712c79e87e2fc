// Domain layer - Relief coordination models and pure rules
pub mod notification;
pub mod request;
pub mod resource;
pub mod role;
pub mod snapshot;
pub mod validation;
