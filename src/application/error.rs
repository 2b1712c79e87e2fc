// Error taxonomy for API calls and user workflows
use crate::domain::validation::FieldErrorMap;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server responded with status {status}")]
    Status { status: u16, message: Option<String> },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("session has been closed")]
    Closed,
}

impl ApiError {
    /// Message the backend put in its error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }

    /// Server message verbatim, else the given generic notice.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorkflowError {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(FieldErrorMap),

    #[error("unable to determine resource type for {0}")]
    UnresolvableType(String),

    #[error("{0} is already in progress")]
    Busy(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}
