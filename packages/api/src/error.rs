use notes::StoreError;
use thiserror::Error;

/// Errors from account calls.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Rejected on the client before any request was sent.
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Store(StoreError::Unauthorized))
    }

    /// Text for the form's error banner.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Store(StoreError::Unauthorized) => {
                "Invalid username or password".to_string()
            }
            ApiError::Store(err) => match err.detail() {
                Some(detail) if !detail.is_empty() => detail.to_string(),
                _ if err.is_retryable() => {
                    "Unable to reach the server. Please try again.".to_string()
                }
                _ => "Something went wrong. Please try again.".to_string(),
            },
        }
    }
}
