//! Error taxonomy for the API-access layer.

use std::time::Duration;
use thiserror::Error;

use crate::session::storage::PersistenceError;
use crate::validation::ValidationError;

/// Errors that can occur while talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response arrived before the deadline.
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Network unreachable, DNS failure, connection reset, etc.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Body was not valid JSON when JSON was expected.
    #[error("Malformed response: {reason} (body: {body})")]
    MalformedResponse { reason: String, body: String },

    /// HTTP status outside the success range.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Rejected on the client before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Local session storage could not be read or written.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// The owning scope was cancelled while the request was in flight.
    #[error("Request cancelled")]
    Cancelled,

    /// The request could not be assembled (bad URL, bad header value).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Whether the failure is worth retrying under the `transient` retry mode.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Timeout(_) | ApiError::Transport(_) => true,
            ApiError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Failures a resource client folds into a `Failure` outcome instead of
    /// returning to its caller.
    pub fn is_network_failure(&self) -> bool {
        matches!(
            self,
            ApiError::Timeout(_)
                | ApiError::Transport(_)
                | ApiError::MalformedResponse { .. }
                | ApiError::Http { .. }
        )
    }

    /// HTTP status, if the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            ApiError::InvalidRequest(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
