//! Resource clients.
//!
//! # Data Flow
//! ```text
//! Caller
//!     → resource client (validate input, require token where needed)
//!     → ApiClient::call (retry → build → deadline → normalize)
//!     → Payload mapped into the operation's type
//!     → Outcome::Success | Outcome::Failure
//! ```
//!
//! # Design Decisions
//! - Network-level failures become `Outcome::Failure` with a displayable
//!   message; local problems (validation, persistence, cancellation) stay
//!   `Err` so callers cannot mistake them for a server answer
//! - Each client is a short-lived borrow of [`ShortlyClient`](crate::ShortlyClient)

pub mod auth;
pub mod comment;
pub mod likes;
pub mod search;
pub mod subscription;
pub mod user;
pub mod video;

pub use auth::AuthClient;
pub use comment::CommentClient;
pub use likes::{LikeState, LikeTicket, LikeTracker, Settled};
pub use search::SearchClient;
pub use subscription::SubscriptionClient;
pub use user::UserClient;
pub use video::VideoClient;

use crate::error::{ApiError, ApiResult};
use crate::http::Payload;

/// Result of a resource operation that reached (or tried to reach) the
/// backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success { message: String, data: T },
    Failure { message: String },
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Outcome::Success { message, .. } | Outcome::Failure { message } => message,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Outcome::Success { data, .. } => Some(data),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Outcome::Success { data, .. } => Some(data),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success { message, data } => Outcome::Success { message, data: f(data) },
            Outcome::Failure { message } => Outcome::Failure { message },
        }
    }
}

/// Fold a call result into an [`Outcome`].
///
/// `default_message` is used when the server sent no message of its own.
pub(crate) fn fold<T>(
    operation: &str,
    result: ApiResult<Payload>,
    default_message: &str,
    map: impl FnOnce(Payload) -> ApiResult<T>,
) -> ApiResult<Outcome<T>> {
    let payload = match result {
        Ok(payload) => payload,
        Err(e) => return failure_or_err(operation, e),
    };

    if let Some(message) = payload.rejection() {
        tracing::warn!(operation, message = %message, "Backend rejected request");
        return Ok(Outcome::Failure { message });
    }

    let message = payload.message().unwrap_or(default_message).to_string();
    match map(payload) {
        Ok(data) => Ok(Outcome::Success { message, data }),
        Err(e) => failure_or_err(operation, e),
    }
}

fn failure_or_err<T>(operation: &str, error: ApiError) -> ApiResult<Outcome<T>> {
    if error.is_network_failure() {
        tracing::warn!(operation, error = %error, "Operation failed");
        Ok(Outcome::Failure { message: error.to_string() })
    } else {
        Err(error)
    }
}

/// Discard whatever the payload carried.
pub(crate) fn ignore(_: Payload) -> ApiResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;
    use serde_json::json;

    #[test]
    fn test_fold_success_uses_server_message() {
        let payload = Payload::Data { message: "fetched".into(), data: json!([1]) };
        let outcome = fold("op", Ok(payload), "default", |p| p.decode::<Vec<i64>>()).unwrap();
        assert_eq!(outcome, Outcome::Success { message: "fetched".into(), data: vec![1] });
    }

    #[test]
    fn test_fold_default_message() {
        let outcome = fold("op", Ok(Payload::Bare(json!({}))), "Done", ignore).unwrap();
        assert_eq!(outcome.message(), "Done");
        assert!(outcome.is_success());
    }

    #[test]
    fn test_fold_network_failure() {
        let err = ApiError::Http { status: 400, message: "Already subscribed".into() };
        let outcome = fold("op", Err(err), "Done", ignore).unwrap();
        assert_eq!(outcome, Outcome::Failure { message: "Already subscribed".into() });
    }

    #[test]
    fn test_fold_rejection_in_ok_status() {
        let payload = Payload::Envelope(json!({"success": false, "message": "nope"}));
        let outcome = fold("op", Ok(payload), "Done", ignore).unwrap();
        assert_eq!(outcome.message(), "nope");
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_fold_local_errors_propagate() {
        let result = fold("op", Err(ApiError::Cancelled), "Done", ignore);
        assert!(matches!(result, Err(ApiError::Cancelled)));

        let result = fold("op", Err(ValidationError::LoginRequired.into()), "Done", ignore);
        assert!(matches!(result, Err(ApiError::Validation(ValidationError::LoginRequired))));
    }

    #[test]
    fn test_outcome_map() {
        let outcome = Outcome::Success { message: "m".into(), data: 2 }.map(|n| n * 2);
        assert_eq!(outcome.into_data(), Some(4));
        let failed: Outcome<i32> = Outcome::Failure { message: "x".into() };
        assert_eq!(failed.map(|n| n + 1).data(), None);
    }
}
