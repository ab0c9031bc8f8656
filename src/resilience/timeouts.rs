//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap a request future with a deadline
//! - Race it against the owning scope's cancellation
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the timer is dropped with the future
//!   on every path
//! - Timeout errors are distinct from transport errors

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::error::{ApiError, ApiResult};
use crate::lifecycle::Scope;

/// Run `fut` with a deadline, failing with [`ApiError::Timeout`] when it
/// elapses and [`ApiError::Cancelled`] when `scope` is cancelled first.
pub async fn with_deadline<F, T>(deadline: Duration, scope: Option<&Scope>, fut: F) -> ApiResult<T>
where
    F: Future<Output = ApiResult<T>>,
{
    let timed = async {
        match timeout(deadline, fut).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout(deadline)),
        }
    };

    match scope {
        Some(scope) => {
            if scope.is_cancelled() {
                return Err(ApiError::Cancelled);
            }
            tokio::select! {
                result = timed => result,
                _ = scope.cancelled() => Err(ApiError::Cancelled),
            }
        }
        None => timed.await,
    }
}
