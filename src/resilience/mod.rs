//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → retries.rs (sequential attempts with backoff)
//!         → timeouts.rs (deadline + scope cancellation per attempt)
//!     → On failure: backoff.rs computes the next delay
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every request has a deadline
//! - Retry classification is a config switch, not hard-coded
//! - All resilience logic is plain async functions, composable by callers

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{retry, RetryPolicy};
pub use timeouts::with_deadline;
