//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! View/operation starts
//!     → Scope::new() + scope.guard() held by the owner
//!     → requests issued through ShortlyClient::with_scope(scope)
//! Owner dropped
//!     → ScopeGuard::drop cancels the scope
//!     → in-flight requests resolve with ApiError::Cancelled
//! ```
//!
//! # Design Decisions
//! - Cancellation is structured: it follows ownership, not fire-and-forget
//! - A cancelled request is never retried

pub mod scope;

pub use scope::{Scope, ScopeGuard};
