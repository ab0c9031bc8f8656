//! Client library for the Shortly short-video backend.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod models;
pub mod observability;
pub mod resilience;
pub mod resources;
pub mod session;
pub mod validation;

pub use client::ShortlyClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use lifecycle::{Scope, ScopeGuard};
pub use resources::{LikeState, Outcome};
pub use session::{SessionEvent, SessionPhase, SessionStore};
pub use validation::ValidationError;
