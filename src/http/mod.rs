//! HTTP access subsystem.
//!
//! # Data Flow
//! ```text
//! Resource client operation
//!     → endpoints.rs (logical operation → URL)
//!     → request.rs (headers, bearer token, body, request ID)
//!     → client.rs (deadline + scope, send, read text, retry)
//!     → response.rs (status check, envelope unwrapping)
//!     → Payload back to the resource client
//! ```

pub mod client;
pub mod endpoints;
pub mod request;
pub mod response;

pub use client::ApiClient;
pub use endpoints::Endpoint;
pub use request::{ApiRequest, FilePart, MultipartBody, RequestBody, X_REQUEST_ID};
pub use response::{normalize, ApiEnvelope, Payload, RawResponse};
