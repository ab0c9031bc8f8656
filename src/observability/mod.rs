//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms via the metrics facade)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request attempt
//! - Metrics are cheap and can be disabled from config

pub mod logging;
pub mod metrics;
