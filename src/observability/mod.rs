//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway handler and relay produce:
//!     → logging.rs (structured log events, request id in every line)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows from the request-id layer into every log line
//! - Credential values are never logged, only how many were offered
//! - Metric calls are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
