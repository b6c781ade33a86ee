//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! Validated request + chosen credential
//!     → dispatcher.rs (POST with fixed identity headers)
//!     → upstream response headers
//!     → relay.rs
//!         non-2xx → buffer, sanitize, prefix
//!         2xx     → RelayStream pump, chunk by chunk
//!     → client response
//! ```
//!
//! # Design Decisions
//! - One shared connection pool; no per-request client construction
//! - Nothing here retries, caches, or remembers failed credentials

pub mod dispatcher;
pub mod relay;

pub use dispatcher::{Dispatcher, DispatcherError};
pub use relay::{relay, RelayStream};
