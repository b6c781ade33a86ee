//! Gateway core: the pieces the forwarding handler is assembled from.
//!
//! # Data Flow
//! ```text
//! POST /v1/chat/completions
//!     → validator.rs (content type, JSON body, `stream` flag)
//!     → credentials.rs (decode credential header, pick one at random)
//!     → upstream::dispatcher (single POST, no retries)
//!     → upstream::relay (status/headers/body back to client)
//!         → sanitizer.rs on non-2xx bodies
//!
//! Every response, success or failure:
//!     → cors.rs (static header set)
//! ```
//!
//! # Design Decisions
//! - All request data is request-local; shared state is read-only
//! - Failures short-circuit with a plain-text `GatewayError` response

pub mod cors;
pub mod credentials;
pub mod error;
pub mod sanitizer;
pub mod validator;

pub use cors::CorsHeaders;
pub use credentials::CredentialList;
pub use error::GatewayError;
pub use validator::ChatRequest;
