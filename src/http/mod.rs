//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, route table)
//!     → request.rs (request ID generated / propagated)
//!     → server.rs handlers:
//!         POST    /v1/chat/completions → gateway pipeline
//!         OPTIONS /v1/chat/completions → preflight (204)
//!         anything else               → 404
//!     → gateway::cors (headers on every response)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{request_id, MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{HttpServer, ServerError, CHAT_COMPLETIONS_PATH};
