//! Chat-completion forwarding gateway.
//!
//! Accepts `POST /v1/chat/completions` with a JSON body and a header holding
//! a JSON array of API keys, forwards the body upstream under one randomly
//! chosen key, and relays the reply (streamed or not) with permissive CORS
//! headers. Upstream error bodies are redacted before the client sees them.

pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
