//! Failure taxonomy for the forwarding pipeline.
//!
//! Every variant maps to exactly one client-visible plain-text response.
//! Nothing is logged-and-dropped: the handler always turns these into a reply.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that can occur while forwarding a chat-completion request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Content-Type missing or not exactly `application/json`.
    #[error("Unsupported media type. Use 'application/json' content type")]
    UnsupportedMediaType,

    /// Inbound body could not be parsed as JSON.
    #[error("{0}")]
    InvalidJson(String),

    /// `stream` present but not a boolean.
    #[error("The `stream` parameter must be a boolean value")]
    InvalidStreamFlag,

    /// Inbound body larger than the configured limit.
    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// Inbound body could not be read from the client.
    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    /// Credential header absent.
    #[error("Missing `{0}` header: expected a JSON array of API keys")]
    MissingCredentials(String),

    /// Credential header present but not a non-empty JSON array of strings.
    #[error("Malformed credentials: {0}")]
    MalformedCredentials(String),

    /// Upstream unreachable, reset, or body unreadable.
    #[error("{0}")]
    Transport(String),

    /// Upstream did not send response headers in time.
    #[error("Upstream did not respond within {0} seconds")]
    Timeout(u64),
}

impl GatewayError {
    /// HTTP status surfaced to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::InvalidJson(_)
            | Self::InvalidStreamFlag
            | Self::BodyRead(_)
            | Self::MissingCredentials(_)
            | Self::MalformedCredentials(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Transport(_) | Self::Timeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedMediaType => "unsupported_media_type",
            Self::InvalidJson(_) => "invalid_json",
            Self::InvalidStreamFlag => "invalid_stream_flag",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::BodyRead(_) => "body_read",
            Self::MissingCredentials(_) | Self::MalformedCredentials(_) => "credentials",
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
        }
    }

    /// Client input problems never reach the upstream.
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        // String bodies are sent as text/plain; charset=utf-8.
        (self.status(), self.to_string()).into_response()
    }
}
