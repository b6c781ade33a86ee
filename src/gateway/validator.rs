//! Inbound request validation.
//!
//! # Responsibilities
//! - Require `Content-Type: application/json` exactly
//! - Parse the body as a JSON object or array
//! - Check that `stream`, when present and non-null, is a boolean
//!
//! # Design Decisions
//! - Content type is checked before the body is parsed
//! - The parsed body is only inspected; the original bytes are forwarded
//! - A zero-length body stands for `{}` and is forwarded as such
//! - No side effects: every check returns a verdict and nothing else

use axum::http::HeaderValue;
use bytes::Bytes;
use serde_json::Value;

use crate::gateway::error::GatewayError;

/// The only content type the gateway accepts.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A request that passed validation and may be forwarded upstream.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Original body bytes, forwarded as-is.
    pub body: Bytes,
    /// Whether the client asked for an incremental response.
    pub stream: bool,
}

/// Reject anything but an exact `application/json` content type.
pub fn check_content_type(content_type: Option<&HeaderValue>) -> Result<(), GatewayError> {
    match content_type.map(HeaderValue::as_bytes) {
        Some(value) if value == JSON_CONTENT_TYPE.as_bytes() => Ok(()),
        _ => Err(GatewayError::UnsupportedMediaType),
    }
}

/// Read the `stream` field: absent or null means false.
pub fn stream_flag(body: &Value) -> Result<bool, GatewayError> {
    match body.get("stream") {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(stream)) => Ok(*stream),
        Some(_) => Err(GatewayError::InvalidStreamFlag),
    }
}

/// Parse the body and check the one field the gateway cares about.
///
/// Bare scalars (`42`, `"hi"`, `true`, `null`) are rejected; only objects
/// and arrays are accepted as request bodies.
pub fn validate_body(body: Bytes) -> Result<ChatRequest, GatewayError> {
    if body.is_empty() {
        return Ok(ChatRequest {
            body: Bytes::from_static(EMPTY_OBJECT),
            stream: false,
        });
    }

    let parsed: Value =
        serde_json::from_slice(&body).map_err(|e| GatewayError::InvalidJson(e.to_string()))?;
    if !(parsed.is_object() || parsed.is_array()) {
        return Err(GatewayError::InvalidJson(format!(
            "Request body must be a JSON object or array, got {}",
            json_kind(&parsed)
        )));
    }

    let stream = stream_flag(&parsed)?;
    Ok(ChatRequest { body, stream })
}

const EMPTY_OBJECT: &[u8] = b"{}";

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
