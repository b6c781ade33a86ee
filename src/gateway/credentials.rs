//! Per-request credential list and random selection.
//!
//! The client sends a JSON array of bearer tokens in a configurable header.
//! The list lives only as long as the request; nothing is cached or persisted,
//! and selection keeps no state between requests.

use axum::http::HeaderValue;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;

use crate::gateway::error::GatewayError;

/// A validated, non-empty list of bearer tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialList(Vec<String>);

// Tokens never end up in logs.
impl std::fmt::Debug for CredentialList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CredentialList({} redacted)", self.0.len())
    }
}

impl CredentialList {
    /// Decode the credential header. `header_name` is only used in the error.
    pub fn from_header(
        value: Option<&HeaderValue>,
        header_name: &str,
    ) -> Result<Self, GatewayError> {
        let value = value.ok_or_else(|| GatewayError::MissingCredentials(header_name.to_string()))?;
        let text = value
            .to_str()
            .map_err(|_| GatewayError::MalformedCredentials("header is not visible ASCII".into()))?;
        Self::parse(text)
    }

    /// Parse a JSON array of strings, failing closed on any other shape.
    pub fn parse(text: &str) -> Result<Self, GatewayError> {
        let decoded: Value = serde_json::from_str(text)
            .map_err(|e| GatewayError::MalformedCredentials(e.to_string()))?;

        let Value::Array(items) = decoded else {
            return Err(GatewayError::MalformedCredentials(
                "expected a JSON array of strings".into(),
            ));
        };
        if items.is_empty() {
            return Err(GatewayError::MalformedCredentials(
                "credential list is empty".into(),
            ));
        }

        let mut tokens = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let Value::String(token) = item else {
                return Err(GatewayError::MalformedCredentials(format!(
                    "element {index} is not a string"
                )));
            };
            // Must survive being placed in `Authorization: Bearer <token>`.
            if HeaderValue::from_str(&token).is_err() {
                return Err(GatewayError::MalformedCredentials(format!(
                    "element {index} contains characters not allowed in a header"
                )));
            }
            tokens.push(token);
        }

        Ok(Self(tokens))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; construction rejects empty lists.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pick one token uniformly at random using the thread-local generator.
    pub fn choose(&self) -> &str {
        self.choose_with(&mut rand::thread_rng())
    }

    /// Pick one token uniformly at random from the given source.
    pub fn choose_with<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        // The list is never empty, so `choose` always yields.
        self.0.choose(rng).map(String::as_str).unwrap_or_default()
    }
}
