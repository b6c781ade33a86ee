//! Outbound request to the upstream chat-completion endpoint.
//!
//! # Responsibilities
//! - Send one POST per inbound request with a fixed identity header set
//! - Bound connection setup and the wait for response headers
//! - Map transport failures into `GatewayError`
//!
//! # Design Decisions
//! - Single attempt; POST is never retried
//! - The client's own `Authorization` header is never forwarded
//! - The body timeout is deliberately absent so streams can run long

use std::time::Duration;

use axum::http::header::{InvalidHeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use axum::http::HeaderValue;
use bytes::Bytes;
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;
use crate::gateway::error::GatewayError;
use crate::gateway::validator::JSON_CONTENT_TYPE;

/// Errors building the dispatcher at startup.
#[derive(Debug, Error)]
pub enum DispatcherError {
    #[error("invalid upstream url: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid user agent: {0}")]
    UserAgent(#[from] InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Issues requests to the fixed upstream endpoint.
///
/// Cheap to clone: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    url: Url,
    user_agent: HeaderValue,
    response_timeout: Duration,
}

impl Dispatcher {
    pub fn new(config: &UpstreamConfig) -> Result<Self, DispatcherError> {
        let url = Url::parse(&config.url)?;
        let user_agent = HeaderValue::from_str(&config.user_agent)?;
        let mut builder =
            reqwest::Client::builder().connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            url,
            user_agent,
            response_timeout: Duration::from_secs(config.response_timeout_secs),
        })
    }

    /// Forward `body` upstream authenticated with `credential`.
    ///
    /// Resolves once response headers arrive; the body is left unread.
    pub async fn dispatch(
        &self,
        credential: &str,
        body: Bytes,
    ) -> Result<reqwest::Response, GatewayError> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {credential}"))
            .map_err(|_| GatewayError::MalformedCredentials("credential is not a valid header value".into()))?;
        authorization.set_sensitive(true);

        let request = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
            .header(AUTHORIZATION, authorization)
            .header(USER_AGENT, self.user_agent.clone())
            .body(body)
            .send();

        match tokio::time::timeout(self.response_timeout, request).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(GatewayError::Transport(describe(&e))),
            Err(_) => Err(GatewayError::Timeout(self.response_timeout.as_secs())),
        }
    }
}

/// Flatten an error and its sources into one line.
pub(crate) fn describe(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
