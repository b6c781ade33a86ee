//! Upstream response → client response.
//!
//! # Responsibilities
//! - Non-2xx: buffer, sanitize, and prefix the body; keep the status
//! - 2xx: copy status, `Content-Type`, `Content-Length`; stream the body
//! - Mark streamed responses `Connection: keep-alive`
//!
//! # Design Decisions
//! - Success bodies are never buffered or rewritten
//! - The body pump is owned by the client response: when the client goes
//!   away hyper drops it, which drops the upstream body and its connection

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONNECTION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::stream::{BoxStream, Stream, StreamExt};

use crate::gateway::error::GatewayError;
use crate::gateway::sanitizer::sanitize;
use crate::observability::metrics;
use crate::upstream::dispatcher::describe;

/// First line of every relayed upstream error.
pub const UPSTREAM_ERROR_PREFIX: &str = "OpenAI API responded:\n\n";

/// Build the client-facing response for an upstream reply.
pub async fn relay(
    upstream: reqwest::Response,
    stream: bool,
    request_id: &str,
) -> Result<Response, GatewayError> {
    let status = upstream.status();
    if !status.is_success() {
        return relay_error(upstream, status).await;
    }

    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
    let content_length = upstream.headers().get(CONTENT_LENGTH).cloned();
    let expected_len = content_length
        .as_ref()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let pump = RelayStream::new(upstream.bytes_stream(), expected_len, request_id);
    let mut response = Response::new(Body::from_stream(pump));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    if let Some(value) = content_type {
        headers.insert(CONTENT_TYPE, value);
    }
    // Only when upstream sent one; a guessed length would corrupt a stream.
    if let Some(value) = content_length {
        headers.insert(CONTENT_LENGTH, value);
    }
    if stream {
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    Ok(response)
}

async fn relay_error(
    upstream: reqwest::Response,
    status: StatusCode,
) -> Result<Response, GatewayError> {
    let text = upstream
        .text()
        .await
        .map_err(|e| GatewayError::Transport(describe(&e)))?;

    tracing::debug!(status = %status, bytes = text.len(), "Relaying upstream error");

    let body = format!("{}{}", UPSTREAM_ERROR_PREFIX, sanitize(&text));
    let mut response = (status, body).into_response();
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Ok(response)
}

/// Chunk-by-chunk pump from the upstream body to the client.
///
/// Counts what it forwards and notices when it is dropped before upstream
/// finished, i.e. the client disconnected.
pub struct RelayStream {
    inner: BoxStream<'static, reqwest::Result<Bytes>>,
    request_id: String,
    expected_len: Option<u64>,
    relayed: u64,
    finished: bool,
}

impl RelayStream {
    pub fn new<S>(inner: S, expected_len: Option<u64>, request_id: &str) -> Self
    where
        S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
    {
        Self {
            inner: inner.boxed(),
            request_id: request_id.to_string(),
            expected_len,
            relayed: 0,
            // An empty body may be sent without ever being polled.
            finished: expected_len == Some(0),
        }
    }

    /// Bytes forwarded so far.
    pub fn relayed(&self) -> u64 {
        self.relayed
    }

    /// Upstream reached EOF or failed; nothing left to pull.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn finish(&mut self) {
        self.finished = true;
        metrics::record_relayed_bytes(self.relayed);
        tracing::debug!(
            request_id = %self.request_id,
            bytes = self.relayed,
            "Upstream body relayed"
        );
    }
}

impl Stream for RelayStream {
    type Item = reqwest::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.finished {
            return Poll::Ready(None);
        }

        match this.inner.poll_next_unpin(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.relayed += chunk.len() as u64;
                // Hyper may stop polling once a declared length is satisfied.
                if this.expected_len.is_some_and(|len| this.relayed >= len) {
                    this.finish();
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                tracing::warn!(
                    request_id = %this.request_id,
                    bytes = this.relayed,
                    error = %describe(&e),
                    "Upstream body failed mid-relay"
                );
                this.finished = true;
                metrics::record_relayed_bytes(this.relayed);
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.finish();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for RelayStream {
    fn drop(&mut self) {
        if !self.finished {
            tracing::info!(
                request_id = %self.request_id,
                bytes = self.relayed,
                "Client went away mid-relay; closing upstream body"
            );
            metrics::record_relayed_bytes(self.relayed);
            metrics::record_stream_abort();
        }
    }
}
