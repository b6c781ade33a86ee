//! HTTP server setup and the gateway handler.
//!
//! # Responsibilities
//! - Create Axum Router with the forwarding, preflight, and 404 handlers
//! - Wire up middleware (request ID, tracing, CORS)
//! - Run the forwarding pipeline:
//!   received → validated → credential-selected → dispatched → relaying → done,
//!   with any stage able to short-circuit to a plain-text failure
//! - Serve with graceful shutdown

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{InvalidHeaderName, InvalidHeaderValue, ACCESS_CONTROL_MAX_AGE, CONTENT_TYPE},
        HeaderName, Request, StatusCode,
    },
    middleware::map_response_with_state,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use http_body_util::LengthLimitError;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::gateway::cors::{attach_cors, CorsHeaders};
use crate::gateway::credentials::CredentialList;
use crate::gateway::error::GatewayError;
use crate::gateway::validator;
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::upstream::dispatcher::{Dispatcher, DispatcherError};
use crate::upstream::relay;

/// The single forwarding endpoint.
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Errors turning a config into a runnable server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid CORS header value: {0}")]
    Cors(#[from] InvalidHeaderValue),

    #[error("invalid credential header name: {0}")]
    CredentialHeader(#[from] InvalidHeaderName),

    #[error(transparent)]
    Upstream(#[from] DispatcherError),
}

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub cors: Arc<CorsHeaders>,
    pub credential_header: HeaderName,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ServerError> {
        Ok(Self {
            dispatcher: Dispatcher::new(&config.upstream)?,
            cors: Arc::new(CorsHeaders::from_config(&config.cors)?),
            credential_header: HeaderName::from_bytes(config.credentials.header.as_bytes())?,
            max_body_bytes: config.limits.max_body_bytes,
        })
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let state = AppState::from_config(&config)?;
        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let cors = state.cors.clone();
        Router::new()
            .route(
                CHAT_COMPLETIONS_PATH,
                post(chat_completions)
                    .options(preflight)
                    .fallback(not_found),
            )
            .fallback(not_found)
            .with_state(state)
            .layer(map_response_with_state(cors, attach_cors))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            credential_header = %self.config.credentials.header,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(Shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// `POST /v1/chat/completions`.
async fn chat_completions(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers());

    match forward(&state, request, &request_id).await {
        Ok(response) => {
            tracing::info!(
                request_id = %request_id,
                status = %response.status(),
                "Upstream responded"
            );
            let outcome = if response.status().is_success() {
                "relayed"
            } else {
                "upstream_error"
            };
            metrics::record_request("POST", response.status().as_u16(), outcome, start_time);
            response
        }
        Err(e) => {
            if e.is_client_error() {
                tracing::info!(request_id = %request_id, kind = e.kind(), error = %e, "Rejected request");
            } else {
                tracing::error!(request_id = %request_id, kind = e.kind(), error = %e, "Forwarding failed");
            }
            metrics::record_request("POST", e.status().as_u16(), e.kind(), start_time);
            e.into_response()
        }
    }
}

/// The forwarding pipeline. Each `?` is a jump to the failed state.
async fn forward(
    state: &AppState,
    request: Request<Body>,
    request_id: &str,
) -> Result<Response, GatewayError> {
    let (parts, body) = request.into_parts();

    // received → validated
    validator::check_content_type(parts.headers.get(CONTENT_TYPE))?;
    let body = read_body(body, state.max_body_bytes).await?;
    let chat = validator::validate_body(body)?;

    // validated → credential-selected
    let credentials = CredentialList::from_header(
        parts.headers.get(&state.credential_header),
        state.credential_header.as_str(),
    )?;
    let credential = credentials.choose();

    tracing::debug!(
        request_id = %request_id,
        stream = chat.stream,
        credentials = credentials.len(),
        bytes = chat.body.len(),
        "Forwarding request upstream"
    );

    // credential-selected → dispatched
    let upstream = state.dispatcher.dispatch(credential, chat.body).await?;

    // dispatched → relaying; `done` is reached when the body pump ends
    relay::relay(upstream, chat.stream, request_id).await
}

/// Buffer the inbound body up to `limit` bytes.
async fn read_body(body: Body, limit: usize) -> Result<bytes::Bytes, GatewayError> {
    axum::body::to_bytes(body, limit).await.map_err(|e| {
        let inner = e.into_inner();
        if inner.is::<LengthLimitError>() {
            GatewayError::PayloadTooLarge(limit)
        } else {
            GatewayError::BodyRead(inner.to_string())
        }
    })
}

/// `OPTIONS /v1/chat/completions`.
async fn preflight(State(state): State<AppState>) -> Response {
    (
        StatusCode::NO_CONTENT,
        [(ACCESS_CONTROL_MAX_AGE, state.cors.max_age().clone())],
    )
        .into_response()
}

/// Any other method or path.
async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}
