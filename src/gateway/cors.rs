//! Cross-origin header set.
//!
//! Built once from config at startup and shared read-only. Attached to every
//! response by [`attach_cors`], including errors and the 404 fallback, so
//! browser clients can read error bodies cross-origin.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::{
    InvalidHeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;

use crate::config::CorsConfig;

/// Static CORS headers plus the preflight max-age value.
#[derive(Debug, Clone)]
pub struct CorsHeaders {
    headers: HeaderMap,
    max_age: HeaderValue,
}

impl CorsHeaders {
    pub fn from_config(config: &CorsConfig) -> Result<Self, InvalidHeaderValue> {
        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_str(&config.allow_origin)?,
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_str(&config.allow_methods)?,
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_str(&config.allow_headers)?,
        );

        Ok(Self {
            headers,
            max_age: HeaderValue::from(config.max_age_secs),
        })
    }

    /// Overwrite the CORS headers on an outgoing header map.
    pub fn apply(&self, target: &mut HeaderMap) {
        for (name, value) in &self.headers {
            target.insert(name.clone(), value.clone());
        }
    }

    /// Value for `Access-Control-Max-Age` on preflight responses.
    pub fn max_age(&self) -> &HeaderValue {
        &self.max_age
    }
}

/// Response mapper installed on the whole router.
pub async fn attach_cors(State(cors): State<Arc<CorsHeaders>>, mut response: Response) -> Response {
    cors.apply(response.headers_mut());
    response
}
