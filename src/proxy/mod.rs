//! Core request pipeline.
//!
//! The [`forward_handler`] function is the Axum fallback that receives
//! every request: it resolves the `Host` header against the service
//! registry, runs the wake/probe retry loop ([`wake_retry`]), and
//! forwards the request with a streamed response ([`relay`]). Header
//! filtering lives in [`headers`]. Failures map to the fixed responses
//! defined on [`ProxyError`].

pub mod headers;
pub mod relay;
pub mod wake_retry;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};

use crate::error::ProxyError;
use crate::server::AppState;

pub async fn forward_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    req_headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();

    match dispatch(&state, &request_id, method, &uri, &req_headers, body).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                status = %e.status(),
                error = %e,
                "request failed"
            );
            e.into_response()
        }
    }
}

/// Resolve the service, wait for it to be awake, then forward.
async fn dispatch(
    state: &AppState,
    request_id: &str,
    method: Method,
    uri: &Uri,
    req_headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let host_value = req_headers
        .get(header::HOST)
        .ok_or(ProxyError::MissingHostHeader)?;

    // Lossy decode: a host with non-UTF-8 bytes is present but can never
    // match a registry key, so it falls through to UnknownService below.
    let host = String::from_utf8_lossy(host_value.as_bytes()).to_lowercase();
    if host.is_empty() {
        return Err(ProxyError::MissingHostHeader);
    }

    let service = state
        .registry
        .get(&host)
        .ok_or_else(|| ProxyError::UnknownService { host: host.clone() })?;

    tracing::info!(
        request_id = %request_id,
        service = %service.host,
        method = %method,
        path = %uri.path(),
        "request received"
    );

    let awake = wake_retry::wait_for_awake(&state.prober, &state.notifier, service).await;
    if !awake {
        return Err(ProxyError::ProbeExhausted {
            service: service.host.clone(),
            max_retries: service.max_retries,
        });
    }

    relay::forward(&state.http_client, service, method, uri, req_headers, body).await
}
