//! Streaming forward of the original request to an awake backend.
//!
//! The destination URL is the inbound path+query resolved against the
//! service's base URL; method and body are forwarded as-is, headers per
//! [`headers::build_forwarded_headers`]. `forward_timeout` bounds only
//! the connection and initial response: once the backend's status and
//! headers arrive, the body is relayed as a stream with no overall
//! deadline, so legitimately long responses are never truncated.
//!
//! The backend's body is handed to the outbound response as a stream
//! handle; when the client disconnects mid-stream, axum drops the body,
//! which stops reading from the backend and returns the pooled
//! connection.

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use http_body_util::Full;

use super::headers;
use crate::config::registry::ServiceConfig;
use crate::error::ProxyError;
use crate::server::HttpClient;

pub async fn forward(
    client: &HttpClient,
    service: &ServiceConfig,
    method: Method,
    uri: &Uri,
    req_headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let full_path = uri.path_and_query().map_or("/", |pq| pq.as_str());

    let destination = service.base_url.join(full_path).map_err(|e| {
        tracing::error!(service = %service.host, path = %full_path, error = %e, "cannot build destination URL");
        ProxyError::RelayFailure {
            service: service.host.clone(),
        }
    })?;

    let mut request = hyper::Request::builder()
        .method(method)
        .uri(destination.as_str())
        .body(Full::new(body))
        .map_err(|e| {
            tracing::error!(service = %service.host, error = %e, "cannot build forward request");
            ProxyError::RelayFailure {
                service: service.host.clone(),
            }
        })?;
    *request.headers_mut() = headers::build_forwarded_headers(req_headers);

    // Timeout covers connect + status/headers only, not the body stream.
    let upstream = match tokio::time::timeout(service.forward_timeout, client.request(request))
        .await
    {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            tracing::error!(service = %service.host, destination = %destination, error = %e, "forward request failed");
            return Err(ProxyError::RelayFailure {
                service: service.host.clone(),
            });
        }
        Err(_) => {
            tracing::error!(
                service = %service.host,
                destination = %destination,
                timeout_secs = service.forward_timeout.as_secs(),
                "forward request timed out"
            );
            return Err(ProxyError::RelayFailure {
                service: service.host.clone(),
            });
        }
    };

    tracing::info!(
        service = %service.host,
        destination = %destination,
        status = %upstream.status(),
        "relaying backend response"
    );

    let (mut parts, incoming) = upstream.into_parts();
    headers::strip_response_headers(&mut parts.headers);

    let mut builder = Response::builder().status(parts.status);
    for (name, value) in &parts.headers {
        builder = builder.header(name, value);
    }

    Ok(builder.body(Body::new(incoming)).unwrap_or_else(|e| {
        tracing::error!(service = %service.host, error = %e, "failed to build relay response");
        StatusCode::BAD_GATEWAY.into_response()
    }))
}
