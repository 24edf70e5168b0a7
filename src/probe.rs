//! Bounded-timeout health probing of backends.
//!
//! A probe is a single GET with no body against the service's health
//! check URL. Only a 2xx status counts as awake; transport errors,
//! timeouts, and non-2xx statuses all classify as not-awake. A backend
//! that is reachable but erroring is treated the same as one that is
//! asleep — downstream systems rely on that conflation, so it is
//! deliberate. Retry policy lives entirely in the wake-retry loop; the
//! prober never retries and never raises.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Full;
use hyper::Method;
use url::Url;

use crate::server::HttpClient;

/// Seam for the awake check, so the retry loop can be tested with a
/// scripted prober.
#[async_trait]
pub trait Prober: Send + Sync {
    /// `true` iff the backend answered 2xx within `timeout`.
    async fn probe(&self, url: &Url, timeout: Duration) -> bool;
}

/// Probes over the shared connection-pooled hyper client.
#[derive(Clone)]
pub struct HttpProber {
    client: HttpClient,
}

impl HttpProber {
    #[must_use]
    pub const fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &Url, timeout: Duration) -> bool {
        let request = hyper::Request::builder()
            .method(Method::GET)
            .uri(url.as_str())
            .body(Full::new(Bytes::new()));

        let Ok(request) = request else {
            tracing::warn!(url = %url, "could not build probe request");
            return false;
        };

        match tokio::time::timeout(timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let status = response.status();
                if status.is_success() {
                    tracing::debug!(url = %url, status = %status, "backend is awake");
                    true
                } else {
                    tracing::info!(
                        url = %url,
                        status = %status,
                        "backend responded non-2xx, considering not awake"
                    );
                    false
                }
            }
            Ok(Err(e)) => {
                tracing::info!(url = %url, error = %e, "awake check failed");
                false
            }
            Err(_) => {
                tracing::info!(url = %url, timeout_secs = timeout.as_secs(), "awake check timed out");
                false
            }
        }
    }
}
