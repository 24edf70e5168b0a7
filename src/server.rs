//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding the immutable
//! service registry, HTTP client, prober, and wake notifier),
//! [`build_router`] for constructing the fallback-only Axum router with
//! middleware layers, [`build_http_client`] for the connection-pooled
//! hyper client, and [`shutdown_signal`] for SIGTERM / Ctrl+C handling.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::registry::ServiceRegistry;
use crate::probe::HttpProber;
use crate::proxy;
use crate::wake::WolNotifier;

pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
pub type HttpClient = Client<HttpsConnector, http_body_util::Full<bytes::Bytes>>;

pub struct AppState {
    /// Read-only for the process lifetime; consulted on every request.
    pub registry: Arc<ServiceRegistry>,
    pub http_client: HttpClient,
    pub prober: HttpProber,
    pub notifier: WolNotifier,
}

impl AppState {
    #[must_use]
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        let http_client = build_http_client();
        Self {
            registry,
            prober: HttpProber::new(http_client.clone()),
            http_client,
            notifier: WolNotifier::new(),
        }
    }

    /// State with a notifier aimed somewhere other than the broadcast
    /// address (tests).
    #[must_use]
    pub fn with_notifier(registry: Arc<ServiceRegistry>, notifier: WolNotifier) -> Self {
        let http_client = build_http_client();
        Self {
            registry,
            prober: HttpProber::new(http_client.clone()),
            http_client,
            notifier,
        }
    }
}

#[must_use]
pub fn build_http_client() -> HttpClient {
    // When multiple rustls crypto providers are compiled in, rustls cannot
    // auto-detect which one to use. Explicitly install `ring` as the
    // default provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(30))
        .build(https)
}

/// Every path belongs to the backend resolved from the Host header, so
/// the router is fallback-only: no listener-local routes that could
/// shadow backend paths.
pub fn build_router(state: Arc<AppState>, max_body: usize) -> Router {
    Router::new()
        .fallback(proxy::forward_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body)),
        )
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
