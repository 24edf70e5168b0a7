//! `wakeward run` — start the proxy server.
//!
//! Loads the service registry from file and `SERVICE_*` environment
//! variables, aborts when no valid service remains, then starts the
//! Axum HTTP server with graceful shutdown. The registry is immutable
//! for the process lifetime; there is no reload loop.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config::model::FileConfig;
use crate::config::registry::build_registry;
use crate::config::{env, sources, ConfigSource};
use crate::error::WakewardError;
use crate::logging;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), WakewardError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let mut config = match resolve_file_source(args.config.as_deref()).await? {
        Some(source) => {
            let (config, version) = source.load().await?;
            tracing::info!(
                source = source.name(),
                version = version.short(),
                services = config.service_count(),
                "config file loaded"
            );
            config
        }
        None => {
            tracing::warn!("no config file found, using environment variables only");
            FileConfig::default()
        }
    };

    // Explicit CLI/env globals beat the file's defaults section.
    if let Some(v) = args.poll_interval {
        config.defaults.poll_interval = v;
    }
    if let Some(v) = args.max_retries {
        config.defaults.max_retries = v;
    }
    if let Some(v) = args.probe_timeout {
        config.defaults.probe_timeout = v;
    }
    if let Some(v) = args.forward_timeout {
        config.defaults.forward_timeout = v;
    }

    let overrides = env::apply_overrides(&mut config.services);
    if overrides > 0 {
        tracing::info!(overrides, "applied service overrides from environment");
    }

    let registry = build_registry(&config);
    if registry.is_empty() {
        return Err(WakewardError::EmptyRegistry);
    }

    for service in registry.iter() {
        tracing::info!(
            service = %service.host,
            base_url = %service.base_url,
            health_check_path = %service.health_check_path,
            mac = %service.mac_address,
            poll_interval_secs = service.poll_interval.as_secs(),
            max_retries = service.max_retries,
            probe_timeout_secs = service.probe_timeout.as_secs(),
            forward_timeout_secs = service.forward_timeout.as_secs(),
            "registered service"
        );
    }

    let service_count = registry.len();
    let state = Arc::new(AppState::new(Arc::new(registry)));
    let router = server::build_router(state, args.max_body);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        services = service_count,
        "wakeward started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("wakeward stopped");
    Ok(())
}

async fn resolve_file_source(
    explicit: Option<&std::path::Path>,
) -> Result<Option<Box<dyn ConfigSource>>, WakewardError> {
    if let Some(path) = explicit {
        return create_file_source(path).map(Some);
    }

    // Auto-detect in current directory
    let candidates = [
        "wakeward.yaml",
        "wakeward.yml",
        "wakeward.json",
        "wakeward.toml",
    ];

    for name in &candidates {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            return create_file_source(&path).map(Some);
        }
    }

    Ok(None)
}

fn create_file_source(path: &std::path::Path) -> Result<Box<dyn ConfigSource>, WakewardError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => Ok(Box::new(sources::yaml::new(path.to_path_buf()))),

        #[cfg(feature = "json")]
        "json" => Ok(Box::new(sources::json::new(path.to_path_buf()))),

        #[cfg(feature = "toml")]
        "toml" => Ok(Box::new(sources::toml_source::new(path.to_path_buf()))),

        other => Err(WakewardError::UnsupportedFormat(other.to_string())),
    }
}
