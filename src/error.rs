//! Unified error types for Wakeward.
//!
//! Defines [`WakewardError`] (startup and configuration failures),
//! [`ValidationError`] for config validation diagnostics, and
//! [`ProxyError`] for per-request failures. `ProxyError` implements
//! `IntoResponse` so the request handler can surface the fixed set of
//! client-facing responses with `?`.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub service: String,
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "  service {}: {} — {}",
            self.service, self.field, self.message
        )?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WakewardError {
    #[error("Config file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Config parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Config validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    #[error("No valid services configured. Provide at least one service via the config file or SERVICE_* environment variables.")]
    EmptyRegistry,

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("File already exists: {}", path.display())]
    FileExists { path: PathBuf },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Per-request failure, mapped to a fixed client-facing response.
///
/// Every variant carries exactly the data its response body needs; the
/// bodies are part of the external contract and must not drift.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Host header is missing.")]
    MissingHostHeader,

    #[error("Unknown target service: {host}.")]
    UnknownService { host: String },

    #[error("Failed to reach the server {service} after {max_retries} attempts.")]
    ProbeExhausted { service: String, max_retries: u32 },

    #[error("Failed to reach the server {service} after it woke up.")]
    RelayFailure { service: String },
}

impl ProxyError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingHostHeader => StatusCode::BAD_REQUEST,
            Self::UnknownService { .. } => StatusCode::NOT_FOUND,
            Self::ProbeExhausted { .. } | Self::RelayFailure { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_error_bodies_are_exact() {
        assert_eq!(ProxyError::MissingHostHeader.to_string(), "Host header is missing.");
        assert_eq!(
            ProxyError::UnknownService {
                host: "nas.example".into()
            }
            .to_string(),
            "Unknown target service: nas.example."
        );
        assert_eq!(
            ProxyError::ProbeExhausted {
                service: "nas.example".into(),
                max_retries: 10
            }
            .to_string(),
            "Failed to reach the server nas.example after 10 attempts."
        );
        assert_eq!(
            ProxyError::RelayFailure {
                service: "nas.example".into()
            }
            .to_string(),
            "Failed to reach the server nas.example after it woke up."
        );
    }

    #[test]
    fn proxy_error_status_codes() {
        assert_eq!(ProxyError::MissingHostHeader.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ProxyError::UnknownService { host: "x".into() }.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ProxyError::ProbeExhausted {
                service: "x".into(),
                max_retries: 1
            }
            .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ProxyError::RelayFailure { service: "x".into() }.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
