//! Concrete [`ConfigSource`](super::ConfigSource) implementations.
//!
//! Provides file-based sources (YAML, JSON, TOML) gated by feature flags
//! and the [`parse_config_str`] helper for format-specific deserialization.

pub mod file_source;

#[cfg(feature = "yaml")]
pub mod yaml;

#[cfg(feature = "json")]
pub mod json;

#[cfg(feature = "toml")]
pub mod toml_source;

use sha2::{Digest, Sha256};

use crate::config::model::FileConfig;
use crate::error::WakewardError;

/// Parse a config string based on file extension. Host keys come out
/// lowercased.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<FileConfig, WakewardError> {
    let mut config: FileConfig = match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| WakewardError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| WakewardError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| WakewardError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => return Err(WakewardError::UnsupportedFormat(other.to_string())),
    }?;

    config.lowercase_hosts();
    Ok(config)
}

/// Compute a lowercase hex-encoded SHA-256 digest.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}
