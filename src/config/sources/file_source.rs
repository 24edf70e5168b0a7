//! Generic async file-based config source with SHA256 content hashing.
//!
//! [`FileSource`] implements [`ConfigSource`] for any file format by
//! accepting a deserialization function at construction time. It reads
//! the file asynchronously via Tokio and computes a SHA256 hash for the
//! version label. Service-level validation is *not* performed here:
//! invalid entries are discarded individually at registry build time
//! rather than failing the whole load.

use std::path::PathBuf;

use async_trait::async_trait;

use super::sha256_hex;
use crate::config::model::FileConfig;
use crate::config::{ConfigSource, ConfigVersion};
use crate::error::WakewardError;

pub struct FileSource {
    path: PathBuf,
    name: &'static str,
    deserialize: fn(&str) -> Result<FileConfig, Box<dyn std::error::Error + Send + Sync>>,
}

impl FileSource {
    #[must_use]
    pub fn new(
        path: PathBuf,
        name: &'static str,
        deserialize: fn(&str) -> Result<FileConfig, Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            path,
            name,
            deserialize,
        }
    }

    async fn read_content(&self) -> Result<String, WakewardError> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WakewardError::ConfigFileNotFound {
                    path: self.path.clone(),
                }
            } else {
                WakewardError::Io(e)
            }
        })
    }
}

#[async_trait]
impl ConfigSource for FileSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn load(&self) -> Result<(FileConfig, ConfigVersion), WakewardError> {
        let content = self.read_content().await?;

        let mut config = (self.deserialize)(&content).map_err(|e| WakewardError::ConfigParse {
            path: self.path.display().to_string(),
            source: e,
        })?;
        config.lowercase_hosts();

        let hash = sha256_hex(content.as_bytes());
        Ok((config, ConfigVersion::Hash(hash)))
    }
}
