//! Service registry loading and validation.
//!
//! Defines the [`ConfigSource`] trait for pluggable file format
//! backends and the [`ConfigVersion`] content hash used to label what
//! was loaded. Submodules provide the serde data model, the
//! `SERVICE_*` environment overrides, validation logic, registry
//! construction, and the concrete source implementations.
//!
//! The registry is built once at startup and never reloaded; there is
//! deliberately no change watching here.

pub mod env;
pub mod model;
pub mod registry;
pub mod sources;
pub mod validation;

use async_trait::async_trait;

use crate::error::WakewardError;
use model::FileConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigVersion {
    Hash(String),
}

impl ConfigVersion {
    /// Short form for log output.
    #[must_use]
    pub fn short(&self) -> &str {
        match self {
            Self::Hash(h) => h.get(..8).unwrap_or(h),
        }
    }
}

// async_trait is required here because ConfigSource is used as Box<dyn ConfigSource>
// and native async fn in traits (Rust 1.75+) does not support dyn dispatch.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn load(&self) -> Result<(FileConfig, ConfigVersion), WakewardError>;
}
