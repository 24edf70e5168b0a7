//! The immutable service registry consulted on every request.
//!
//! [`build_registry`] resolves raw file/env entries against the global
//! defaults, discards entries that fail validation (they are never
//! partially registered), and lowercases the host keys. The resulting
//! [`ServiceRegistry`] is wrapped in an `Arc` by the caller and never
//! mutated for the lifetime of the process.

use std::collections::HashMap;
use std::time::Duration;

use url::Url;

use super::model::{Defaults, FileConfig};
use super::validation::validate_service;
use crate::wake::MacAddr;

/// Fully resolved configuration for one logical service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Lowercased host identifier this service is registered under.
    pub host: String,
    pub base_url: Url,
    pub health_check_path: String,
    /// `health_check_path` resolved against `base_url`, joined once at
    /// registry build so an unjoinable path discards the entry instead
    /// of silently probing the wrong URL.
    pub health_check_url: Url,
    pub mac_address: MacAddr,
    pub poll_interval: Duration,
    pub max_retries: u32,
    pub probe_timeout: Duration,
    pub forward_timeout: Duration,
}

#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, ServiceConfig>,
}

impl ServiceRegistry {
    /// Look up a service by its already-lowercased host identifier.
    #[must_use]
    pub fn get(&self, host: &str) -> Option<&ServiceConfig> {
        self.services.get(host)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceConfig> {
        self.services.values()
    }
}

/// Resolve every raw entry and build the registry. Entries that fail
/// validation are logged and dropped; the caller decides whether an
/// empty result is fatal.
#[must_use]
pub fn build_registry(config: &FileConfig) -> ServiceRegistry {
    let mut services = HashMap::new();

    for (host, raw) in &config.services {
        let errors = validate_service(host, raw);
        if !errors.is_empty() {
            for error in &errors {
                tracing::error!(service = %host, error = %error, "discarding invalid service");
            }
            continue;
        }

        let host = host.to_lowercase();
        if let Some(resolved) = resolve(&host, raw, &config.defaults) {
            services.insert(host, resolved);
        }
    }

    ServiceRegistry { services }
}

fn resolve(
    host: &str,
    raw: &super::model::RawService,
    defaults: &Defaults,
) -> Option<ServiceConfig> {
    // Validation has already run; these parses only fail if it drifts.
    let base_url = Url::parse(raw.base_url.as_deref()?).ok()?;
    let mac_address = raw.mac_address.as_deref()?.parse::<MacAddr>().ok()?;
    let health_check_path = raw.health_check_path.clone()?;
    let health_check_url = base_url.join(&health_check_path).ok()?;

    Some(ServiceConfig {
        host: host.to_string(),
        base_url,
        health_check_path,
        health_check_url,
        mac_address,
        poll_interval: Duration::from_secs(raw.poll_interval.unwrap_or(defaults.poll_interval)),
        max_retries: raw.max_retries.unwrap_or(defaults.max_retries),
        probe_timeout: Duration::from_secs(raw.probe_timeout.unwrap_or(defaults.probe_timeout)),
        forward_timeout: Duration::from_secs(
            raw.forward_timeout.unwrap_or(defaults.forward_timeout),
        ),
    })
}
