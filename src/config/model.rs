//! Serde data structures for the Wakeward configuration file.
//!
//! Contains [`FileConfig`] (the root), [`RawService`] (one service entry
//! with every field optional so environment variables can fill the gaps),
//! and [`Defaults`] (global fallbacks applied at registry build time).
//! All types derive `Serialize` and `Deserialize` with
//! `deny_unknown_fields` for strict parsing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

const fn default_poll_interval() -> u64 {
    5
}

const fn default_max_retries() -> u32 {
    10
}

const fn default_timeout() -> u64 {
    5
}

fn is_default_poll_interval(v: &u64) -> bool {
    *v == default_poll_interval()
}

fn is_default_max_retries(v: &u32) -> bool {
    *v == default_max_retries()
}

fn is_default_timeout(v: &u64) -> bool {
    *v == default_timeout()
}

fn is_default_defaults(v: &Defaults) -> bool {
    v.poll_interval == default_poll_interval()
        && v.max_retries == default_max_retries()
        && v.probe_timeout == default_timeout()
        && v.forward_timeout == default_timeout()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "is_default_defaults")]
    pub defaults: Defaults,

    /// Map from host identifier to service entry. Keys are lowercased
    /// by [`Self::lowercase_hosts`] immediately after parsing.
    #[serde(default)]
    pub services: HashMap<String, RawService>,
}

impl FileConfig {
    #[must_use]
    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    /// Lowercase the service keys so file entries, `SERVICE_*` overrides,
    /// and registry lookups all agree on the key form. Must run before
    /// env overrides are merged, or a case-variant file key ends up in a
    /// separate map slot and the override is lost.
    pub fn lowercase_hosts(&mut self) {
        self.services = std::mem::take(&mut self.services)
            .into_iter()
            .map(|(host, service)| (host.to_lowercase(), service))
            .collect();
    }
}

/// Global fallbacks for the per-service tuning knobs. Durations are in
/// whole seconds, matching the original deployment convention.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    #[serde(
        default = "default_poll_interval",
        skip_serializing_if = "is_default_poll_interval"
    )]
    pub poll_interval: u64,

    #[serde(
        default = "default_max_retries",
        skip_serializing_if = "is_default_max_retries"
    )]
    pub max_retries: u32,

    #[serde(
        default = "default_timeout",
        skip_serializing_if = "is_default_timeout"
    )]
    pub probe_timeout: u64,

    #[serde(
        default = "default_timeout",
        skip_serializing_if = "is_default_timeout"
    )]
    pub forward_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            max_retries: default_max_retries(),
            probe_timeout: default_timeout(),
            forward_timeout: default_timeout(),
        }
    }
}

/// One service as written in the file or assembled from `SERVICE_*`
/// environment variables. The three string fields are required for the
/// entry to register; the numeric fields fall back to [`Defaults`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawService {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_check_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_timeout: Option<u64>,
}
