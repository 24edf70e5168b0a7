//! `SERVICE_*` environment variable overrides.
//!
//! Variables named `SERVICE_<HOST>_<SUFFIX>` override or create service
//! entries on top of the config file, so a single container can be
//! configured without mounting a file. The host part may itself contain
//! underscores and dots (`SERVICE_NAS.EXAMPLE.COM_BASE_URL`), which is
//! why suffixes are matched from the end, longest first.

use std::collections::HashMap;

use crate::config::model::RawService;

const PREFIX: &str = "SERVICE_";

/// Known suffixes, mapped onto `RawService` fields.
const SUFFIXES: &[&str] = &[
    "BASE_URL",
    "HEALTH_CHECK_PATH",
    "MAC_ADDRESS",
    "POLL_INTERVAL",
    "MAX_RETRIES",
    "PROBE_TIMEOUT",
    "FORWARD_TIMEOUT",
];

/// Apply overrides from the process environment. Returns the number of
/// values applied.
pub fn apply_overrides(services: &mut HashMap<String, RawService>) -> usize {
    apply_overrides_from(services, std::env::vars())
}

/// Same as [`apply_overrides`] but with an explicit variable source,
/// so tests do not have to mutate the process environment.
pub fn apply_overrides_from<I>(services: &mut HashMap<String, RawService>, vars: I) -> usize
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut applied = 0;

    for (key, value) in vars {
        let Some(rest) = key.strip_prefix(PREFIX) else {
            continue;
        };

        // Longest suffix wins so overlapping suffixes (if ever added)
        // cannot truncate the host part.
        let Some(suffix) = SUFFIXES
            .iter()
            .filter(|s| rest.ends_with(&format!("_{s}")))
            .max_by_key(|s| s.len())
        else {
            tracing::debug!(key = %key, "ignoring env var: no known service suffix");
            continue;
        };

        let host_part = &rest[..rest.len() - suffix.len() - 1];
        if host_part.is_empty() {
            tracing::warn!(key = %key, "ignoring env var: valid suffix but no host");
            continue;
        }

        let host = host_part.to_lowercase();
        let entry = services.entry(host.clone()).or_default();

        if apply_value(entry, suffix, &value) {
            tracing::debug!(host = %host, key = %key, "applied service override from environment");
            applied += 1;
        } else {
            tracing::error!(
                host = %host,
                key = %key,
                value = %value,
                "invalid numeric value in env var, skipping"
            );
        }
    }

    applied
}

fn apply_value(entry: &mut RawService, suffix: &str, value: &str) -> bool {
    match suffix {
        "BASE_URL" => entry.base_url = Some(value.to_string()),
        "HEALTH_CHECK_PATH" => entry.health_check_path = Some(value.to_string()),
        "MAC_ADDRESS" => entry.mac_address = Some(value.to_string()),
        "POLL_INTERVAL" => match value.parse() {
            Ok(v) => entry.poll_interval = Some(v),
            Err(_) => return false,
        },
        "MAX_RETRIES" => match value.parse() {
            Ok(v) => entry.max_retries = Some(v),
            Err(_) => return false,
        },
        "PROBE_TIMEOUT" => match value.parse() {
            Ok(v) => entry.probe_timeout = Some(v),
            Err(_) => return false,
        },
        "FORWARD_TIMEOUT" => match value.parse() {
            Ok(v) => entry.forward_timeout = Some(v),
            Err(_) => return false,
        },
        _ => unreachable!("suffix comes from SUFFIXES"),
    }
    true
}
