//! Configuration validation with detailed error reporting.
//!
//! [`validate_service`] checks a single raw service entry for the
//! problems that would make it unusable: missing required fields, a
//! base URL that does not parse, an unjoinable health check path, or a
//! malformed MAC address. [`validate`] applies it to a whole
//! [`FileConfig`] and is what the `wakeward validate` subcommand runs.
//! Returns [`ValidationError`] values with per-field suggestions.

use url::Url;

use super::model::{FileConfig, RawService};
use crate::error::ValidationError;
use crate::wake::MacAddr;

/// Validate a base URL string. Returns `Ok(())` or a human-readable error.
pub fn validate_base_url(url: &str) -> Result<(), String> {
    match Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme != "http" && scheme != "https" {
                Err(format!(
                    "unsupported scheme '{scheme}' (expected http or https)"
                ))
            } else {
                Ok(())
            }
        }
        Err(_) => Err(format!("'{url}' is not a valid URL")),
    }
}

pub fn validate_service(host: &str, service: &RawService) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let service_id = if host.is_empty() { "(unnamed)" } else { host };

    let mut base: Option<Url> = None;
    match service.base_url.as_deref() {
        None | Some("") => errors.push(ValidationError {
            service: service_id.into(),
            field: "base_url".into(),
            message: "base_url is required".into(),
            suggestion: Some("e.g. http://192.168.1.10:8080".into()),
        }),
        Some(url) => match validate_base_url(url) {
            Ok(()) => base = Url::parse(url).ok(),
            Err(message) => errors.push(ValidationError {
                service: service_id.into(),
                field: "base_url".into(),
                message,
                suggestion: None,
            }),
        },
    }

    match service.health_check_path.as_deref() {
        None | Some("") => errors.push(ValidationError {
            service: service_id.into(),
            field: "health_check_path".into(),
            message: "health_check_path is required".into(),
            suggestion: Some("e.g. /health".into()),
        }),
        Some(path) => {
            if let Some(ref base) = base {
                if base.join(path).is_err() {
                    errors.push(ValidationError {
                        service: service_id.into(),
                        field: "health_check_path".into(),
                        message: format!("'{path}' cannot be resolved against base_url"),
                        suggestion: None,
                    });
                }
            }
        }
    }

    match service.mac_address.as_deref() {
        None | Some("") => errors.push(ValidationError {
            service: service_id.into(),
            field: "mac_address".into(),
            message: "mac_address is required".into(),
            suggestion: Some("e.g. 00:11:22:33:44:55".into()),
        }),
        Some(mac) => {
            if mac.parse::<MacAddr>().is_err() {
                errors.push(ValidationError {
                    service: service_id.into(),
                    field: "mac_address".into(),
                    message: format!("'{mac}' is not a valid MAC address"),
                    suggestion: Some("six hex octets separated by ':' or '-'".into()),
                });
            }
        }
    }

    errors
}

pub fn validate(config: &FileConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.services.is_empty() {
        errors.push(ValidationError {
            service: "(root)".into(),
            field: "services".into(),
            message: "at least one service must be defined".into(),
            suggestion: None,
        });
        return Err(errors);
    }

    // Deterministic report order regardless of map iteration.
    let mut hosts: Vec<&String> = config.services.keys().collect();
    hosts.sort();

    for host in hosts {
        errors.extend(validate_service(host, &config.services[host]));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// One-line summary for the text output of `wakeward validate`.
#[must_use]
pub fn format_validation_report(path: &str, config: &FileConfig) -> String {
    format!(
        "{path} is valid: {} service{}",
        config.service_count(),
        if config.service_count() == 1 { "" } else { "s" }
    )
}
