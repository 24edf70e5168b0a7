//! `wakeward init` — generate a starter configuration file.
//!
//! Writes a commented sample service entry in the chosen format.
//! Refuses to overwrite an existing file.

use std::path::PathBuf;

use crate::cli::{ConfigFormat, InitArgs};
use crate::config::model::{FileConfig, RawService};
use crate::error::WakewardError;

pub fn execute(args: &InitArgs) -> Result<(), WakewardError> {
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("wakeward.{}", args.format.extension())));

    if path.exists() {
        return Err(WakewardError::FileExists { path });
    }

    let content = render(&args.format)?;
    std::fs::write(&path, content)?;

    println!("Created {}", path.display());
    println!("Edit it with your service's base URL, health check path, and MAC address,");
    println!("then start the proxy with: wakeward run -c {}", path.display());

    Ok(())
}

fn starter_config() -> FileConfig {
    let mut config = FileConfig::default();
    config.services.insert(
        "nas.example.com".to_string(),
        RawService {
            base_url: Some("http://192.168.1.10:8080".into()),
            health_check_path: Some("/health".into()),
            mac_address: Some("00:11:22:33:44:55".into()),
            ..RawService::default()
        },
    );
    config
}

fn render(format: &ConfigFormat) -> Result<String, WakewardError> {
    let config = starter_config();

    match format {
        #[cfg(feature = "yaml")]
        ConfigFormat::Yaml => {
            let body =
                serde_yml::to_string(&config).map_err(|e| WakewardError::ConfigParse {
                    path: "starter config".into(),
                    source: Box::new(e),
                })?;
            Ok(format!(
                "# Wakeward service registry.\n\
                 # Requests whose Host header matches a key below are proxied to that\n\
                 # backend, waking it via Wake-on-LAN first when necessary.\n\
                 {body}"
            ))
        }

        #[cfg(feature = "json")]
        ConfigFormat::Json => {
            serde_json::to_string_pretty(&config).map_err(|e| WakewardError::ConfigParse {
                path: "starter config".into(),
                source: Box::new(e),
            })
        }

        #[cfg(feature = "toml")]
        ConfigFormat::Toml => {
            toml::to_string_pretty(&config).map_err(|e| WakewardError::ConfigParse {
                path: "starter config".into(),
                source: Box::new(e),
            })
        }

        #[allow(unreachable_patterns)]
        other => Err(WakewardError::UnsupportedFormat(format!("{other:?}"))),
    }
}
