//! Integration tests for config loading, env overrides, and registry build.

use std::time::Duration;

use wakeward::config::env::apply_overrides_from;
use wakeward::config::model::FileConfig;
use wakeward::config::registry::build_registry;
use wakeward::config::sources::parse_config_str;
use wakeward::config::validation::validate;

fn load_example(name: &str) -> String {
    let path = format!("example/{name}");
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"))
}

#[test]
fn yaml_example_loads_and_validates() {
    let content = load_example("wakeward.yaml");
    let config = parse_config_str("yaml", &content, "wakeward.yaml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.service_count(), 1);
}

#[test]
fn yaml_full_example_loads_and_validates() {
    let content = load_example("full.yaml");
    let config = parse_config_str("yaml", &content, "full.yaml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.service_count(), 3);
    assert_eq!(config.defaults.poll_interval, 3);
    assert_eq!(config.defaults.max_retries, 20);
}

#[cfg(feature = "json")]
#[test]
fn json_example_loads_and_validates() {
    let content = load_example("wakeward.json");
    let config = parse_config_str("json", &content, "wakeward.json").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.service_count(), 1);
}

#[cfg(feature = "toml")]
#[test]
fn toml_example_loads_and_validates() {
    let content = load_example("wakeward.toml");
    let config = parse_config_str("toml", &content, "wakeward.toml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.service_count(), 1);
}

#[cfg(all(feature = "json", feature = "toml"))]
#[test]
fn all_formats_produce_equivalent_configs() {
    let yaml = parse_config_str("yaml", &load_example("wakeward.yaml"), "yaml").unwrap();
    let json = parse_config_str("json", &load_example("wakeward.json"), "json").unwrap();
    let toml = parse_config_str("toml", &load_example("wakeward.toml"), "toml").unwrap();

    for config in [&json, &toml] {
        assert_eq!(config.service_count(), yaml.service_count());
        let a = &yaml.services["nas.example.com"];
        let b = &config.services["nas.example.com"];
        assert_eq!(a.base_url, b.base_url);
        assert_eq!(a.mac_address, b.mac_address);
    }
}

#[test]
fn unsupported_format_returns_error() {
    let result = parse_config_str("xml", "{}", "test.xml");
    assert!(result.is_err());
}

#[test]
fn defaults_flow_into_resolved_services() {
    let content = load_example("full.yaml");
    let config = parse_config_str("yaml", &content, "full.yaml").unwrap();
    let registry = build_registry(&config);
    assert_eq!(registry.len(), 3);

    // nas uses all globals
    let nas = registry.get("nas.example.com").unwrap();
    assert_eq!(nas.poll_interval, Duration::from_secs(3));
    assert_eq!(nas.max_retries, 20);
    assert_eq!(nas.probe_timeout, Duration::from_secs(2));
    assert_eq!(nas.forward_timeout, Duration::from_secs(10));

    // media overrides poll_interval/max_retries, inherits timeouts
    let media = registry.get("media.example.com").unwrap();
    assert_eq!(media.poll_interval, Duration::from_secs(10));
    assert_eq!(media.max_retries, 5);
    assert_eq!(media.probe_timeout, Duration::from_secs(2));
}

#[test]
fn env_vars_complete_a_partial_file_entry() {
    let content = "services:\n  nas:\n    base_url: http://192.168.1.10\n";
    let mut config = parse_config_str("yaml", content, "inline").unwrap();

    apply_overrides_from(
        &mut config.services,
        vec![
            (
                "SERVICE_NAS_HEALTH_CHECK_PATH".to_string(),
                "/health".to_string(),
            ),
            (
                "SERVICE_NAS_MAC_ADDRESS".to_string(),
                "00:11:22:33:44:55".to_string(),
            ),
        ],
    );

    let registry = build_registry(&config);
    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry.get("nas").unwrap().health_check_path,
        "/health"
    );
}

#[test]
fn env_override_merges_with_uppercase_file_key() {
    let content = "\
services:
  NAS:
    base_url: http://old.example
    health_check_path: /health
    mac_address: 00:11:22:33:44:55
";
    let mut config = parse_config_str("yaml", content, "inline").unwrap();

    apply_overrides_from(
        &mut config.services,
        vec![(
            "SERVICE_NAS_BASE_URL".to_string(),
            "http://new.example".to_string(),
        )],
    );

    // One service, with the env value layered onto the file entry.
    let registry = build_registry(&config);
    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry.get("nas").unwrap().base_url.as_str(),
        "http://new.example/"
    );
}

#[test]
fn invalid_entries_are_discarded_at_build() {
    let content = "\
services:
  good.example:
    base_url: http://192.168.1.10
    health_check_path: /health
    mac_address: 00:11:22:33:44:55
  no-mac.example:
    base_url: http://192.168.1.11
    health_check_path: /health
  bad-url.example:
    base_url: not a url
    health_check_path: /health
    mac_address: 00:11:22:33:44:55
";
    let config = parse_config_str("yaml", content, "inline").unwrap();

    // Strict validation reports both broken services...
    let errors = validate(&config).unwrap_err();
    assert_eq!(errors.len(), 2);

    // ...while the registry keeps the good one.
    let registry = build_registry(&config);
    assert_eq!(registry.len(), 1);
    assert!(registry.get("good.example").is_some());
}

#[test]
fn unknown_fields_are_rejected() {
    let content = "services:\n  nas:\n    base_url: http://x\n    surprise: true\n";
    assert!(parse_config_str("yaml", content, "inline").is_err());
}

#[test]
fn empty_config_fails_validation() {
    let config = FileConfig::default();
    assert!(validate(&config).is_err());
}
