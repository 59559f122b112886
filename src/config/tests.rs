//! Configuration tests

use super::*;
use std::collections::HashMap;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

/// The template written by `ensure_config_exists` must load back unchanged
#[test]
fn test_default_template_loads_as_defaults() {
    let template = Config::default().to_toml();
    let file = Config::parse_file_config(&template).unwrap_or_else(|e| {
        panic!("Default config should parse.\nTOML:\n{}\nError: {:?}", template, e)
    });

    let config = Config::merge(file, env_of(&[]));
    let defaults = Config::default();
    assert_eq!(config.pedal_url, defaults.pedal_url);
    assert_eq!(config.poll_interval, defaults.poll_interval);
    assert_eq!(config.request_timeout, defaults.request_timeout);
    assert_eq!(config.flash_duration, defaults.flash_duration);
    assert_eq!(config.theme, defaults.theme);
    assert_eq!(config.logging.level, defaults.logging.level);
    assert_eq!(config.logging.file_rotation, defaults.logging.file_rotation);
    assert_eq!(config.logging.file_prefix, "slpanel");
}

#[test]
fn test_template_mentions_every_file_key() {
    let template = Config::default().to_toml();
    for key in [
        "pedal_url",
        "poll_ms",
        "request_timeout_ms",
        "flash_ms",
        "theme",
        "[logging]",
        "file_enabled",
        "file_dir",
        "file_rotation",
        "file_prefix",
    ] {
        assert!(template.contains(key), "template is missing {}", key);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_env_overrides_file() {
    let file = Config::parse_file_config(
        r#"
pedal_url = "http://pedal.local:5000"
poll_ms = 5000
theme = "light"
"#,
    )
    .unwrap();

    let config = Config::merge(
        file,
        env_of(&[
            ("SLPANEL_PEDAL_URL", "http://10.0.0.7:5000/"),
            ("SLPANEL_POLL_MS", "1000"),
        ]),
    );

    assert_eq!(config.pedal_url, "http://10.0.0.7:5000");
    assert_eq!(config.poll_interval, Duration::from_millis(1000));
    assert_eq!(config.theme, "light");
}

#[test]
fn test_file_overrides_defaults() {
    let file = Config::parse_file_config(
        r#"
request_timeout_ms = 500
flash_ms = 1500

[logging]
level = "debug"
file_enabled = true
file_rotation = "hourly"
"#,
    )
    .unwrap();

    let config = Config::merge(file, env_of(&[]));
    assert_eq!(config.pedal_url, DEFAULT_PEDAL_URL);
    assert_eq!(config.request_timeout, Duration::from_millis(500));
    assert_eq!(config.flash_duration, Duration::from_millis(1500));
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.file_enabled);
    assert_eq!(config.logging.file_rotation, LogRotation::Hourly);
    assert_eq!(config.logging.file_dir, PathBuf::from("./logs"));
}

#[test]
fn test_runtime_flags() {
    let config = Config::merge(FileConfig::default(), env_of(&[]));
    assert!(config.enable_tui);
    assert!(!config.demo_mode);

    let config = Config::merge(
        FileConfig::default(),
        env_of(&[("SLPANEL_NO_TUI", "TRUE"), ("SLPANEL_DEMO", "1")]),
    );
    assert!(!config.enable_tui);
    assert!(config.demo_mode);

    let config = Config::merge(FileConfig::default(), env_of(&[("SLPANEL_DEMO", "yes")]));
    assert!(!config.demo_mode);
}

#[test]
fn test_poll_period_has_floor_and_ignores_garbage() {
    let config = Config::merge(FileConfig::default(), env_of(&[("SLPANEL_POLL_MS", "10")]));
    assert_eq!(config.poll_interval, Duration::from_millis(MIN_POLL_MS));

    let config = Config::merge(
        FileConfig::default(),
        env_of(&[("SLPANEL_POLL_MS", "soon")]),
    );
    assert_eq!(config.poll_interval, Duration::from_millis(DEFAULT_POLL_MS));
}

#[test]
fn test_malformed_file_is_an_error() {
    assert!(Config::parse_file_config("poll_ms = \"fast\"").is_err());
    assert!(Config::parse_file_config("[logging\nlevel = 1").is_err());
}

#[test]
fn test_unknown_rotation_falls_back_to_daily() {
    assert_eq!(LogRotation::parse("weekly"), LogRotation::Daily);
    assert_eq!(LogRotation::parse("NEVER"), LogRotation::Never);
}

#[test]
fn test_filter_directive_covers_both_targets() {
    let logging = LoggingConfig::from_file(Some(FileLogging {
        level: Some("debug".to_string()),
        ..Default::default()
    }));
    assert_eq!(
        logging.filter_directive(),
        "strangeloop_panel=debug,slpanel=debug"
    );
    assert!(!logging.file_enabled);
}
