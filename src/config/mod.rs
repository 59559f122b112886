//! Configuration for the control panel
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/strangeloop/panel.toml)
//! 3. Built-in defaults (lowest priority)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod observability;
mod serialization;

#[cfg(test)]
mod tests;

pub use observability::{FileLogging, LogRotation, LoggingConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Where the pedal's session service listens unless told otherwise
pub const DEFAULT_PEDAL_URL: &str = "http://localhost:5000";

const DEFAULT_POLL_MS: u64 = 3_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_FLASH_MS: u64 = 4_000;
const DEFAULT_THEME: &str = "dark";

/// Polling faster than this only queues requests behind each other
const MIN_POLL_MS: u64 = 250;

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the pedal's session service
    pub pedal_url: String,

    /// Period of the session/member/loop poll
    pub poll_interval: Duration,

    /// Per-request timeout for the session service
    pub request_timeout: Duration,

    /// How long a flash message stays on screen
    pub flash_duration: Duration,

    /// Whether to enable the TUI (can be disabled for headless mode)
    pub enable_tui: bool,

    /// Demo mode: run against an in-process pedal instead of `pedal_url`
    pub demo_mode: bool,

    /// Theme name: "dark", "light", "mono"
    pub theme: String,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pedal_url: DEFAULT_PEDAL_URL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            flash_duration: Duration::from_millis(DEFAULT_FLASH_MS),
            enable_tui: true,
            demo_mode: false,
            theme: DEFAULT_THEME.to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure (subset of Config that makes sense to persist)
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub pedal_url: Option<String>,
    pub poll_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub flash_ms: Option<u64>,
    pub theme: Option<String>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/strangeloop/panel.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("strangeloop").join("panel.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load the file layer; a missing file is an empty layer
    ///
    /// A file that exists but cannot be read or parsed is an error, not a
    /// silent fallback to defaults.
    fn load_file_config() -> Result<FileConfig> {
        let Some(path) = Self::config_path() else {
            return Ok(FileConfig::default());
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse_file_config(&contents)
                .with_context(|| format!("Invalid config file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => {
                Err(e).with_context(|| format!("Cannot read config file {}", path.display()))
            }
        }
    }

    pub(crate) fn parse_file_config(contents: &str) -> Result<FileConfig> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration: env vars -> file -> defaults
    pub fn from_env() -> Result<Self> {
        let file = Self::load_file_config()?;
        Ok(Self::merge(file, |name| std::env::var(name).ok()))
    }

    /// Layer `env` over `file` over defaults
    pub(crate) fn merge(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        // Boolean runtime flags accept "1" or "true"
        let flag = |name: &str| env(name).map(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        // Pedal URL: env > file > default
        let pedal_url = env("SLPANEL_PEDAL_URL")
            .or(file.pedal_url)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_PEDAL_URL.to_string());

        // Poll period: env > file > default, clamped to a sane floor
        let poll_ms = env("SLPANEL_POLL_MS")
            .and_then(|v| v.parse().ok())
            .or(file.poll_ms)
            .unwrap_or(DEFAULT_POLL_MS)
            .max(MIN_POLL_MS);

        let request_timeout_ms = file
            .request_timeout_ms
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);
        let flash_ms = file.flash_ms.unwrap_or(DEFAULT_FLASH_MS);

        // TUI toggle and demo mode: env only (runtime flags)
        let enable_tui = !flag("SLPANEL_NO_TUI").unwrap_or(false);
        let demo_mode = flag("SLPANEL_DEMO").unwrap_or(false);

        // Theme: env > file > default
        let theme = env("SLPANEL_THEME")
            .or(file.theme)
            .unwrap_or_else(|| DEFAULT_THEME.to_string());

        let logging = LoggingConfig::from_file(file.logging);

        Self {
            pedal_url,
            poll_interval: Duration::from_millis(poll_ms),
            request_timeout: Duration::from_millis(request_timeout_ms),
            flash_duration: Duration::from_millis(flash_ms),
            enable_tui,
            demo_mode,
            theme,
            logging,
        }
    }
}
