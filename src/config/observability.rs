//! `[logging]` section: level filter and the optional JSON log file

use serde::Deserialize;
use std::path::PathBuf;

/// How often the JSON log file rolls over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    /// One file for the whole run
    Never,
}

impl LogRotation {
    const ALL: [LogRotation; 3] = [Self::Hourly, Self::Daily, Self::Never];

    /// Case-insensitive; unknown names fall back to daily with a warning
    pub fn parse(name: &str) -> Self {
        let wanted = name.trim().to_ascii_lowercase();
        match Self::ALL.into_iter().find(|r| r.as_str() == wanted) {
            Some(rotation) => rotation,
            None => {
                eprintln!(
                    "Warning: unknown file_rotation {:?} in config, using \"daily\"",
                    name
                );
                Self::Daily
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        }
    }

    pub fn as_appender_rotation(self) -> tracing_appender::rolling::Rotation {
        use tracing_appender::rolling::Rotation;
        match self {
            Self::Hourly => Rotation::HOURLY,
            Self::Daily => Rotation::DAILY,
            Self::Never => Rotation::NEVER,
        }
    }
}

/// Effective logging settings
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level for the panel's own targets (trace..error)
    pub level: String,
    /// Also write JSON lines to `file_dir`
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_rotation: LogRotation,
    /// File name stem, e.g. "slpanel" -> "slpanel.2026-10-16"
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: PathBuf::from("./logs"),
            file_rotation: LogRotation::Daily,
            file_prefix: "slpanel".to_string(),
        }
    }
}

/// `[logging]` as written in panel.toml; every key optional
#[derive(Debug, Deserialize, Default)]
pub struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<String>,
    pub file_rotation: Option<String>,
    pub file_prefix: Option<String>,
}

impl LoggingConfig {
    /// Fill unset keys from the defaults
    pub fn from_file(file: Option<FileLogging>) -> Self {
        let mut config = Self::default();
        let Some(file) = file else {
            return config;
        };

        if let Some(level) = file.level {
            config.level = level;
        }
        if let Some(enabled) = file.file_enabled {
            config.file_enabled = enabled;
        }
        if let Some(dir) = file.file_dir {
            config.file_dir = PathBuf::from(dir);
        }
        if let Some(rotation) = file.file_rotation {
            config.file_rotation = LogRotation::parse(&rotation);
        }
        if let Some(prefix) = file.file_prefix {
            config.file_prefix = prefix;
        }
        config
    }

    /// EnvFilter directive used when RUST_LOG is unset
    ///
    /// The library target and the binary target are filtered alike, other
    /// crates (hyper, reqwest) stay at their default of off.
    pub fn filter_directive(&self) -> String {
        format!("strangeloop_panel={0},slpanel={0}", self.level)
    }
}
