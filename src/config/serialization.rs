//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Render the config as a commented TOML file
    pub fn to_toml(&self) -> String {
        format!(
            r#"# strangeloop panel configuration

# Base URL of the pedal's session service (SLPANEL_PEDAL_URL overrides)
pedal_url = "{pedal_url}"

# Poll period for session, members and loops, in milliseconds
poll_ms = {poll_ms}

# Per-request timeout, in milliseconds
request_timeout_ms = {timeout_ms}

# How long flash messages stay on screen, in milliseconds
flash_ms = {flash_ms}

# Theme: dark, light, mono
theme = "{theme}"

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# File logging (in addition to TUI buffer or stdout)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            pedal_url = self.pedal_url,
            poll_ms = self.poll_interval.as_millis(),
            timeout_ms = self.request_timeout.as_millis(),
            flash_ms = self.flash_duration.as_millis(),
            theme = self.theme,
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = self.logging.file_dir.display(),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }
}
