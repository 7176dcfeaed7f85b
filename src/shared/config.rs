use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use schemars::JsonSchema;
use serde::Deserialize;

use super::dirs;

/// Top-level configuration for tmux-notify.
#[derive(Debug, Default, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Notification record settings.
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Terminal bell settings.
    #[serde(default)]
    pub sound: SoundConfig,

    /// tmux popup settings.
    #[serde(default)]
    pub popup: PopupConfig,

    /// Diagnostic log settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Notification record configuration.
#[derive(Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NotificationConfig {
    /// Maximum number of characters kept from a message (default: 500).
    #[serde(default = "default_max_message_chars")]
    #[schemars(default = "default_max_message_chars")]
    pub max_message_chars: usize,

    /// Hours a stored notification is kept before being swept (default: 24).
    #[serde(default = "default_retention_hours")]
    #[schemars(default = "default_retention_hours")]
    pub retention_hours: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            max_message_chars: default_max_message_chars(),
            retention_hours: default_retention_hours(),
        }
    }
}

impl NotificationConfig {
    pub fn retention(&self) -> TimeDelta {
        retention_period(self.retention_hours)
    }
}

/// Converts an hour count to a duration, saturating at the largest representable one.
pub fn retention_period(hours: u64) -> TimeDelta {
    i64::try_from(hours)
        .ok()
        .and_then(TimeDelta::try_hours)
        .unwrap_or(TimeDelta::MAX)
}

/// Terminal bell configuration.
#[derive(Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SoundConfig {
    /// Whether to ring the terminal bell on every notification (default: true).
    #[serde(default = "default_true")]
    #[schemars(default = "default_true")]
    pub enabled: bool,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

/// tmux popup configuration.
#[derive(Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PopupConfig {
    /// Whether immediate notifications open a popup (default: true).
    #[serde(default = "default_true")]
    #[schemars(default = "default_true")]
    pub enabled: bool,

    /// Popup script invoked with the notification ID
    /// (default: ~/.claude/hooks/claude-popup.sh).
    #[serde(default)]
    pub script: Option<PathBuf>,

    /// Popup width passed to `tmux display-popup -w` (default: "85%").
    #[serde(default = "default_popup_width")]
    #[schemars(default = "default_popup_width")]
    pub width: String,

    /// Popup height passed to `tmux display-popup -h` (default: "60%").
    #[serde(default = "default_popup_height")]
    #[schemars(default = "default_popup_height")]
    pub height: String,

    /// Popup title passed to `tmux display-popup -T`.
    #[serde(default = "default_popup_title")]
    #[schemars(default = "default_popup_title")]
    pub title: String,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            script: None,
            width: default_popup_width(),
            height: default_popup_height(),
            title: default_popup_title(),
        }
    }
}

impl PopupConfig {
    /// Returns the configured script, or the default location under ~/.claude/hooks.
    pub fn script_path(&self) -> Option<PathBuf> {
        self.script
            .clone()
            .or_else(|| dirs::claude_hooks_dir().map(|d| d.join("claude-popup.sh")))
    }
}

/// Diagnostic log configuration.
#[derive(Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Log level or filter directive (default: "info"). Overridden by TMUX_NOTIFY_LOG.
    #[serde(default = "default_log_level")]
    #[schemars(default = "default_log_level")]
    pub level: String,

    /// Log line format (default: "text").
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log line format.
#[derive(Debug, Default, Clone, Copy, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Character cap for notification messages when the config does not set one.
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 500;

fn default_max_message_chars() -> usize {
    DEFAULT_MAX_MESSAGE_CHARS
}

fn default_retention_hours() -> u64 {
    24
}

fn default_true() -> bool {
    true
}

fn default_popup_width() -> String {
    "85%".to_string()
}

fn default_popup_height() -> String {
    "60%".to_string()
}

fn default_popup_title() -> String {
    "Claude Code Notification".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read config file (permission error, etc.)
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parse error
    #[error("Invalid config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Load configuration from ~/.config/tmux-notify/config.ya?ml.
/// Returns Config::default() if no config file exists.
pub fn load_config() -> anyhow::Result<Config> {
    let Some(dir) = dirs::config_dir() else {
        return Ok(Config::default());
    };
    load_config_from_dir(&dir.join("tmux-notify"))
}

/// Load configuration from a specific directory.
/// Searches for config.yaml, then config.yml in the given directory.
/// Returns Config::default() if neither file exists.
pub fn load_config_from_dir(dir: &Path) -> anyhow::Result<Config> {
    for filename in &["config.yaml", "config.yml"] {
        let path = dir.join(filename);
        match std::fs::read_to_string(&path) {
            Ok(content) => return parse_config(&content, &path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(ConfigError::ReadError { path, source: e }.into()),
        }
    }

    Ok(Config::default())
}

/// Parse YAML content into Config.
fn parse_config(content: &str, path: &Path) -> anyhow::Result<Config> {
    serde_yaml::from_str(content)
        .map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
        .map_err(Into::into)
}

/// Generate JSON Schema for the Config struct.
pub fn generate_schema() -> schemars::Schema {
    schemars::schema_for!(Config)
}
