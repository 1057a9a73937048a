//! # Configuration
//!
//! Optional TOML configuration for the CLI.
//!
//! Resolution order (later wins):
//! 1. built-in defaults
//! 2. `--config <FILE>`, or `flowports.toml` in the working directory if present
//! 3. environment: `FLOWPORTS_LOG_FORMAT`
//! 4. command-line flags (applied by the caller)
//!
//! ```toml
//! log_format = "json"        # "text" | "json"
//! json_mode = true           # machine-readable command output
//! max_snapshot_bytes = 1048576
//! ```

use flowports_core::FlowError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "flowports.toml";

/// Environment variable overriding the log format.
pub const LOG_FORMAT_ENV: &str = "FLOWPORTS_LOG_FORMAT";

/// Default maximum snapshot file size (100 MB).
pub const DEFAULT_MAX_SNAPSHOT_BYTES: u64 = 100 * 1024 * 1024;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Parse a format name; anything but "json" is text.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub log_format: LogFormat,
    pub json_mode: bool,
    pub max_snapshot_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Text,
            json_mode: false,
            max_snapshot_bytes: DEFAULT_MAX_SNAPSHOT_BYTES,
        }
    }
}

impl AppConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, FlowError> {
        toml::from_str(contents).map_err(|e| FlowError::ConfigError(e.to_string()))
    }

    /// Load configuration from `explicit`, or from [`DEFAULT_CONFIG_FILE`]
    /// if it exists. An explicit path that cannot be read is an error; a
    /// missing default file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self, FlowError> {
        let path = match explicit {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = std::fs::read_to_string(path).map_err(|e| {
            FlowError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Apply environment overrides.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_log_format_override(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }

    /// Override the log format when `value` is present.
    #[must_use]
    pub fn with_log_format_override(mut self, value: Option<&str>) -> Self {
        if let Some(name) = value {
            self.log_format = LogFormat::from_name(name);
        }
        self
    }
}

// =============================================================================
// TESTS
// =============================================================================
