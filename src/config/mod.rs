//! Configuration management for xcsh
//!
//! Configuration is read from a TOML file and then overridden by command-line
//! arguments. Precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values
//!
//! A missing configuration file is not an error; defaults are used.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::repl::completion::MAX_TTL;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Completion and lookup cache configuration
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Session defaults
    #[serde(default)]
    pub session: SessionConfig,

    /// History configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Completion-related configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionConfig {
    /// Time-to-live of cached namespace and resource name lookups, in seconds,
    /// at most one year
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// How long the line editor waits for a cold lookup, in milliseconds
    #[serde(default = "default_fetch_budget")]
    pub fetch_budget_ms: u64,

    /// Warm resource name caches when entering a domain
    #[serde(default = "default_prefetch_on_enter")]
    pub prefetch_on_enter: bool,
}

/// Session defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Namespace used when the input does not name one
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// Enable colored prompt
    #[serde(default = "default_color_output")]
    pub color_output: bool,
}

/// In-memory command history configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryConfig {
    /// Maximum number of history entries
    #[serde(default = "default_max_history_size")]
    pub max_size: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_cache_ttl() -> u64 {
    30
}

fn default_fetch_budget() -> u64 {
    300
}

fn default_prefetch_on_enter() -> bool {
    true
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_color_output() -> bool {
    true
}

fn default_max_history_size() -> usize {
    1000
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            completion: CompletionConfig::default(),
            session: SessionConfig::default(),
            history: HistoryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            fetch_budget_ms: default_fetch_budget(),
            prefetch_on_enter: default_prefetch_on_enter(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_namespace: default_namespace(),
            color_output: default_color_output(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_history_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Explicit config path, or `None` for the default location
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration, defaults if the file does not exist
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize configuration to TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeFailed(e.to_string()).into())
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".xcsh")
            .join("config.toml")
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, the first invalid field otherwise
    pub fn validate(&self) -> Result<()> {
        let ttl = self.completion.cache_ttl_secs;
        if ttl == 0 || ttl > MAX_TTL.as_secs() {
            return Err(invalid("completion.cache_ttl_secs", &ttl.to_string()));
        }
        if self.history.max_size == 0 {
            return Err(invalid("history.max_size", "0"));
        }
        if self.session.default_namespace.trim().is_empty() {
            return Err(invalid(
                "session.default_namespace",
                &self.session.default_namespace,
            ));
        }
        Ok(())
    }

    /// Get lookup cache TTL as Duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.completion.cache_ttl_secs)
    }

    /// Get the line editor fetch budget as Duration
    pub fn fetch_budget(&self) -> Duration {
        Duration::from_millis(self.completion.fetch_budget_ms)
    }
}

fn invalid(field: &str, value: &str) -> crate::error::ShellError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
