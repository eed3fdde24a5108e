//! Configuration loading, validation, and management for Navigator.
//!
//! Loads configuration from `~/.navigator/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.navigator/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Hosted agent configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Session storage configuration
    #[serde(default)]
    pub sessions: SessionsConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Identifier of the hosted agent to run queries against
    #[serde(default)]
    pub agent_id: String,

    /// Platform credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Platform API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound on a single agent run, in seconds
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,

    /// Polling cadence while waiting for an asynchronous run, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_base_url() -> String {
    "https://platform-api.aixplain.com".into()
}
fn default_run_timeout_secs() -> u64 {
    300
}
fn default_poll_interval_ms() -> u64 {
    1000
}

impl AgentConfig {
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_id: String::new(),
            api_key: None,
            base_url: default_base_url(),
            run_timeout_secs: default_run_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("agent_id", &self.agent_id)
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("run_timeout_secs", &self.run_timeout_secs)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Directory holding one `session_{id}.json` file per session
    #[serde(default = "default_sessions_dir")]
    pub dir: PathBuf,

    /// Maximum characters of the first user message shown in a session title
    #[serde(default = "default_title_max_length")]
    pub title_max_length: usize,

    /// Skip (and log) unparseable session files instead of failing the listing
    #[serde(default)]
    pub skip_malformed: bool,

    /// Upper bound on a single storage operation, in seconds
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,
}

fn default_sessions_dir() -> PathBuf {
    PathBuf::from("sessions").join("Saved_Sessions")
}
fn default_title_max_length() -> usize {
    30
}
fn default_io_timeout_secs() -> u64 {
    10
}

impl SessionsConfig {
    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            dir: default_sessions_dir(),
            title_max_length: default_title_max_length(),
            skip_malformed: false,
            io_timeout_secs: default_io_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    5000
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.navigator/config.toml).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_overrides(&Self::config_dir().join("config.toml"))
    }

    /// Load configuration from `path`, then apply environment overrides:
    /// - `NAVIGATOR_AGENT_ID`
    /// - `AIXPLAIN_API_KEY`
    /// - `NAVIGATOR_SESSIONS_DIR`
    /// - `NAVIGATOR_PORT`
    pub fn load_with_overrides(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup (highest priority).
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(agent_id) = lookup("NAVIGATOR_AGENT_ID") {
            self.agent.agent_id = agent_id;
        }

        if let Some(api_key) = lookup("AIXPLAIN_API_KEY") {
            self.agent.api_key = Some(api_key);
        }

        if let Some(dir) = lookup("NAVIGATOR_SESSIONS_DIR") {
            self.sessions.dir = PathBuf::from(dir);
        }

        if let Some(port) = lookup("NAVIGATOR_PORT") {
            self.gateway.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("NAVIGATOR_PORT is not a valid port: {port}"))
            })?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".navigator")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "agent.base_url must not be empty".into(),
            ));
        }

        if self.agent.run_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "agent.run_timeout_secs must be > 0".into(),
            ));
        }

        if self.agent.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "agent.poll_interval_ms must be > 0".into(),
            ));
        }

        if self.sessions.title_max_length == 0 {
            return Err(ConfigError::ValidationError(
                "sessions.title_max_length must be > 0".into(),
            ));
        }

        if self.sessions.io_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "sessions.io_timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an agent credential is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.agent.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Generate a default config TOML string (for the `config` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
