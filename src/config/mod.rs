//! Configuration management for forge
//!
//! This module handles loading, parsing, and managing configuration from various sources:
//! - Configuration files (TOML format)
//! - Environment variables
//! - Command-line arguments
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values
//!
//! Updates go through [`ConfigStore`], which edits the TOML document in
//! place so comments and formatting in the user's file survive a write.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "FORGE_CONFIG";

/// Environment variable carrying an `owner/name` repository override.
pub const REPO_ENV: &str = "FORGE_REPO";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// User-facing settings (`forge config set <key> <value>`)
    #[serde(default)]
    pub settings: Settings,

    /// Remote API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-host settings, keyed by hostname
    #[serde(default)]
    pub hosts: BTreeMap<String, HostConfig>,
}

/// User-facing settings updated through `config set`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Protocol to use for git operations (ssh, https)
    #[serde(default = "default_git_protocol")]
    pub git_protocol: String,

    /// Editor to run when composing text
    #[serde(default)]
    pub editor: Option<String>,

    /// Interactive prompting (enabled, disabled)
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Terminal pager program for standard output
    #[serde(default)]
    pub pager: Option<String>,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Default API host
    #[serde(default = "default_host")]
    pub host: String,

    /// Request timeout in seconds
    ///
    /// Applies to every remote call, including completion-time queries, so
    /// it must stay small enough for an interactive keystroke.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
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

/// Per-host configuration overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HostConfig {
    /// OAuth token for this host
    #[serde(default)]
    pub token: Option<String>,

    /// git_protocol override for this host
    #[serde(default)]
    pub git_protocol: Option<String>,

    /// Authenticated user name on this host
    #[serde(default)]
    pub user: Option<String>,
}

// Default value functions
fn default_git_protocol() -> String {
    "https".to_string()
}

fn default_prompt() -> String {
    "enabled".to_string()
}

fn default_host() -> String {
    "github.com".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            git_protocol: default_git_protocol(),
            editor: None,
            prompt: default_prompt(),
            pager: None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            timeout: default_timeout(),
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

/// Known configuration keys with their descriptions.
///
/// The descriptions double as completion candidate descriptions for the
/// first positional of `config set`.
pub const KNOWN_KEYS: &[(&str, &str)] = &[
    (
        "git_protocol",
        "What protocol to use when performing git operations.",
    ),
    (
        "editor",
        "What editor forge should run when creating issues, pull requests, etc.",
    ),
    ("prompt", "toggle interactive prompting in the terminal"),
    ("pager", "the terminal pager program to send standard output to"),
];

/// Values accepted for a key, when the key is constrained.
///
/// Keys without an entry (editor, pager) accept any value; the lists used
/// for their completion are suggestions only and live with the command.
pub fn valid_values(key: &str) -> Option<&'static [&'static str]> {
    match key {
        "git_protocol" => Some(&["ssh", "https"]),
        "prompt" => Some(&["enabled", "disabled"]),
        _ => None,
    }
}

/// Validate that a key is a known configuration key.
pub fn validate_key(key: &str) -> Result<()> {
    if KNOWN_KEYS.iter().any(|(name, _)| *name == key) {
        Ok(())
    } else {
        Err(ConfigError::UnknownKey(key.to_string()).into())
    }
}

/// Validate a value against the key's accepted values, if constrained.
pub fn validate_value(key: &str, value: &str) -> Result<()> {
    match valid_values(key) {
        Some(values) if !values.contains(&value) => Err(ConfigError::InvalidValue {
            field: key.to_string(),
            value: value.to_string(),
            valid_values: values.iter().map(|v| v.to_string()).collect(),
        }
        .into()),
        _ => Ok(()),
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file, or defaults when the file is absent
    ///
    /// # Arguments
    /// * `path` - Explicit path, or `None` to resolve via `FORGE_CONFIG`
    ///   and the default location
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::resolve_path(),
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)?;
        toml::from_str(&contents)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Resolve the config file path from the environment or default location
    pub fn resolve_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        Self::default_path()
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("forge")
            .join("config.toml")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_value("git_protocol", &self.settings.git_protocol)?;
        validate_value("prompt", &self.settings.prompt)?;

        for (host, host_config) in &self.hosts {
            if let Some(protocol) = &host_config.git_protocol {
                validate_value("git_protocol", protocol).map_err(|_| {
                    ConfigError::InvalidValue {
                        field: format!("hosts.{host}.git_protocol"),
                        value: protocol.clone(),
                        valid_values: vec!["ssh".to_string(), "https".to_string()],
                    }
                })?;
            }
        }

        Ok(())
    }

    /// Get the OAuth token for a host, if configured
    pub fn token_for(&self, host: &str) -> Option<&str> {
        self.hosts.get(host).and_then(|h| h.token.as_deref())
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout)
    }

    /// Configured host names, for `--host` completion
    pub fn host_names(&self) -> Vec<String> {
        self.hosts.keys().cloned().collect()
    }
}

/// Format-preserving configuration writer.
///
/// Holds the config file as a `toml_edit` document so `set` + `write`
/// round-trips keep user comments and layout intact.
pub struct ConfigStore {
    /// Path the document was loaded from and will be written back to
    path: PathBuf,

    /// Editable TOML document
    document: toml_edit::DocumentMut,
}

impl ConfigStore {
    /// Open the config file for editing, starting from an empty document
    /// when the file does not exist yet
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Config::resolve_path(),
        };

        let document = if path.exists() {
            std::fs::read_to_string(&path)?
                .parse::<toml_edit::DocumentMut>()
                .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?
        } else {
            toml_edit::DocumentMut::new()
        };

        Ok(Self { path, document })
    }

    /// Set a key, either globally under `[settings]` or for a single host
    ///
    /// # Arguments
    /// * `host` - Per-host setting when `Some`, global otherwise
    /// * `key` - Configuration key
    /// * `value` - New value
    pub fn set(&mut self, host: Option<&str>, key: &str, value: &str) -> Result<()> {
        match host {
            Some(host) => {
                self.document["hosts"][host][key] = toml_edit::value(value);
            }
            None => {
                self.document["settings"][key] = toml_edit::value(value);
            }
        }
        Ok(())
    }

    /// Write the document back to disk, creating parent directories
    pub fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteFailed(e.to_string()))?;
        }
        std::fs::write(&self.path, self.document.to_string())
            .map_err(|e| ConfigError::WriteFailed(e.to_string()).into())
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialized document contents
    pub fn contents(&self) -> String {
        self.document.to_string()
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.settings.git_protocol, "https");
        assert_eq!(config.settings.prompt, "enabled");
        assert_eq!(config.api.host, "github.com");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_validate_key_known() {
        assert!(validate_key("git_protocol").is_ok());
        assert!(validate_key("editor").is_ok());
        assert!(validate_key("no_such_key").is_err());
    }

    #[test]
    fn test_validate_value_constrained() {
        assert!(validate_value("git_protocol", "ssh").is_ok());
        assert!(validate_value("git_protocol", "https").is_ok());
        assert!(validate_value("git_protocol", "ftp").is_err());
        assert!(validate_value("prompt", "disabled").is_ok());
        assert!(validate_value("prompt", "sometimes").is_err());
    }

    #[test]
    fn test_validate_value_unconstrained() {
        // editor and pager accept anything
        assert!(validate_value("editor", "ed").is_ok());
        assert!(validate_value("pager", "less -R").is_ok());
    }

    #[test]
    fn test_parse_config_with_hosts() {
        let toml = r#"
            [settings]
            git_protocol = "ssh"

            [hosts."github.com"]
            token = "t0ken"
            user = "octocat"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.settings.git_protocol, "ssh");
        assert_eq!(config.token_for("github.com"), Some("t0ken"));
        assert_eq!(config.token_for("example.com"), None);
        assert_eq!(config.host_names(), vec!["github.com".to_string()]);
    }

    #[test]
    fn test_store_set_preserves_unrelated_content() {
        let original = "# my config\n[settings]\n# keep ssh here\ngit_protocol = \"ssh\"\n";
        let mut store = ConfigStore {
            path: PathBuf::from("/tmp/forge-test-config.toml"),
            document: original.parse().unwrap(),
        };

        store.set(None, "editor", "vim").unwrap();

        let written = store.contents();
        assert!(written.contains("# my config"));
        assert!(written.contains("# keep ssh here"));
        assert!(written.contains("git_protocol = \"ssh\""));
        assert!(written.contains("editor = \"vim\""));
    }

    #[test]
    fn test_store_set_per_host() {
        let mut store = ConfigStore {
            path: PathBuf::from("/tmp/forge-test-config.toml"),
            document: toml_edit::DocumentMut::new(),
        };

        store.set(Some("example.com"), "git_protocol", "ssh").unwrap();

        let written = store.contents();
        let parsed: Config = toml::from_str(&written).unwrap();
        assert_eq!(
            parsed.hosts.get("example.com").unwrap().git_protocol.as_deref(),
            Some("ssh")
        );
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let config =
            Config::load_from_file(Some(Path::new("/nonexistent/forge/config.toml"))).unwrap();
        assert_eq!(config.settings.git_protocol, "https");
    }

    #[test]
    fn test_validate_rejects_bad_protocol() {
        let mut config = Config::default();
        config.settings.git_protocol = "gopher".to_string();
        assert!(config.validate().is_err());
    }
}
