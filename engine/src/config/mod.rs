//! Configuration management
//!
//! This module handles loading, validation, and management of the service
//! configuration. Configuration is stored in TOML format at
//! ~/.aftercare/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level and path to the discharge report file
//! - **llm**: Hosted LLM provider settings
//! - **reference**: Clinical reference index backend (optional)
//! - **search**: Fallback web search backend
//! - **server**: HTTP listen address
//! - **session**: Session time-to-live and sweep interval
//!
//! # Path Expansion
//!
//! The configuration system automatically expands ~ to the user's home
//! directory in the records path. The LLM API key is never stored here; it
//! comes from the environment (see [`crate::secrets`]).
//!
//! # Examples
//!
//! ```no_run
//! use aftercare_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! println!("Records file: {:?}", config.core.records_path);
//! println!("Gemini model: {}", config.llm.gemini.model);
//! # Ok(())
//! # }
//! ```

use crate::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// This structure represents the complete service configuration loaded from
/// ~/.aftercare/config.toml. All sections have usable defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    #[serde(default)]
    pub core: CoreConfig,

    /// LLM provider configuration
    #[serde(default)]
    pub llm: LLMConfig,

    /// Clinical reference index configuration
    #[serde(default)]
    pub reference: ReferenceConfig,

    /// Fallback web search configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Session store configuration
    #[serde(default)]
    pub session: SessionConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Path to the discharge report JSON file (supports ~ expansion)
    #[serde(default = "default_records_path")]
    pub records_path: PathBuf,
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LLMConfig {
    /// Gemini provider settings
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL for the Gemini API
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_gemini_temperature")]
    pub temperature: f64,
    // Note: API key comes from the GEMINI_API_KEY env var, not from config
}

/// Clinical reference index configuration
///
/// When `base_url` is absent the reference service runs in the unavailable
/// state and every clinical query falls back to web search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    /// Base URL of the retrieval backend, if one is deployed
    #[serde(default)]
    pub base_url: Option<String>,

    /// Number of supporting documents to request per query
    #[serde(default = "default_reference_top_k")]
    pub top_k: usize,
}

/// Fallback web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the search endpoint
    #[serde(default = "default_search_base_url")]
    pub base_url: String,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_listen_addr")]
    pub listen: String,
}

/// Session store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds of inactivity after which a session is evicted
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,

    /// Seconds between background eviction sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_records_path() -> PathBuf {
    PathBuf::from("~/.aftercare/discharge_reports.json")
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_temperature() -> f64 {
    0.7
}

fn default_reference_top_k() -> usize {
    3
}

fn default_search_base_url() -> String {
    "https://api.duckduckgo.com".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_session_ttl() -> u64 {
    3600
}

fn default_sweep_interval() -> u64 {
    300
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            records_path: default_records_path(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            temperature: default_gemini_temperature(),
        }
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            top_k: default_reference_top_k(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_base_url(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            llm: LLMConfig::default(),
            reference: ReferenceConfig::default(),
            search: SearchConfig::default(),
            server: ServerConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.aftercare/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default
    /// configuration. Validates the configuration after loading and returns
    /// descriptive errors if validation fails.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails (invalid log level, unparsable listen address)
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default();
        config.validate_and_process()?;

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.aftercare/config.toml)
    fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".aftercare").join("config.toml"))
    }

    /// Validate and process configuration
    ///
    /// This method:
    /// - Validates the log level
    /// - Validates the listen address is a parsable socket address
    /// - Validates session timing bounds
    /// - Expands ~ in the records path
    ///
    /// The records path is NOT required to exist: a missing or malformed
    /// record file degrades to an empty store at startup rather than failing
    /// the process.
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        // Validate log level
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        // Validate listen address
        self.server
            .listen
            .parse::<std::net::SocketAddr>()
            .map_err(|e| {
                EngineError::Config(format!(
                    "Invalid listen address '{}': {}",
                    self.server.listen, e
                ))
            })?;

        // Validate session timing
        if self.session.ttl_secs == 0 {
            return Err(EngineError::Config(
                "session.ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.session.sweep_interval_secs == 0 {
            return Err(EngineError::Config(
                "session.sweep_interval_secs must be greater than zero".to_string(),
            ));
        }

        // Validate reference top_k
        if self.reference.top_k == 0 || self.reference.top_k > 20 {
            return Err(EngineError::Config(
                "reference.top_k must be between 1 and 20".to_string(),
            ));
        }

        // Expand the records path
        self.core.records_path = expand_path(&self.core.records_path)?;

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.core.log_level, "info");
        assert_eq!(config.llm.gemini.model, "gemini-1.5-flash");
        assert_eq!(config.reference.top_k, 3);
        assert!(config.reference.base_url.is_none());
        assert_eq!(config.server.listen, "0.0.0.0:8000");
        assert_eq!(config.session.ttl_secs, 3600);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/reports.json");
        let expanded = expand_path(&path).unwrap();

        let home = dirs::home_dir().unwrap();
        assert_eq!(expanded, home.join("reports.json"));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let path = PathBuf::from("/srv/aftercare/reports.json");
        let expanded = expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = Config::default();
        let toml_string = toml::to_string(&config).unwrap();

        let deserialized: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(config.core.log_level, deserialized.core.log_level);
        assert_eq!(config.llm.gemini.model, deserialized.llm.gemini.model);
        assert_eq!(config.server.listen, deserialized.server.listen);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = Config::default();
        config.core.log_level = "verbose".to_string();

        assert!(config.validate_and_process().is_err());
    }

    #[test]
    fn test_invalid_listen_addr_rejected() {
        let mut config = Config::default();
        config.server.listen = "not-an-address".to_string();

        assert!(config.validate_and_process().is_err());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = Config::default();
        config.session.ttl_secs = 0;

        assert!(config.validate_and_process().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [core]
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.core.log_level, "debug");
        assert_eq!(config.llm.gemini.model, "gemini-1.5-flash");
        assert_eq!(config.session.ttl_secs, 3600);
    }
}
