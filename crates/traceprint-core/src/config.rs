//! Configuration management for Traceprint.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main engine configuration.
///
/// This is loaded from `~/.config/traceprint/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Provider dispatch settings
    pub dispatch: DispatchConfig,
    /// Outbound HTTP settings
    pub http: HttpConfig,
}

impl EngineConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `TRACEPRINT_MAX_CONCURRENT`: Override dispatch concurrency
    /// - `TRACEPRINT_PROVIDER_TIMEOUT_SECS`: Override per-provider timeout
    /// - `TRACEPRINT_SESSION_TIMEOUT_SECS`: Override whole-session timeout
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        // Override from environment
        if let Ok(val) = std::env::var("TRACEPRINT_MAX_CONCURRENT") {
            if let Ok(max) = val.parse() {
                config.dispatch.max_concurrent_providers = max;
                tracing::debug!("Override max_concurrent_providers from env: {}", max);
            }
        }

        if let Ok(val) = std::env::var("TRACEPRINT_PROVIDER_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.dispatch.provider_timeout_secs = secs;
                tracing::debug!("Override provider_timeout_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("TRACEPRINT_SESSION_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.dispatch.session_timeout_secs = secs;
                tracing::debug!("Override session_timeout_secs from env: {}", secs);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/traceprint/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("io", "traceprint", "traceprint")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/traceprint`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("io", "traceprint", "traceprint")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.dispatch.max_concurrent_providers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dispatch.max_concurrent_providers".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.dispatch.provider_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dispatch.provider_timeout_secs".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.dispatch.session_timeout_secs < self.dispatch.provider_timeout_secs {
            return Err(ConfigError::InvalidValue {
                field: "dispatch.session_timeout_secs".to_string(),
                reason: "must be at least the per-provider timeout".to_string(),
            });
        }
        Ok(())
    }
}

/// Provider dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Number of providers invoked concurrently per session
    pub max_concurrent_providers: u32,
    /// Per-provider invocation timeout in seconds (applies to each attempt)
    pub provider_timeout_secs: u64,
    /// Whole-session timeout in seconds
    pub session_timeout_secs: u64,
    /// Backoff before the single retry of a transient failure, in milliseconds
    pub retry_backoff_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_providers: 5,
            provider_timeout_secs: 20,
            session_timeout_secs: 120,
            retry_backoff_ms: 2000,
        }
    }
}

/// Outbound HTTP settings for REST provider adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User agent string
    pub user_agent: String,
    /// Request timeout in seconds (transport-level, below the dispatch timeout)
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Traceprint/0.1.0 (+https://github.com/traceprint/traceprint)".to_string(),
            request_timeout_secs: 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.dispatch.max_concurrent_providers, 5);
        assert_eq!(config.dispatch.provider_timeout_secs, 20);
        assert_eq!(config.dispatch.session_timeout_secs, 120);
        assert_eq!(config.http.request_timeout_secs, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = EngineConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[dispatch]"));
        assert!(toml_str.contains("[http]"));

        let parsed: EngineConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(
            parsed.dispatch.max_concurrent_providers,
            config.dispatch.max_concurrent_providers
        );
    }

    #[test]
    fn test_config_save_load_roundtrip() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = EngineConfig::default();
        config.dispatch.max_concurrent_providers = 8;
        config.http.user_agent = "test-agent".to_string();

        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded_contents = fs::read_to_string(&config_path).expect("read config file");
        let loaded: EngineConfig = toml::from_str(&loaded_contents).expect("parse loaded config");

        assert_eq!(loaded.dispatch.max_concurrent_providers, 8);
        assert_eq!(loaded.http.user_agent, "test-agent");
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r"
[dispatch]
max_concurrent_providers = 3
";
        let config: EngineConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.dispatch.max_concurrent_providers, 3);
        // These should be defaults
        assert_eq!(config.dispatch.provider_timeout_secs, 20);
        assert_eq!(config.http.request_timeout_secs, 15);
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        config.dispatch.max_concurrent_providers = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.dispatch.session_timeout_secs = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("TRACEPRINT_MAX_CONCURRENT", "9");

        // Can't test load_with_env directly since it tries to read config file,
        // but we can test the logic
        let mut config = EngineConfig::default();
        if let Ok(val) = std::env::var("TRACEPRINT_MAX_CONCURRENT") {
            if let Ok(max) = val.parse() {
                config.dispatch.max_concurrent_providers = max;
            }
        }
        assert_eq!(config.dispatch.max_concurrent_providers, 9);

        std::env::remove_var("TRACEPRINT_MAX_CONCURRENT");
    }
}
