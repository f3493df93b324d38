//! Configuration for the OS-specific lookup
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - System configuration (/etc/rustible/os_specific.toml)
//! - User configuration (~/.rustible/os_specific.toml)
//! - Project configuration (./os_specific.toml)
//! - Environment variables
//!
//! Files may be TOML, YAML or JSON, chosen by extension.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::logging::LogFormat;
use crate::plugins::lookup::os_specific::DEFAULT_KEY;
use crate::plugins::lookup::{ErrorBehavior, FactKeys, LookupOptions, OsKeyResolver};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "RUSTIBLE_OS_SPECIFIC_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lookup behavior
    pub lookup: LookupSettings,

    /// Fact names the candidate keys are built from
    pub facts: FactKeys,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Lookup behavior settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupSettings {
    /// Mapping key used when no OS identifier matches
    pub default_key: String,

    /// Reject terms that are neither strings nor mappings
    pub strict: bool,

    /// What to do when the lookup fails
    pub errors: ErrorBehavior,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            default_key: DEFAULT_KEY.to_string(),
            strict: false,
            errors: ErrorBehavior::Strict,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag or RUST_LOG is given
    pub level: String,

    /// Log format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl Config {
    /// Load configuration from all sources
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();
        let explicit = config_path.is_some() || std::env::var_os(CONFIG_ENV).is_some();

        for path in Self::get_config_paths(config_path) {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading configuration");
                config = Self::from_file(&path)?;
            } else if explicit {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
        }

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Get the list of configuration file paths to check, lowest priority first
    fn get_config_paths(explicit_path: Option<&Path>) -> Vec<PathBuf> {
        // Explicit path takes priority
        if let Some(path) = explicit_path {
            return vec![path.to_path_buf()];
        }
        if let Ok(env_config) = std::env::var(CONFIG_ENV) {
            return vec![PathBuf::from(env_config)];
        }

        let mut paths = vec![PathBuf::from("/etc/rustible/os_specific.toml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".rustible/os_specific.toml"));
        }
        paths.push(PathBuf::from("os_specific.toml"));
        paths
    }

    /// Load from a specific file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content).map_err(|e| Error::parse(path, e)),
            "json" => serde_json::from_str(&content).map_err(|e| Error::parse(path, e)),
            _ => toml::from_str(&content).map_err(|e| Error::parse(path, e)),
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // RUSTIBLE_OS_SPECIFIC_DEFAULT_KEY
        if let Ok(key) = std::env::var("RUSTIBLE_OS_SPECIFIC_DEFAULT_KEY") {
            self.lookup.default_key = key;
        }

        // RUSTIBLE_OS_SPECIFIC_STRICT
        if let Ok(strict) = std::env::var("RUSTIBLE_OS_SPECIFIC_STRICT") {
            self.lookup.strict = matches!(
                strict.to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        // RUSTIBLE_OS_SPECIFIC_ERRORS
        if let Ok(errors) = std::env::var("RUSTIBLE_OS_SPECIFIC_ERRORS") {
            self.lookup.errors = errors.parse()?;
        }

        // RUSTIBLE_LOG_LEVEL
        if let Ok(level) = std::env::var("RUSTIBLE_LOG_LEVEL") {
            self.logging.level = level;
        }

        // RUSTIBLE_LOG_FORMAT
        if let Ok(format) = std::env::var("RUSTIBLE_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }

        self.validate()
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.lookup.default_key.is_empty() {
            return Err(Error::Config("lookup.default_key must not be empty".into()));
        }
        Ok(())
    }

    /// Lookup options matching these settings
    pub fn lookup_options(&self) -> LookupOptions {
        LookupOptions::new()
            .with_option("default_key", self.lookup.default_key.clone())
            .with_option("strict", self.lookup.strict)
            .with_errors(self.lookup.errors)
    }

    /// Resolver configured with these fact names and default key
    pub fn resolver(&self) -> OsKeyResolver {
        OsKeyResolver::new()
            .with_fact_keys(self.facts.clone())
            .with_default_key(self.lookup.default_key.clone())
    }
}
