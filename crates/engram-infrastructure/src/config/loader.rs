//! Configuration loader; YAML-based.
//!
//! Loads [`AppConfig`] from YAML configuration files. Application settings
//! live under the `settings:` key in `config/{env}.yaml`.
//!
//! Environment is resolved from `ENGRAM_ENV` (default: `development`).

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use engram_domain::error::{Error, Result};
use engram_domain::value_objects::CollectionNaming;

use crate::config::AppConfig;

/// Configuration loader service
///
/// Reads YAML config files and extracts the `settings:` section as
/// [`AppConfig`], following the `{env}.local.yaml` override convention.
#[derive(Clone, Default)]
pub struct ConfigLoader {
    /// Optional explicit config file path (overrides environment resolution)
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    #[must_use]
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set an explicit configuration file path (overrides env-based resolution)
    #[must_use]
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration from YAML.
    ///
    /// Resolution order:
    /// 1. Explicit path (via `with_config_path`)
    /// 2. `config/{env}.local.yaml` (highest priority override)
    /// 3. `config/{env}.yaml` (standard config)
    ///
    /// # Errors
    ///
    /// Returns an error if no config file is found, parsing fails, or
    /// validation detects invalid values.
    pub fn load(&self) -> Result<AppConfig> {
        let yaml_path = self.find_yaml_config_path()?;
        tracing::info!(path = %yaml_path.display(), "Configuration loaded");

        let content = std::fs::read_to_string(&yaml_path)
            .map_err(|e| Error::io_with_source("Failed to read YAML config file", e))?;
        Self::parse(&content)
    }

    /// Parse a YAML document with a `settings:` key into [`AppConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error when the document is malformed or validation fails.
    pub fn parse(content: &str) -> Result<AppConfig> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| Error::configuration_with_source("Failed to parse YAML config", e))?;

        let settings = yaml.get("settings").ok_or_else(|| {
            Error::ConfigMissing("No 'settings' key found in YAML configuration file".to_owned())
        })?;

        let config: AppConfig = serde_yaml::from_value(settings.clone()).map_err(|e| {
            Error::configuration_with_source("Failed to deserialize settings into AppConfig", e)
        })?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Reload configuration (re-reads from disk)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading fails.
    pub fn reload(&self) -> Result<AppConfig> {
        self.load()
    }

    fn environment() -> String {
        env::var("ENGRAM_ENV").unwrap_or_else(|_| "development".to_owned())
    }

    fn find_yaml_config_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Ok(path.clone());
            }
            return Err(Error::ConfigMissing(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let environment = Self::environment();
        for candidate in [
            PathBuf::from(format!("config/{environment}.local.yaml")),
            PathBuf::from(format!("config/{environment}.yaml")),
        ] {
            if candidate.exists() {
                return Ok(candidate);
            }
        }
        Err(Error::ConfigMissing(format!(
            "No config file found for environment '{environment}'"
        )))
    }

    fn validate(config: &AppConfig) -> Result<()> {
        if config.server.port == 0 {
            return Err(Error::ConfigInvalid {
                key: "server.port".to_owned(),
                message: "Port must be non-zero".to_owned(),
            });
        }
        if config.retrieval.vector_weight + config.retrieval.graph_weight <= 0.0 {
            return Err(Error::ConfigInvalid {
                key: "retrieval".to_owned(),
                message: "vector_weight + graph_weight must be positive".to_owned(),
            });
        }
        if config.memory.embedding_dimensions == 0 {
            return Err(Error::ConfigInvalid {
                key: "memory.embedding_dimensions".to_owned(),
                message: "Embedding dimensionality must be non-zero".to_owned(),
            });
        }
        // The naming strategy is a cluster-wide invariant; reject unknown
        // values here rather than at first use.
        CollectionNaming::from_str(&config.chat.collection_naming).map_err(|message| {
            Error::ConfigInvalid {
                key: "chat.collection_naming".to_owned(),
                message,
            }
        })?;
        Ok(())
    }
}
