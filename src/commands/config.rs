use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use sqlparser::dialect::dialect_from_str;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::display::OutputFormat;
use crate::sql_engine::Engine;

/// File looked up in the current directory when no config path is given
pub const DEFAULT_CONFIG_FILE: &str = "feather_catalog.yaml";

/// Project configuration for the catalog engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatherCatalogConfig {
    /// Name of the project
    #[serde(default = "default_name")]
    pub name: String,

    /// SQL dialect used to parse statements (mysql, generic, duckdb, ...)
    #[serde(default = "default_dialect")]
    pub dialect: String,

    /// Database created at startup and selected for the session
    #[serde(default)]
    pub default_database: Option<String>,

    /// Default output format of the run command
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Log filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_name() -> String {
    "feather_catalog".to_string()
}

fn default_dialect() -> String {
    "mysql".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for FeatherCatalogConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            dialect: default_dialect(),
            default_database: None,
            output_format: OutputFormat::default(),
            log_level: default_log_level(),
        }
    }
}

impl FeatherCatalogConfig {
    /// Build a fresh engine with this configuration's dialect and default database
    pub fn build_engine(&self) -> Result<Engine> {
        let dialect = dialect_from_str(&self.dialect)
            .ok_or_else(|| anyhow!("Unknown SQL dialect: {}", self.dialect))?;
        let engine = Engine::with_dialect(dialect);

        match &self.default_database {
            Some(db) => engine
                .with_default_database(db)
                .with_context(|| format!("Failed to create default database {}", db)),
            None => Ok(engine),
        }
    }
}

/// Reads the configuration file from the specified path or looks for
/// feather_catalog.yaml in the current directory. Without an explicit path a
/// missing file yields the defaults.
pub fn read_config(config_path: Option<PathBuf>) -> Result<FeatherCatalogConfig> {
    let (config_path, explicit) = match config_path {
        Some(path) => (path, true),
        None => {
            let current_dir = std::env::current_dir()?;
            (current_dir.join(DEFAULT_CONFIG_FILE), false)
        }
    };

    if !config_path.exists() {
        if explicit {
            return Err(anyhow!(
                "Configuration file not found at: {}",
                config_path.display()
            ));
        }
        debug!(path = %config_path.display(), "no configuration file, using defaults");
        return Ok(FeatherCatalogConfig::default());
    }

    load_config_file(&config_path)
}

fn load_config_file(path: &Path) -> Result<FeatherCatalogConfig> {
    let config_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_yaml::from_str(&config_str)
        .with_context(|| format!("Failed to parse YAML from {}", path.display()))
}
