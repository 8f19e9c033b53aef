//! Application configuration loaded from a TOML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::fs::collect::CollectOptions;
use crate::naming::NormalizationForm;

/// Top-level application configuration.
///
/// All fields have sensible defaults so nfconv works without a config file.
/// Call [`Config::load`] to read from a TOML path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub convert: ConvertConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::from_io(path, e))?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }

    /// Collector options derived from `[convert]`.
    pub fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            include_hidden: self.convert.include_hidden,
        }
    }
}

/// Conversion defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    #[serde(default)]
    pub form: NormalizationForm,
    #[serde(default = "default_true")]
    pub include_hidden: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            form: NormalizationForm::default(),
            include_hidden: true,
        }
    }
}

/// Logging preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}
