//! CLI configuration.
//!
//! Loaded from a TOML file when one is found, then overridden from
//! `AMORT_*` environment variables.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use loan_amortization_core::amortization::view::DEFAULT_ROWS_PER_PAGE;
use loan_amortization_core::export::{validate_date_format, DEFAULT_EXPORT_DATE_FORMAT};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "amort.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Rows per page for schedule tables
    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: usize,

    /// chrono format string for dates in tables and CSV exports
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_rows_per_page() -> usize {
    DEFAULT_ROWS_PER_PAGE
}

fn default_date_format() -> String {
    DEFAULT_EXPORT_DATE_FORMAT.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            rows_per_page: default_rows_per_page(),
            date_format: default_date_format(),
            log_level: default_log_level(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Resolve the config source: an explicit path, then `$AMORT_CONFIG`,
    /// then `amort.toml` in the working directory, then built-in defaults.
    /// An explicitly named file must exist.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("AMORT_CONFIG").map(PathBuf::from))
        {
            Some(path) => Self::load(&path)?,
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                if local.is_file() {
                    Self::load(&local)?
                } else {
                    Self::default()
                }
            }
        };
        let config = config.with_env_override()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(rows) = lookup("AMORT_ROWS_PER_PAGE") {
            self.rows_per_page = rows.trim().parse().map_err(|_| {
                ConfigError::Parse(format!("AMORT_ROWS_PER_PAGE must be a positive integer, got '{rows}'"))
            })?;
        }
        if let Some(date_format) = lookup("AMORT_DATE_FORMAT") {
            self.date_format = date_format;
        }
        if let Some(log_level) = lookup("AMORT_LOG_LEVEL") {
            self.log_level = log_level;
        }
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.rows_per_page == 0 {
            errors.push("rows_per_page must be greater than 0".to_string());
        }

        if self.date_format.trim().is_empty() {
            errors.push("date_format cannot be empty".to_string());
        } else if validate_date_format(&self.date_format).is_err() {
            errors.push(format!(
                "Invalid date_format '{}': not a valid chrono format string",
                self.date_format
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_log_levels.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!(
                "Invalid log_level '{}'. Valid values: {:?}",
                self.log_level, valid_log_levels
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Configuration error type
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Config IO error: {0}")]
    Io(String),
    #[error("Config parse error: {0}")]
    Parse(String),
    #[error("Config validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
