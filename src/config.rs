//! Optional JSON configuration for the `compare` command

use crate::error::{Result, TabregressError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MEMORY_LIMIT: &str = "4GB";

/// Settings read from `--config`; command-line flags take precedence
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    pub primary_key: Vec<String>,
    pub format: Option<String>,
    pub output: Option<PathBuf>,
    pub fail_on_regression: bool,
    pub memory_limit: Option<String>,
}

impl CompareConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TabregressError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            TabregressError::config(format!("Invalid config file '{}': {}", path.display(), e))
        })?;

        config.loader_settings().validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn loader_settings(&self) -> LoaderSettings {
        LoaderSettings {
            memory_limit: self
                .memory_limit
                .clone()
                .unwrap_or_else(|| DEFAULT_MEMORY_LIMIT.to_string()),
        }
    }
}

/// Connection settings applied to the DuckDB loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderSettings {
    pub memory_limit: String,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            memory_limit: DEFAULT_MEMORY_LIMIT.to_string(),
        }
    }
}

impl LoaderSettings {
    /// Accepts a number followed by a unit, e.g. `512MB` or `4 GB`
    pub fn validate(&self) -> Result<()> {
        let limit = self.memory_limit.trim();
        let split = limit
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(limit.len());
        let (amount, unit) = limit.split_at(split);

        let amount_ok = amount.parse::<f64>().map(|a| a > 0.0).unwrap_or(false);
        let unit_ok = matches!(
            unit.trim().to_uppercase().as_str(),
            "B" | "KB" | "MB" | "GB" | "TB" | "KIB" | "MIB" | "GIB" | "TIB"
        );

        if amount_ok && unit_ok {
            Ok(())
        } else {
            Err(TabregressError::config(format!(
                "Invalid memory_limit '{}': expected a size such as '512MB' or '4GB'",
                self.memory_limit
            )))
        }
    }
}
