//! Optional configuration file (config.toml).
//!
//! Everything has a sensible default; the file only needs to exist when
//! the defaults are not wanted.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Work-log rows shown by `work list` unless configured otherwise.
pub const DEFAULT_WORK_LOG_PAGE: usize = 50;
/// Ledger rows shown by `ledger list` unless configured otherwise.
pub const DEFAULT_LEDGER_PAGE: usize = 100;

/// Configuration loaded from config.toml
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub salon: SalonConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Salon identity shown in report headers
#[derive(Debug, Deserialize)]
pub struct SalonConfig {
    /// Display name for report headers
    pub name: String,
    /// Currency symbol prefixed to amounts
    pub currency: String,
}

impl Default for SalonConfig {
    fn default() -> Self {
        SalonConfig {
            name: "Salon Manager".to_string(),
            currency: "$".to_string(),
        }
    }
}

/// Page sizes for the listing commands
#[derive(Debug, Deserialize)]
pub struct DisplayConfig {
    pub work_log_page: usize,
    pub ledger_page: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            work_log_page: DEFAULT_WORK_LOG_PAGE,
            ledger_page: DEFAULT_LEDGER_PAGE,
        }
    }
}

impl FileConfig {
    /// Load configuration from a TOML file, or defaults when it is absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(FileConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}
