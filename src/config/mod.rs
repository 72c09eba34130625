use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{
    core::utils::{ensure_dir, write_atomic, PathResolver},
    errors::{LedgerError, Result},
};

const DEFAULT_RETENTION: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub currency_code: String,
    pub currency_symbol: String,
    pub locale: String,
    /// Namespace for the persisted document file names.
    pub document_prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_root: Option<PathBuf>,
    pub backup_retention: usize,
    pub date_display: DateDisplay,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_code: "INR".into(),
            currency_symbol: "₹".into(),
            locale: "en-IN".into(),
            document_prefix: "gharrent".into(),
            data_root: None,
            backup_retention: DEFAULT_RETENTION,
            date_display: DateDisplay::Dmy,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.currency_code.trim().is_empty() {
            return Err(LedgerError::Config("currency_code cannot be empty".into()));
        }
        if self.document_prefix.trim().is_empty() {
            return Err(LedgerError::Config("document_prefix cannot be empty".into()));
        }
        if self.backup_retention == 0 {
            return Err(LedgerError::Config(
                "backup_retention must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Directory holding the ledger documents: `data_root` when set, else
    /// `data/` below the base directory.
    pub fn data_dir(&self, base: &Path) -> PathBuf {
        self.data_root
            .clone()
            .unwrap_or_else(|| PathResolver::data_dir_in(base))
    }
}

/// How dates are rendered in listings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DateDisplay {
    /// `DD/MM/YYYY`
    #[default]
    Dmy,
    /// `YYYY-MM-DD`
    Iso,
}

impl fmt::Display for DateDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DateDisplay::Dmy => "dmy",
            DateDisplay::Iso => "iso",
        })
    }
}

impl FromStr for DateDisplay {
    type Err = LedgerError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dmy" => Ok(DateDisplay::Dmy),
            "iso" => Ok(DateDisplay::Iso),
            other => Err(LedgerError::Config(format!(
                "unknown date display `{}` (expected dmy or iso)",
                other
            ))),
        }
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            base,
        })
    }

    /// Returns the stored configuration, or the defaults when none was saved.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
