//! Runtime configuration.
//!
//! Values come from the built-in defaults, then an optional
//! `credit-ledger.yaml` file, then `CREDIT_LEDGER_*` environment variables.

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "credit-ledger.yaml";

pub const ENV_CONFIG_FILE: &str = "CREDIT_LEDGER_CONFIG";
pub const ENV_STORE_PATH: &str = "CREDIT_LEDGER_DB";
pub const ENV_BIND_ADDRESS: &str = "CREDIT_LEDGER_ADDR";
pub const ENV_ADMIN_PASSWORD: &str = "CREDIT_LEDGER_ADMIN_PASSWORD";
pub const ENV_BACKUP_DIR: &str = "CREDIT_LEDGER_BACKUP_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON store file
    pub store_path: PathBuf,
    pub bind_address: String,
    /// Password given to the administrator seeded into a fresh store
    pub admin_password: String,
    pub backup_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("data/ledger.json"),
            bind_address: "127.0.0.1:3000".to_string(),
            admin_password: "admin123".to_string(),
            backup_dir: PathBuf::from("backups"),
        }
    }
}

impl Config {
    /// Load configuration from the process environment and the config file
    /// it points to (or `credit-ledger.yaml` when present).
    pub fn load() -> Result<Self> {
        let lookup = |key: &str| std::env::var(key).ok();
        let file = lookup(ENV_CONFIG_FILE)
            .map(PathBuf::from)
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            });

        let mut config = match file {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(lookup);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `CREDIT_LEDGER_*` overrides from `lookup`; empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get(ENV_STORE_PATH) {
            self.store_path = PathBuf::from(value);
        }
        if let Some(value) = get(ENV_BIND_ADDRESS) {
            self.bind_address = value;
        }
        if let Some(value) = get(ENV_ADMIN_PASSWORD) {
            self.admin_password = value;
        }
        if let Some(value) = get(ENV_BACKUP_DIR) {
            self.backup_dir = PathBuf::from(value);
        }
    }
}
