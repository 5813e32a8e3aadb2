//! Configuration handling for wattlog
//!
//! A small TOML file under the user's config directory
//! (`~/.config/wattlog/config.toml` on Linux) selects where the database
//! lives. The `--db` flag and the `WATTLOG_DB` environment variable
//! override it; without either, the database sits in the user's data
//! directory.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// User configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the sqlite database
    pub db_path: Option<PathBuf>,
}

impl Config {
    /// Loads the config file, falling back to defaults when it is missing
    pub fn load() -> Result<Self> {
        let Some(path) = Self::config_file() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Resolves the database location: explicit override first, then the
    /// config file, then the platform data directory.
    pub fn resolve_db_path(&self, override_path: Option<PathBuf>) -> PathBuf {
        if let Some(path) = override_path {
            return path;
        }
        if let Some(path) = &self.db_path {
            return path.clone();
        }

        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join("wattlog.db"))
            .unwrap_or_else(|| PathBuf::from("wattlog.db"))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "wattlog")
    }

    fn config_file() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
