//! Configuration file support.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable naming the notes directory.
pub const DIR_ENV: &str = "QUIRE_DIR";

/// Application configuration loaded from config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Default notes directory
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default config file location.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", config_path.display()))
    }

    /// Returns the path to the config file.
    ///
    /// Default: `~/.config/quire/config.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quire")
            .join("config.toml")
    }

    /// Resolve the notes directory.
    ///
    /// Precedence order:
    /// 1. CLI `--dir` argument
    /// 2. `QUIRE_DIR` environment variable
    /// 3. Config file `dir` setting
    /// 4. Current working directory
    pub fn notes_dir(&self, cli_dir: Option<&PathBuf>) -> PathBuf {
        let env_dir = std::env::var_os(DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        self.resolve_dir(cli_dir, env_dir)
    }

    fn resolve_dir(&self, cli_dir: Option<&PathBuf>, env_dir: Option<PathBuf>) -> PathBuf {
        cli_dir
            .cloned()
            .or(env_dir)
            .or_else(|| self.dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
