//! Dashboard configuration.
//!
//! Loaded from a JSON file; every field is optional and falls back to the
//! defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::data::loader::DataSource;

/// Years offered by the map dropdown.
pub const YEARS: &[&str] = &["2020"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the three time series are loaded from at startup.
    pub data_source: DataSource,
    /// Rows per table page.
    pub page_size: usize,
    /// Region whose time series is shown before anything is hovered.
    pub default_region: String,
    /// Initially selected year.
    pub year: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_source: DataSource::default(),
            page_size: 7,
            default_region: "US".to_string(),
            year: YEARS[0].to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing file yields the default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            log::info!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        Ok(config)
    }

    /// `$XDG_CONFIG_HOME/covid-dash/config.json` or the platform equivalent.
    pub fn default_config_path() -> Result<PathBuf> {
        let dir =
            config_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine config directory"))?;
        Ok(dir.join("covid-dash").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.page_size, 7);
        assert_eq!(config.default_region, "US");
        assert_eq!(config.year, "2020");
        assert!(matches!(config.data_source, DataSource::Remote { .. }));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Config::load(Some(&temp_dir.path().join("nope.json"))).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "page_size": 12,
                "data_source": { "kind": "local", "dir": "/srv/covid" }
            }"#,
        )
        .unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.page_size, 12);
        assert_eq!(loaded.default_region, "US");
        assert_eq!(
            loaded.data_source,
            DataSource::Local {
                dir: PathBuf::from("/srv/covid")
            }
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
