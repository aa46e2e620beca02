//! Runtime configuration: CLI defaults optionally overridden by a TOML
//! config file.

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT_DIR: &str = "export";
pub const DEFAULT_OUTPUT_PATH: &str = "public/stats.json";
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Optional on-disk configuration. Every field falls back to the CLI
/// value or the built-in default.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub input_dir: Option<String>,
    pub output_path: Option<String>,
    /// IANA zone name for the report's civil time zone.
    pub timezone: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    pub timezone: Tz,
}

impl Config {
    pub fn resolve(
        cli_input_dir: Option<PathBuf>,
        cli_output_path: Option<PathBuf>,
        file: FileConfig,
    ) -> Result<Self> {
        let input_dir = cli_input_dir
            .or(file.input_dir.map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR));
        let output_path = cli_output_path
            .or(file.output_path.map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));
        let zone_name = file.timezone.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone: Tz = zone_name
            .parse()
            .ok()
            .with_context(|| format!("Unknown time zone: {}", zone_name))?;
        Ok(Self {
            input_dir,
            output_path,
            timezone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::resolve(None, None, FileConfig::default()).unwrap();
        assert_eq!(config.input_dir, PathBuf::from(DEFAULT_INPUT_DIR));
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert_eq!(config.timezone, chrono_tz::America::New_York);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig {
            input_dir: Some("from-file".to_string()),
            output_path: None,
            timezone: Some("Europe/Rome".to_string()),
        };
        let config =
            Config::resolve(Some(PathBuf::from("from-cli")), None, file).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("from-cli"));
        assert_eq!(config.timezone, chrono_tz::Europe::Rome);
    }

    #[test]
    fn test_unknown_zone_is_an_error() {
        let file = FileConfig {
            timezone: Some("Mars/Olympus_Mons".to_string()),
            ..Default::default()
        };
        assert!(Config::resolve(None, None, file).is_err());
    }

    #[test]
    fn test_file_config_parses_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listening-stats.toml");
        std::fs::write(&path, "input_dir = \"data\"\ntimezone = \"UTC\"\n").unwrap();
        let file = FileConfig::load(&path).unwrap();
        assert_eq!(file.input_dir.as_deref(), Some("data"));
        let config = Config::resolve(None, None, file).unwrap();
        assert_eq!(config.timezone, chrono_tz::UTC);
    }
}
