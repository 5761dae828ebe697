use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

pub const CONFIG_ENV: &str = "CAMPUS_ENERGY_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "campus-energy.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct IngestConfig {
    /// File extensions picked up from the data directory, without the dot.
    pub extensions: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["csv".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub width: u32,
    pub height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 1000,
            height: 1200,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MetricsConfig {
    /// Written inside the output directory.
    pub snapshot_file: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    /// Reads the file named by `CAMPUS_ENERGY_CONFIG`, else `campus-energy.toml`
    /// when present, else built-in defaults.
    pub fn load() -> anyhow::Result<Self> {
        match env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))
            }
            Err(_) => {
                tracing::info!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_means_defaults() {
        let cfg = AppConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.paths.data_dir, PathBuf::from("data"));
        assert_eq!(cfg.ingest.extensions, vec!["csv".to_string()]);
        assert!(cfg.metrics.is_none());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [paths]
            data_dir = "/srv/meters"

            [ingest]
            extensions = ["csv", "dat"]

            [dashboard]
            enabled = false

            [metrics]
            snapshot_file = "metrics.prom"
            "#,
        )
        .expect("config parses");

        assert_eq!(cfg.paths.data_dir, PathBuf::from("/srv/meters"));
        assert_eq!(cfg.paths.output_dir, PathBuf::from("output"));
        assert_eq!(cfg.ingest.extensions.len(), 2);
        assert!(!cfg.dashboard.enabled);
        assert_eq!(cfg.dashboard.width, 1000);
        assert_eq!(
            cfg.metrics.map(|m| m.snapshot_file),
            Some(PathBuf::from("metrics.prom"))
        );
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(AppConfig::from_toml_str("[dashboard]\nwidth = \"wide\"").is_err());
    }
}
