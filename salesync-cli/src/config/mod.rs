//! Configuration management for salesync
//!
//! Settings come from a TOML file (explicit `--config` path, else
//! `<config dir>/salesync/config.toml`), then environment variables
//! (a `.env` file is honoured), then CLI flags applied by the handlers.

pub mod stores;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::api::formatting::{Palette, RgbColor};
use crate::pipeline::PipelineConfig;
use crate::report::{GroupingPolicy, ResolveMode};

pub use stores::{StoreEntry, StoreRegistry};

pub const ENV_SPREADSHEET_ID: &str = "SALESYNC_SPREADSHEET_ID";
pub const ENV_ACCESS_TOKEN: &str = "SALESYNC_ACCESS_TOKEN";
pub const ENV_API_BASE: &str = "SALESYNC_API_BASE";

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub remote: RemoteConfig,
    pub report: ReportConfig,
    pub style: StyleConfig,
    pub concurrency: ConcurrencyConfig,
    pub stores: Vec<StoreEntry>,
}

/// Destination spreadsheet and transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Document id from the spreadsheet URL
    pub spreadsheet_id: String,
    /// Bearer token issued by an external credential helper
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub api_base: String,
    pub timeout_secs: u64,
    /// Cells blanked on the tab before each write
    pub clear_range: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            access_token: None,
            api_base: "https://sheets.googleapis.com/v4".to_string(),
            timeout_secs: 30,
            clear_range: "A1:Z1000".to_string(),
        }
    }
}

/// How rows are resolved, grouped and titled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub mode: ResolveMode,
    pub case_fold_categories: bool,
    /// Prepend a "Processed at ..." title row
    pub banner: bool,
    /// chrono format string for the banner timestamp
    pub timestamp_format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            mode: ResolveMode::Strict,
            case_fold_categories: false,
            banner: true,
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}

/// Report colors as `[red, green, blue]` in `0.0..=1.0`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub header_color: [f32; 3],
    pub first_band_color: [f32; 3],
    pub second_band_color: [f32; 3],
    pub border_color: [f32; 3],
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            header_color: [0.85, 0.9, 0.95],
            first_band_color: [0.94, 0.94, 0.94],
            second_band_color: [1.0, 1.0, 1.0],
            border_color: [0.0, 0.0, 0.0],
        }
    }
}

impl StyleConfig {
    pub fn palette(&self) -> Palette {
        Palette {
            header: RgbColor::from(self.header_color),
            first_band: RgbColor::from(self.first_band_color),
            second_band: RgbColor::from(self.second_band_color),
            border: RgbColor::from(self.border_color),
        }
    }
}

/// Multi-upload scheduling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Run uploads concurrently instead of as an ordered queue
    pub enabled: bool,
    /// Upper bound on uploads in flight when enabled
    pub max_concurrent_uploads: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_concurrent_uploads: 4,
        }
    }
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("salesync").join("config.toml"))
}

impl AppConfig {
    /// Load from `path` (must exist) or the default location (optional),
    /// then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Override remote settings from environment-style lookups
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(id) = non_empty(ENV_SPREADSHEET_ID) {
            self.remote.spreadsheet_id = id;
        }
        if let Some(token) = non_empty(ENV_ACCESS_TOKEN) {
            self.remote.access_token = Some(token);
        }
        if let Some(base) = non_empty(ENV_API_BASE) {
            self.remote.api_base = base;
        }
    }

    /// Registry of configured stores
    pub fn store_registry(&self) -> StoreRegistry {
        StoreRegistry::new(self.stores.clone())
    }

    /// Settings handed to every pipeline run
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            mode: self.report.mode,
            grouping: if self.report.case_fold_categories {
                GroupingPolicy::case_folded()
            } else {
                GroupingPolicy::exact()
            },
            banner: self.report.banner,
            timestamp_format: self.report.timestamp_format.clone(),
            clear_range: self.remote.clear_range.clone(),
            palette: self.style.palette(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
[remote]
spreadsheet_id = "1m-abc"
timeout_secs = 10

[report]
mode = "lenient"
case_fold_categories = true

[style]
header_color = [0.2, 0.4, 0.6]

[concurrency]
enabled = true

[[stores]]
name = "Rockwell"
tab = "Rockwell"

[[stores]]
name = "North Edsa"
tab = "N. Edsa"
"#;

    #[test]
    fn test_parse_sample_config() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();

        assert_eq!(config.remote.spreadsheet_id, "1m-abc");
        assert_eq!(config.remote.timeout_secs, 10);
        assert_eq!(config.remote.clear_range, "A1:Z1000");
        assert_eq!(config.report.mode, ResolveMode::Lenient);
        assert!(config.report.case_fold_categories);
        assert!(config.report.banner);
        assert_eq!(config.style.header_color, [0.2, 0.4, 0.6]);
        assert_eq!(config.style.border_color, [0.0, 0.0, 0.0]);
        assert!(config.concurrency.enabled);
        assert_eq!(config.concurrency.max_concurrent_uploads, 4);
        assert_eq!(config.stores.len(), 2);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.report.mode, ResolveMode::Strict);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = AppConfig::from_toml(SAMPLE).unwrap();
        let env: HashMap<&str, &str> = [
            (ENV_SPREADSHEET_ID, "from-env"),
            (ENV_ACCESS_TOKEN, "ya29.token"),
            (ENV_API_BASE, "  "),
        ]
        .into_iter()
        .collect();

        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.remote.spreadsheet_id, "from-env");
        assert_eq!(config.remote.access_token.as_deref(), Some("ya29.token"));
        assert_eq!(config.remote.api_base, "https://sheets.googleapis.com/v4");
    }

    #[test]
    fn test_pipeline_config_from_app_config() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        let pipeline = config.pipeline_config();

        assert_eq!(pipeline.mode, ResolveMode::Lenient);
        assert!(pipeline.grouping.case_fold);
        assert_eq!(pipeline.palette.header, RgbColor::new(0.2, 0.4, 0.6));
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = AppConfig::from_toml("[report]\nmode = \"loose\"\n");
        assert!(err.is_err());
    }
}
