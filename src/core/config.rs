//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

/// Grouping-review trigger threshold used when no override is configured.
pub const DEFAULT_GROUPING_THRESHOLD: f64 = 0.05;

/// Number of rows shown in the import preview table.
pub const DEFAULT_PREVIEW_ROWS: usize = 15;

/// Stocktake configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the inventory backend API
    pub api_url: Option<String>,

    /// Bearer token for the backend API
    pub api_token: Option<String>,

    /// Duplicate-rate threshold above which the grouping review is entered
    pub grouping_threshold: Option<f64>,

    /// Rows shown in the preview table
    pub preview_rows: Option<usize>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/stocktake/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&global_path) {
                    if let Ok(global) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(global);
                    }
                }
            }
        }

        // 3. Environment variables
        if let Ok(url) = std::env::var("STOCKTAKE_API_URL") {
            config.api_url = Some(url);
        }
        if let Ok(token) = std::env::var("STOCKTAKE_API_TOKEN") {
            config.api_token = Some(token);
        }
        if let Ok(threshold) = std::env::var("STOCKTAKE_GROUPING_THRESHOLD") {
            if let Ok(value) = threshold.parse() {
                config.grouping_threshold = Some(value);
            }
        }
        if let Ok(rows) = std::env::var("STOCKTAKE_PREVIEW_ROWS") {
            if let Ok(value) = rows.parse() {
                config.preview_rows = Some(value);
            }
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "stocktake")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        if other.api_token.is_some() {
            self.api_token = other.api_token;
        }
        if other.grouping_threshold.is_some() {
            self.grouping_threshold = other.grouping_threshold;
        }
        if other.preview_rows.is_some() {
            self.preview_rows = other.preview_rows;
        }
    }

    pub fn api_url(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| "http://localhost:8000/api".to_string())
    }

    pub fn grouping_threshold(&self) -> f64 {
        self.grouping_threshold.unwrap_or(DEFAULT_GROUPING_THRESHOLD)
    }

    pub fn preview_rows(&self) -> usize {
        self.preview_rows.unwrap_or(DEFAULT_PREVIEW_ROWS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::default();
        assert_eq!(config.grouping_threshold(), DEFAULT_GROUPING_THRESHOLD);
        assert_eq!(config.preview_rows(), DEFAULT_PREVIEW_ROWS);
        assert!(config.api_url().starts_with("http"));
    }

    #[test]
    fn merge_prefers_other() {
        let mut base = Config {
            api_url: Some("http://a".into()),
            grouping_threshold: Some(0.1),
            ..Config::default()
        };
        base.merge(Config {
            api_url: Some("http://b".into()),
            ..Config::default()
        });
        assert_eq!(base.api_url(), "http://b");
        assert_eq!(base.grouping_threshold(), 0.1);
    }
}
