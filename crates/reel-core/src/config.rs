use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::ReelError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub storage: StorageConfig,
    pub search: SearchConfig,
    pub stats: StatsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub log_to_file: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides the platform data directory location of the database.
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub debounce_ms: u64,
    pub min_query_len: usize,
    pub language: String,
    pub base_url: String,
    pub tmdb_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    pub min_items: usize,
    pub top_tags: usize,
    pub top_rated: usize,
    pub top_completion: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            min_items: crate::stats::MIN_ITEMS_FOR_STATS,
            top_tags: 10,
            top_rated: 5,
            top_completion: 5,
        }
    }
}

impl AppConfig {
    /// Load config: user file (if exists) or built-in defaults.
    pub fn load() -> Result<Self, ReelError> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path, falling back to defaults when missing.
    pub fn load_from(path: &Path) -> Result<Self, ReelError> {
        if !path.exists() {
            return toml::from_str(DEFAULT_CONFIG).map_err(|e| ReelError::Config(e.to_string()));
        }
        let user_str =
            std::fs::read_to_string(path).map_err(|e| ReelError::Config(e.to_string()))?;
        toml::from_str(&user_str).map_err(|e| ReelError::Config(e.to_string()))
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), ReelError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ReelError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ReelError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Directory for the database and log files.
    pub fn data_dir() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Path to the database file, honoring the `[storage] db_path` override.
    pub fn db_path(&self) -> PathBuf {
        self.storage
            .db_path
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("reel.db"))
    }

    /// Ensure the database directory exists and return the DB path.
    pub fn ensure_db_path(&self) -> Result<PathBuf, ReelError> {
        let path = self.db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "reel")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = AppConfig::default();
        assert!(!config.general.log_to_file);
        assert_eq!(config.search.debounce_ms, 500);
        assert_eq!(config.search.min_query_len, 3);
        assert!(config.search.tmdb_token.is_none());
        assert_eq!(config.stats.min_items, 3);
        assert_eq!(config.stats.top_tags, 10);
        assert!(config.storage.db_path.is_none());
    }

    #[test]
    fn test_roundtrip() {
        let config = AppConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.search.debounce_ms, config.search.debounce_ms);
        assert_eq!(deserialized.stats.top_rated, config.stats.top_rated);
    }

    #[test]
    fn test_load_from_file_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let missing = AppConfig::load_from(&path).unwrap();
        assert_eq!(missing.search.debounce_ms, 500);

        let mut config = AppConfig::default();
        config.search.debounce_ms = 250;
        config.storage.db_path = Some(dir.path().join("custom.db"));
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.search.debounce_ms, 250);
        assert_eq!(loaded.db_path(), dir.path().join("custom.db"));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        assert!(matches!(AppConfig::load_from(&path), Err(ReelError::Config(_))));
    }
}
