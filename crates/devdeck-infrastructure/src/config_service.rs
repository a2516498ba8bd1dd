//! Configuration service implementation.
//!
//! Loads `config.toml` from the devdeck config directory, writing the
//! defaults back when the file does not exist yet.

use crate::paths::DeckPaths;
use devdeck_core::error::{DeckError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Overrides the location of projects.json
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_file: Option<PathBuf>,
    /// Upper bound for a single connect attempt
    pub connect_timeout_secs: u64,
    /// Default tracing filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            store_file: None,
            connect_timeout_secs: 10,
            log_level: "info".to_string(),
        }
    }
}

impl DeckConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    /// Store location, falling back to the default under `paths`.
    pub fn store_path(&self, paths: &DeckPaths) -> PathBuf {
        self.store_file
            .clone()
            .unwrap_or_else(|| paths.store_file())
    }
}

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<DeckConfig>>>,
}

impl ConfigService {
    pub fn new(paths: &DeckPaths) -> Self {
        Self::with_path(paths.config_file())
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the root configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<DeckConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|e| DeckError::internal(format!("config lock poisoned: {}", e)))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = Self::load_config(&self.path)?;

        let mut write_lock = self
            .config
            .write()
            .map_err(|e| DeckError::internal(format!("config lock poisoned: {}", e)))?;
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load_config(path: &Path) -> Result<DeckConfig> {
        if !path.exists() {
            let config = DeckConfig::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, toml::to_string_pretty(&config)?)?;
            tracing::info!("[ConfigService] Wrote default config to {:?}", path);
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: DeckConfig = toml::from_str(&content)
            .map_err(|e| DeckError::config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_writes_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let service = ConfigService::with_path(path.clone());

        let config = service.get_config().unwrap();

        assert_eq!(config, DeckConfig::default());
        assert!(path.exists());
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("connect_timeout_secs = 10"));
    }

    #[test]
    fn test_partial_file_uses_defaults_for_missing_keys() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "connect_timeout_secs = 3\n").unwrap();

        let config = ConfigService::with_path(path).get_config().unwrap();

        assert_eq!(config.connect_timeout(), Duration::from_secs(3));
        assert_eq!(config.log_level, "info");
        assert!(config.store_file.is_none());
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "connect_timeout_secs = \"soon\"\n").unwrap();

        let err = ConfigService::with_path(path).get_config().unwrap_err();
        assert!(matches!(err, DeckError::Config(_)));
    }

    #[test]
    fn test_invalidate_cache_reloads() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::with_path(path.clone());
        service.get_config().unwrap();

        std::fs::write(&path, "log_level = \"debug\"\n").unwrap();
        assert_eq!(service.get_config().unwrap().log_level, "info");

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().log_level, "debug");
    }

    #[test]
    fn test_store_path_override() {
        let paths = DeckPaths::new(Some(PathBuf::from("/cfg"))).unwrap();
        let mut config = DeckConfig::default();
        assert_eq!(config.store_path(&paths), PathBuf::from("/cfg/projects.json"));

        config.store_file = Some(PathBuf::from("/data/p.json"));
        assert_eq!(config.store_path(&paths), PathBuf::from("/data/p.json"));
    }
}
