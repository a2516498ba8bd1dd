//! Unified path management for devdeck files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/devdeck/           # Config directory (or $DEVDECK_CONFIG_DIR)
//! ├── config.toml              # Application configuration
//! └── projects.json            # Project store (holds credentials, mode 600)
//! ```

use std::path::PathBuf;

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "DEVDECK_CONFIG_DIR";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves devdeck's file locations.
#[derive(Debug, Clone)]
pub struct DeckPaths {
    config_dir: PathBuf,
}

impl DeckPaths {
    /// Uses `base` as the config directory when given, otherwise
    /// `$DEVDECK_CONFIG_DIR`, otherwise the platform config directory.
    pub fn new(base: Option<PathBuf>) -> Result<Self, PathError> {
        let config_dir = match base {
            Some(dir) => dir,
            None => match std::env::var_os(CONFIG_DIR_ENV) {
                Some(dir) if !dir.is_empty() => PathBuf::from(dir),
                _ => dirs::config_dir()
                    .ok_or(PathError::ConfigDirNotFound)?
                    .join("devdeck"),
            },
        };
        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    /// Path to config.toml
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Default path to the project store
    pub fn store_file(&self) -> PathBuf {
        self.config_dir.join("projects.json")
    }
}
