//! Composition root: resolves paths, loads configuration, installs logging
//! and wires the backend into one coordinator.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use devdeck_application::ProjectCoordinator;
use devdeck_core::ProjectBackend;
use devdeck_infrastructure::{
    ConfigService, DeckConfig, DeckPaths, JsonProjectStore, LocalBackend, TcpConnector,
};
use tracing_subscriber::EnvFilter;

pub struct AppBootstrap {
    pub paths: DeckPaths,
    pub config: DeckConfig,
}

impl AppBootstrap {
    /// Loads configuration and installs the tracing subscriber.
    ///
    /// An unreadable config file is not fatal: defaults are used and a
    /// warning is logged.
    pub fn init(config_dir: Option<PathBuf>) -> Result<Self> {
        let paths = DeckPaths::new(config_dir)
            .map_err(|e| anyhow!("Failed to resolve config directory: {}", e))?;

        let loaded = ConfigService::new(&paths).get_config();
        let log_level = loaded
            .as_ref()
            .map(|c| c.log_level.clone())
            .unwrap_or_else(|_| DeckConfig::default().log_level);
        init_tracing(&log_level);

        let config = match loaded {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("[Bootstrap] Using default configuration: {}", e);
                DeckConfig::default()
            }
        };

        Ok(Self { paths, config })
    }

    /// Builds the process-wide coordinator over the local backend.
    pub fn coordinator(&self) -> Arc<ProjectCoordinator> {
        let store_path = self.config.store_path(&self.paths);
        tracing::info!("[Bootstrap] Using project store {:?}", store_path);

        let connector = Arc::new(TcpConnector::new(self.config.connect_timeout()));
        let backend: Arc<dyn ProjectBackend> =
            Arc::new(LocalBackend::new(JsonProjectStore::new(store_path), connector));

        Arc::new(ProjectCoordinator::new(backend))
    }
}

/// `RUST_LOG` wins over the configured level. Output goes to stderr so it
/// never mixes with command output.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second install (tests) is ignored.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
