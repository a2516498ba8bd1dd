//! Client-side view of the project catalog.

use devdeck_core::ProjectBackend;
use devdeck_core::error::{DeckError, Result};
use devdeck_core::gateway::invoke;
use devdeck_core::project::{ProjectCatalog, ProjectId, RemoteProjectDraft};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Snapshot {
    /// Bumped on every invalidation
    generation: u64,
    catalog: Option<ProjectCatalog>,
}

/// Last-known catalog, refreshed only from confirmed backend responses.
///
/// Mutations are proposed to the backend and, once confirmed, invalidate the
/// snapshot so the next read re-fetches. The cache never patches itself: the
/// backend decides what exists (duplicates, unreachable hosts, ...).
pub struct CatalogCache {
    backend: Arc<dyn ProjectBackend>,
    snapshot: Arc<RwLock<Snapshot>>,
}

impl CatalogCache {
    /// Creates an empty cache over the given backend.
    pub fn new(backend: Arc<dyn ProjectBackend>) -> Self {
        Self {
            backend,
            snapshot: Arc::new(RwLock::new(Snapshot::default())),
        }
    }

    /// Returns the catalog, fetching it if no snapshot is held.
    pub async fn list_all(&self) -> Result<ProjectCatalog> {
        if let Some(catalog) = self.snapshot().await {
            return Ok(catalog);
        }
        self.refresh().await
    }

    /// Fetches the full catalog and stores it as the new snapshot.
    ///
    /// If the snapshot is invalidated while the fetch is in flight, the
    /// result is still returned but not cached: it may predate the mutation.
    pub async fn refresh(&self) -> Result<ProjectCatalog> {
        let generation = self.snapshot.read().await.generation;

        let catalog = invoke(|| self.backend.list_all_projects()).await?;

        let mut snapshot = self.snapshot.write().await;
        if snapshot.generation == generation {
            snapshot.catalog = Some(catalog.clone());
        } else {
            tracing::debug!("[CatalogCache] Discarding fetch that raced an invalidation");
        }

        tracing::debug!(
            "[CatalogCache] Catalog refreshed: {} local, {} remote",
            catalog.local_projects().len(),
            catalog.remote_projects().len()
        );

        Ok(catalog)
    }

    /// Returns the cached snapshot without contacting the backend.
    pub async fn snapshot(&self) -> Option<ProjectCatalog> {
        self.snapshot.read().await.catalog.clone()
    }

    /// Discards the snapshot so the next read re-fetches.
    pub async fn invalidate(&self) {
        let mut snapshot = self.snapshot.write().await;
        snapshot.generation += 1;
        snapshot.catalog = None;
    }

    /// Registers a local project.
    ///
    /// # Errors
    ///
    /// - `DeckError::Validation` if `path` is blank
    /// - `DeckError::Backend` if the backend rejects the project
    pub async fn add_local(&self, path: impl Into<String>) -> Result<ProjectId> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(DeckError::validation("path must not be empty"));
        }

        let id = invoke(|| self.backend.add_local_project(path.clone())).await?;
        self.invalidate().await;

        tracing::info!("[CatalogCache] Added local project {} at {}", id, path);
        Ok(id)
    }

    /// Registers a remote project.
    ///
    /// The four fields are forwarded to the backend in this order. On
    /// rejection the snapshot is left untouched.
    ///
    /// # Errors
    ///
    /// - `DeckError::Validation` if host, user or password is empty
    /// - `DeckError::Backend` if the backend rejects the project
    pub async fn add_remote(
        &self,
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<ProjectId> {
        let draft = RemoteProjectDraft::new(host, port, user, password);
        draft.validate()?;
        let address = draft.record().address();

        let id = invoke(|| self.backend.add_remote_project(draft)).await?;
        self.invalidate().await;

        tracing::info!("[CatalogCache] Added remote project {} ({})", id, address);
        Ok(id)
    }

    /// Removes a remote project. Unknown ids fail in the backend.
    pub async fn remove_remote(&self, id: &ProjectId) -> Result<()> {
        invoke(|| self.backend.remove_remote_project(id.clone())).await?;
        self.invalidate().await;

        tracing::info!("[CatalogCache] Removed remote project {}", id);
        Ok(())
    }

    /// Removes a local project. Unknown ids fail in the backend.
    pub async fn remove_local(&self, id: &ProjectId) -> Result<()> {
        invoke(|| self.backend.remove_local_project(id.clone())).await?;
        self.invalidate().await;

        tracing::info!("[CatalogCache] Removed local project {}", id);
        Ok(())
    }

    /// Checks whether `id` names a known remote project.
    pub async fn contains_remote(&self, id: &ProjectId) -> Result<bool> {
        Ok(self.list_all().await?.remote(id).is_some())
    }
}
