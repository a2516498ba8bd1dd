//! Project coordinator use case.
//!
//! Ties the catalog view and the connection tracker together and owns the
//! navigation gate: the front end only enters a remote project's workspace
//! once the backend confirms a session bound to that project.

use crate::catalog_cache::CatalogCache;
use crate::connection_tracker::ConnectionTracker;
use devdeck_core::ProjectBackend;
use devdeck_core::connection::ConnectionSession;
use devdeck_core::error::{ConnectFailureKind, DeckError, Result};
use devdeck_core::project::{LocalProjectRecord, ProjectId};
use std::sync::Arc;

/// Where the front end may navigate after `open_project`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// A local project; no session is involved.
    Local {
        id: ProjectId,
        project: LocalProjectRecord,
    },
    /// A remote project with a confirmed session.
    Remote {
        session: ConnectionSession,
        /// `false` when an existing session was reused
        connected_now: bool,
    },
}

/// One coordinator per process, created at startup and shared by every
/// front-end consumer.
pub struct ProjectCoordinator {
    catalog: Arc<CatalogCache>,
    tracker: Arc<ConnectionTracker>,
}

impl ProjectCoordinator {
    pub fn new(backend: Arc<dyn ProjectBackend>) -> Self {
        Self {
            catalog: Arc::new(CatalogCache::new(backend.clone())),
            tracker: Arc::new(ConnectionTracker::new(backend)),
        }
    }

    pub fn catalog(&self) -> &Arc<CatalogCache> {
        &self.catalog
    }

    pub fn tracker(&self) -> &Arc<ConnectionTracker> {
        &self.tracker
    }

    /// Resolves navigation into project `id`.
    ///
    /// For a remote project:
    /// 1. If the backend already reports a session bound to `id`, proceed
    ///    without connecting.
    /// 2. Otherwise connect.
    /// 3. Re-read the backend and proceed only if the session is bound to `id`.
    ///
    /// Ids not in the current catalog are still handed to the backend, which
    /// reports stale references as `DeckError::Backend`.
    pub async fn open_project(&self, id: &ProjectId) -> Result<Navigation> {
        let catalog = self.catalog.list_all().await?;
        if let Some(project) = catalog.local(id) {
            return Ok(Navigation::Local {
                id: id.clone(),
                project: project.clone(),
            });
        }

        let active = match self.tracker.get_active().await {
            Ok(active) => active,
            // An orphaned session is superseded by the connect below.
            Err(err) if err.is_stale_reference() => None,
            Err(err) => return Err(err),
        };
        if let Some(session) = active
            && session.is_bound_to(id)
        {
            tracing::debug!("[ProjectCoordinator] Reusing session for {}", id);
            return Ok(Navigation::Remote {
                session,
                connected_now: false,
            });
        }

        self.tracker.connect(id).await?;

        match self.tracker.get_active().await? {
            Some(session) if session.is_bound_to(id) => {
                tracing::info!("[ProjectCoordinator] Opening remote project {}", id);
                Ok(Navigation::Remote {
                    session,
                    connected_now: true,
                })
            }
            other => {
                let bound = other
                    .map(|s| s.id.to_string())
                    .unwrap_or_else(|| "nothing".to_string());
                Err(DeckError::connection(
                    ConnectFailureKind::Other,
                    format!(
                        "Session for '{}' was not confirmed by the backend (active: {})",
                        id, bound
                    ),
                ))
            }
        }
    }

    /// Removes a remote project.
    ///
    /// If the removed project was bound to the cached session, the session
    /// view is re-read so an orphaned session shows up immediately. A
    /// failing re-read is logged, not returned: the removal itself succeeded.
    pub async fn remove_remote(&self, id: &ProjectId) -> Result<()> {
        self.catalog.remove_remote(id).await?;

        let was_active = self
            .tracker
            .cached()
            .await
            .is_some_and(|s| s.is_bound_to(id));
        if was_active && let Err(e) = self.tracker.get_active().await {
            tracing::warn!(
                "[ProjectCoordinator] Session for removed project {} is orphaned: {}",
                id,
                e
            );
        }

        Ok(())
    }
}
