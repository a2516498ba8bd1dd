//! In-process project backend over projects.json.

use crate::connector::{ConnectionHandle, Connector};
use crate::project_store::{JsonProjectStore, StoreData, StoredRemoteProject};
use async_trait::async_trait;
use devdeck_core::ProjectBackend;
use devdeck_core::connection::ConnectionSession;
use devdeck_core::error::{DeckError, Result};
use devdeck_core::outcome::{CommandOutcome, ErrorPayload};
use devdeck_core::project::{
    LocalProjectRecord, ProjectCatalog, ProjectId, RemoteProjectDraft,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

struct ActiveSession {
    id: ProjectId,
    connected_at: String,
    handle: ConnectionHandle,
}

/// Backend that owns the project store and the single live connection.
///
/// Lock order is `connect_lock`, then `active`, then `store_lock`.
pub struct LocalBackend {
    store: JsonProjectStore,
    store_lock: Mutex<()>,
    connector: Arc<dyn Connector>,
    active: Mutex<Option<ActiveSession>>,
    /// Serializes connects without blocking readers of `active`
    connect_lock: Mutex<()>,
}

impl LocalBackend {
    pub fn new(store: JsonProjectStore, connector: Arc<dyn Connector>) -> Self {
        Self {
            store,
            store_lock: Mutex::new(()),
            connector,
            active: Mutex::new(None),
            connect_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &JsonProjectStore {
        &self.store
    }

    fn remote_not_found(id: &ProjectId) -> DeckError {
        DeckError::backend(format!("Remote project with id '{}' not found", id))
    }

    fn local_not_found(id: &ProjectId) -> DeckError {
        DeckError::backend(format!("Local project with id '{}' not found", id))
    }

    fn fresh_id(data: &StoreData) -> ProjectId {
        loop {
            let id = ProjectId::new(Uuid::new_v4().to_string());
            if !data.contains(&id) {
                return id;
            }
        }
    }

    /// Caller holds `store_lock`.
    async fn open_store(&self) -> Result<StoreData> {
        self.store
            .load()
            .await
            .map_err(|e| DeckError::backend(format!("Failed to open store: {}", e)))
    }

    async fn stored_remote(&self, id: &ProjectId) -> Result<StoredRemoteProject> {
        let _guard = self.store_lock.lock().await;
        self.open_store()
            .await?
            .remote_projects
            .get(id)
            .cloned()
            .ok_or_else(|| Self::remote_not_found(id))
    }

    async fn list(&self) -> Result<ProjectCatalog> {
        let _guard = self.store_lock.lock().await;
        self.open_store().await?.catalog()
    }

    async fn add_local(&self, path: String) -> Result<ProjectId> {
        if path.trim().is_empty() {
            return Err(DeckError::validation("path must not be empty"));
        }

        let _guard = self.store_lock.lock().await;
        let id = self
            .store
            .update(|data| {
                let id = Self::fresh_id(data);
                data.local_projects
                    .insert(id.clone(), LocalProjectRecord { path: path.clone() });
                Ok(id)
            })
            .await?;

        tracing::info!("[LocalBackend] Registered local project {} at {}", id, path);
        Ok(id)
    }

    async fn add_remote(&self, draft: RemoteProjectDraft) -> Result<ProjectId> {
        draft.validate()?;

        let _guard = self.store_lock.lock().await;
        let address = draft.record().address();
        let id = self
            .store
            .update(|data| {
                let id = Self::fresh_id(data);
                data.remote_projects.insert(
                    id.clone(),
                    StoredRemoteProject {
                        host: draft.host,
                        port: draft.port,
                        user: draft.user,
                        password: draft.password,
                    },
                );
                Ok(id)
            })
            .await?;

        tracing::info!("[LocalBackend] Registered remote project {} ({})", id, address);
        Ok(id)
    }

    async fn remove_remote(&self, id: ProjectId) -> Result<()> {
        let active = self.active.lock().await;
        if active.as_ref().is_some_and(|session| session.id == id) {
            return Err(DeckError::backend(format!(
                "Remote project with id '{}' has an active connection",
                id
            )));
        }

        let _guard = self.store_lock.lock().await;
        self.store
            .update(|data| {
                data.remote_projects
                    .remove(&id)
                    .map(|_| ())
                    .ok_or_else(|| Self::remote_not_found(&id))
            })
            .await?;

        tracing::info!("[LocalBackend] Removed remote project {}", id);
        Ok(())
    }

    async fn remove_local(&self, id: ProjectId) -> Result<()> {
        let _guard = self.store_lock.lock().await;
        self.store
            .update(|data| {
                data.local_projects
                    .remove(&id)
                    .map(|_| ())
                    .ok_or_else(|| Self::local_not_found(&id))
            })
            .await?;

        tracing::info!("[LocalBackend] Removed local project {}", id);
        Ok(())
    }

    async fn active_session(&self) -> Result<Option<ConnectionSession>> {
        let active = self.active.lock().await;
        let Some(session) = active.as_ref() else {
            return Ok(None);
        };

        let _guard = self.store_lock.lock().await;
        let data = self.open_store().await?;
        // The store may have been edited underneath a live session.
        let project = data
            .remote_projects
            .get(&session.id)
            .ok_or_else(|| Self::remote_not_found(&session.id))?;

        Ok(Some(ConnectionSession {
            id: session.id.clone(),
            project: project.record(),
            connected_at: session.connected_at.clone(),
        }))
    }

    /// Connects are serialized by `connect_lock`. The previous session is
    /// only replaced once the connector succeeds, so a failure leaves it in
    /// place.
    async fn connect(&self, id: ProjectId) -> Result<ConnectionSession> {
        let _connecting = self.connect_lock.lock().await;

        let project = self.stored_remote(&id).await?;
        let handle = self.connector.open(&project).await?;

        let mut active = self.active.lock().await;
        // The project may have been removed while the connector was running.
        let project = self.stored_remote(&id).await?;
        let connected_at = chrono::Utc::now().to_rfc3339();

        if let Some(previous) = active.as_ref() {
            tracing::info!(
                "[LocalBackend] Closing session for {} ({})",
                previous.id,
                previous.handle.peer()
            );
        }
        tracing::info!("[LocalBackend] Connected to {} ({})", id, handle.peer());

        *active = Some(ActiveSession {
            id: id.clone(),
            connected_at: connected_at.clone(),
            handle,
        });

        Ok(ConnectionSession {
            id,
            project: project.record(),
            connected_at,
        })
    }

    fn respond<T>(result: Result<T>) -> CommandOutcome<T> {
        match result {
            Ok(data) => CommandOutcome::ok(data),
            Err(e) => CommandOutcome::error(ErrorPayload::native(&e)),
        }
    }
}

#[async_trait]
impl ProjectBackend for LocalBackend {
    async fn list_all_projects(&self) -> CommandOutcome<ProjectCatalog> {
        Self::respond(self.list().await)
    }

    async fn add_local_project(&self, path: String) -> CommandOutcome<ProjectId> {
        Self::respond(self.add_local(path).await)
    }

    async fn add_remote_project(&self, draft: RemoteProjectDraft) -> CommandOutcome<ProjectId> {
        Self::respond(self.add_remote(draft).await)
    }

    async fn remove_remote_project(&self, id: ProjectId) -> CommandOutcome<()> {
        Self::respond(self.remove_remote(id).await)
    }

    async fn remove_local_project(&self, id: ProjectId) -> CommandOutcome<()> {
        Self::respond(self.remove_local(id).await)
    }

    async fn get_active_connection(&self) -> CommandOutcome<Option<ConnectionSession>> {
        Self::respond(self.active_session().await)
    }

    async fn connect_to_remote_project(&self, id: ProjectId) -> CommandOutcome<ConnectionSession> {
        Self::respond(self.connect(id).await)
    }
}
