//! In-memory backend used by the application-layer tests.

use async_trait::async_trait;
use devdeck_core::ProjectBackend;
use devdeck_core::connection::ConnectionSession;
use devdeck_core::outcome::CommandOutcome;
use devdeck_core::project::{
    Credential, LocalProjectRecord, ProjectCatalog, ProjectId, RemoteProjectDraft,
    RemoteProjectRecord,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct MockState {
    local: HashMap<ProjectId, LocalProjectRecord>,
    remote: HashMap<ProjectId, (RemoteProjectRecord, Credential)>,
    active: Option<ConnectionSession>,
    next_id: u32,
    calls: Vec<&'static str>,
    connect_failure: Option<String>,
    add_remote_failure: Option<String>,
}

/// Mock backend with a call log and failure injection.
pub(crate) struct MockBackend {
    state: Mutex<MockState>,
    connect_delay: Option<Duration>,
    reject_remove_while_connected: bool,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            connect_delay: None,
            reject_remove_while_connected: false,
        }
    }

    /// Makes every connect take `delay` before answering.
    pub(crate) fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }

    /// Rejects removing the project bound to the active session.
    pub(crate) fn rejecting_remove_while_connected(mut self) -> Self {
        self.reject_remove_while_connected = true;
        self
    }

    pub(crate) fn seed_remote(&self, id: &str, host: &str) -> ProjectId {
        let id = ProjectId::from(id);
        let record = RemoteProjectRecord {
            host: host.to_string(),
            port: 22,
            user: "root".to_string(),
        };
        self.state
            .lock()
            .unwrap()
            .remote
            .insert(id.clone(), (record, Credential::new("secret")));
        id
    }

    pub(crate) fn fail_next_connect(&self, message: &str) {
        self.state.lock().unwrap().connect_failure = Some(message.to_string());
    }

    pub(crate) fn fail_next_add_remote(&self, message: &str) {
        self.state.lock().unwrap().add_remote_failure = Some(message.to_string());
    }

    /// Drops the active session as if the remote side hung up.
    pub(crate) fn drop_session(&self) {
        self.state.lock().unwrap().active = None;
    }

    pub(crate) fn calls(&self, name: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| **call == name)
            .count()
    }

    pub(crate) fn credential_of(&self, id: &ProjectId) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .remote
            .get(id)
            .map(|(_, credential)| credential.expose().to_string())
    }

    fn record(&self, call: &'static str) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn next_id(state: &mut MockState) -> ProjectId {
        state.next_id += 1;
        ProjectId::new(format!("id-{}", state.next_id))
    }
}

#[async_trait]
impl ProjectBackend for MockBackend {
    async fn list_all_projects(&self) -> CommandOutcome<ProjectCatalog> {
        self.record("list_all_projects");
        let state = self.state.lock().unwrap();
        let remote = state
            .remote
            .iter()
            .map(|(id, (record, _))| (id.clone(), record.clone()))
            .collect();
        ProjectCatalog::new(state.local.clone(), remote)
            .map_err(|e| e.to_string())
            .into()
    }

    async fn add_local_project(&self, path: String) -> CommandOutcome<ProjectId> {
        self.record("add_local_project");
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        state.local.insert(id.clone(), LocalProjectRecord { path });
        CommandOutcome::ok(id)
    }

    async fn add_remote_project(&self, draft: RemoteProjectDraft) -> CommandOutcome<ProjectId> {
        self.record("add_remote_project");
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.add_remote_failure.take() {
            return CommandOutcome::error(message);
        }
        let id = Self::next_id(&mut state);
        state
            .remote
            .insert(id.clone(), (draft.record(), draft.password.clone()));
        CommandOutcome::ok(id)
    }

    async fn remove_remote_project(&self, id: ProjectId) -> CommandOutcome<()> {
        self.record("remove_remote_project");
        let mut state = self.state.lock().unwrap();
        let bound = state.active.as_ref().is_some_and(|s| s.id == id);
        if bound && self.reject_remove_while_connected {
            return CommandOutcome::error(format!(
                "Remote project with id '{}' has an active connection",
                id
            ));
        }
        if state.remote.remove(&id).is_none() {
            return CommandOutcome::error(format!("Remote project with id '{}' not found", id));
        }
        CommandOutcome::ok(())
    }

    async fn remove_local_project(&self, id: ProjectId) -> CommandOutcome<()> {
        self.record("remove_local_project");
        let mut state = self.state.lock().unwrap();
        if state.local.remove(&id).is_none() {
            return CommandOutcome::error(format!("Local project with id '{}' not found", id));
        }
        CommandOutcome::ok(())
    }

    async fn get_active_connection(&self) -> CommandOutcome<Option<ConnectionSession>> {
        self.record("get_active_connection");
        let state = self.state.lock().unwrap();
        match &state.active {
            Some(session) if !state.remote.contains_key(&session.id) => CommandOutcome::error(
                format!("Remote project with id '{}' not found", session.id),
            ),
            active => CommandOutcome::ok(active.clone()),
        }
    }

    async fn connect_to_remote_project(&self, id: ProjectId) -> CommandOutcome<ConnectionSession> {
        self.record("connect_to_remote_project");
        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.connect_failure.take() {
            return CommandOutcome::error(message);
        }
        let Some((record, _)) = state.remote.get(&id) else {
            return CommandOutcome::error(format!("Remote project with id '{}' not found", id));
        };
        let session = ConnectionSession {
            id: id.clone(),
            project: record.clone(),
            connected_at: chrono::Utc::now().to_rfc3339(),
        };
        state.active = Some(session.clone());
        CommandOutcome::ok(session)
    }
}
