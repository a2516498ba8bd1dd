//! Tracks the single active remote connection.

use devdeck_core::ProjectBackend;
use devdeck_core::connection::{ConnectionSession, ConnectionState};
use devdeck_core::error::{ConnectFailureKind, DeckError, Result};
use devdeck_core::gateway::invoke;
use devdeck_core::project::ProjectId;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};

/// Client-side arbiter for the backend's one active connection.
///
/// `get_active` always asks the backend, so sessions dropped remotely or
/// established by another client are observed on the next read. `connect`
/// is serialized: each call first re-reads the backend, so a second call
/// for the same project waits for the pending one and then finds its
/// session, coalescing both into a single backend connect.
pub struct ConnectionTracker {
    backend: Arc<dyn ProjectBackend>,
    state: RwLock<ConnectionState>,
    /// Bumped whenever the session binding changes
    generation: AtomicU64,
    connect_lock: Mutex<()>,
}

impl ConnectionTracker {
    pub fn new(backend: Arc<dyn ProjectBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(ConnectionState::Disconnected),
            generation: AtomicU64::new(0),
            connect_lock: Mutex::new(()),
        }
    }

    /// Reads the backend's active session and adopts it as the local view.
    ///
    /// While a connect is pending the local `Connecting` state is kept; the
    /// connect settles it. A session the backend reports as orphaned (its
    /// project no longer exists) clears the local view before the error is
    /// returned.
    pub async fn get_active(&self) -> Result<Option<ConnectionSession>> {
        match invoke(|| self.backend.get_active_connection()).await {
            Ok(active) => {
                self.adopt(ConnectionState::from(active.clone())).await;
                Ok(active)
            }
            Err(err) => {
                if err.is_stale_reference() {
                    tracing::debug!("[ConnectionTracker] Dropping orphaned session: {}", err);
                    self.adopt(ConnectionState::Disconnected).await;
                }
                Err(err)
            }
        }
    }

    async fn adopt(&self, next: ConnectionState) {
        let mut state = self.state.write().await;
        if !state.is_connecting() && *state != next {
            tracing::debug!("[ConnectionTracker] Adopting backend view: {:?}", next);
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = next;
        }
    }

    /// Connects to the remote project `id`.
    ///
    /// Skips the backend connect when the backend already reports a session
    /// bound to `id`.
    ///
    /// # Errors
    ///
    /// - `DeckError::Connection` if the backend could not establish a session
    /// - `DeckError::Backend` if `id` is unknown to the backend
    ///
    /// On failure the previous view is restored.
    pub async fn connect(&self, id: &ProjectId) -> Result<ConnectionSession> {
        let _guard = self.connect_lock.lock().await;

        let active = match self.get_active().await {
            Ok(active) => active,
            // An orphaned session never satisfies the fast path.
            Err(err) if err.is_stale_reference() => None,
            Err(err) => return Err(err),
        };
        if let Some(session) = active.filter(|s| s.is_bound_to(id)) {
            tracing::debug!("[ConnectionTracker] Already connected to {}", id);
            return Ok(session);
        }

        let previous = self.state.read().await.clone();

        *self.state.write().await = ConnectionState::Connecting(id.clone());
        tracing::info!("[ConnectionTracker] Connecting to remote project {}", id);

        match invoke(|| self.backend.connect_to_remote_project(id.clone())).await {
            Ok(session) => {
                *self.state.write().await = ConnectionState::Connected(session.clone());
                self.generation.fetch_add(1, Ordering::SeqCst);
                tracing::info!(
                    "[ConnectionTracker] Connected to {} ({})",
                    id,
                    session.project.address()
                );
                Ok(session)
            }
            Err(err) => {
                *self.state.write().await = previous;
                let err = Self::connect_failure(err);
                tracing::warn!("[ConnectionTracker] Connect to {} failed: {}", id, err);
                Err(err)
            }
        }
    }

    /// Local view of the session, without contacting the backend.
    pub async fn cached(&self) -> Option<ConnectionSession> {
        self.state.read().await.session().cloned()
    }

    pub async fn state(&self) -> ConnectionState {
        self.state.read().await.clone()
    }

    /// Changes whenever the session binding changes.
    ///
    /// Consumers holding a view derived from an older generation must
    /// re-read.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Stale references stay backend failures; everything else a connect
    /// reports becomes a connection failure.
    fn connect_failure(err: DeckError) -> DeckError {
        match err {
            DeckError::Backend { message } if !message.to_lowercase().contains("not found") => {
                DeckError::connection(ConnectFailureKind::classify(&message), message)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockBackend;
    use std::time::Duration;

    #[tokio::test]
    async fn test_connect_then_get_active() {
        let backend = Arc::new(MockBackend::new());
        let p1 = backend.seed_remote("p1", "10.0.0.1");
        let tracker = ConnectionTracker::new(backend.clone());

        assert!(tracker.get_active().await.unwrap().is_none());

        let session = tracker.connect(&p1).await.unwrap();
        assert!(session.is_bound_to(&p1));
        assert_eq!(session.project.host, "10.0.0.1");

        let active = tracker.get_active().await.unwrap().unwrap();
        assert!(active.is_bound_to(&p1));
        assert_eq!(tracker.cached().await, Some(active));
    }

    #[tokio::test]
    async fn test_redundant_connect_skips_backend() {
        let backend = Arc::new(MockBackend::new());
        let p1 = backend.seed_remote("p1", "10.0.0.1");
        let tracker = ConnectionTracker::new(backend.clone());

        tracker.connect(&p1).await.unwrap();
        let generation = tracker.generation();
        tracker.connect(&p1).await.unwrap();

        assert_eq!(backend.calls("connect_to_remote_project"), 1);
        assert_eq!(tracker.generation(), generation);
    }

    #[tokio::test]
    async fn test_failed_connect_keeps_previous_session() {
        let backend = Arc::new(MockBackend::new());
        let p1 = backend.seed_remote("p1", "10.0.0.1");
        let p2 = backend.seed_remote("p2", "10.0.0.2");
        let tracker = ConnectionTracker::new(backend.clone());
        tracker.connect(&p1).await.unwrap();

        backend.fail_next_connect("Failed to authenticate with remote project: denied");
        let err = tracker.connect(&p2).await.unwrap_err();

        assert_eq!(err.connect_kind(), Some(ConnectFailureKind::AuthRejected));
        assert_eq!(
            err.to_string(),
            "Failed to authenticate with remote project: denied"
        );
        assert!(tracker.state().await.is_connected_to(&p1));
        let active = tracker.get_active().await.unwrap().unwrap();
        assert!(active.is_bound_to(&p1));
    }

    #[tokio::test]
    async fn test_failed_first_connect_stays_disconnected() {
        let backend = Arc::new(MockBackend::new());
        let p1 = backend.seed_remote("p1", "10.0.0.1");
        let tracker = ConnectionTracker::new(backend.clone());

        backend.fail_next_connect("Failed to connect to remote project: Connection refused");
        let err = tracker.connect(&p1).await.unwrap_err();

        assert_eq!(err.connect_kind(), Some(ConnectFailureKind::Unreachable));
        assert_eq!(tracker.state().await, ConnectionState::Disconnected);
        assert!(tracker.get_active().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_project_is_backend_failure() {
        let backend = Arc::new(MockBackend::new());
        let tracker = ConnectionTracker::new(backend.clone());

        let err = tracker.connect(&ProjectId::from("gone")).await.unwrap_err();

        assert!(err.is_backend());
        assert!(err.is_stale_reference());
        assert_eq!(tracker.state().await, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_concurrent_connects_to_same_project_coalesce() {
        let backend =
            Arc::new(MockBackend::new().with_connect_delay(Duration::from_millis(20)));
        let p1 = backend.seed_remote("p1", "10.0.0.1");
        let tracker = ConnectionTracker::new(backend.clone());

        let (a, b) = tokio::join!(tracker.connect(&p1), tracker.connect(&p1));

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(backend.calls("connect_to_remote_project"), 1);
    }

    #[tokio::test]
    async fn test_connect_elsewhere_supersedes() {
        let backend = Arc::new(MockBackend::new());
        let p1 = backend.seed_remote("p1", "10.0.0.1");
        let p2 = backend.seed_remote("p2", "10.0.0.2");
        let tracker = ConnectionTracker::new(backend.clone());

        tracker.connect(&p1).await.unwrap();
        let before = tracker.generation();
        tracker.connect(&p2).await.unwrap();

        assert!(tracker.generation() > before);
        let active = tracker.get_active().await.unwrap().unwrap();
        assert!(active.is_bound_to(&p2));
    }

    #[tokio::test]
    async fn test_remote_drop_is_observed_on_next_read() {
        let backend = Arc::new(MockBackend::new());
        let p1 = backend.seed_remote("p1", "10.0.0.1");
        let tracker = ConnectionTracker::new(backend.clone());
        tracker.connect(&p1).await.unwrap();

        backend.drop_session();

        assert!(tracker.get_active().await.unwrap().is_none());
        assert_eq!(tracker.state().await, ConnectionState::Disconnected);

        // The fast path no longer applies once the drop is observed.
        tracker.connect(&p1).await.unwrap();
        assert_eq!(backend.calls("connect_to_remote_project"), 2);
    }

    #[tokio::test]
    async fn test_connect_after_remote_drop_reconnects() {
        let backend = Arc::new(MockBackend::new());
        let p1 = backend.seed_remote("p1", "10.0.0.1");
        let tracker = ConnectionTracker::new(backend.clone());
        tracker.connect(&p1).await.unwrap();

        backend.drop_session();
        // No read in between: the cached view still says connected.
        assert!(tracker.state().await.is_connected_to(&p1));

        let session = tracker.connect(&p1).await.unwrap();

        assert!(session.is_bound_to(&p1));
        assert_eq!(backend.calls("connect_to_remote_project"), 2);
        let active = tracker.get_active().await.unwrap().unwrap();
        assert!(active.is_bound_to(&p1));
    }

    #[tokio::test]
    async fn test_orphaned_session_clears_view() {
        let backend = Arc::new(MockBackend::new());
        let p1 = backend.seed_remote("p1", "10.0.0.1");
        let tracker = ConnectionTracker::new(backend.clone());
        tracker.connect(&p1).await.unwrap();
        let before = tracker.generation();

        invoke(|| backend.remove_remote_project(p1.clone()))
            .await
            .unwrap();

        let err = tracker.get_active().await.unwrap_err();
        assert!(err.is_stale_reference());
        assert_eq!(tracker.state().await, ConnectionState::Disconnected);
        assert!(tracker.generation() > before);

        let err = tracker.connect(&p1).await.unwrap_err();
        assert!(err.is_backend());
        assert!(err.is_stale_reference());
        assert_eq!(backend.calls("connect_to_remote_project"), 2);
        assert_eq!(tracker.state().await, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_concurrent_connects_to_different_projects_serialize() {
        let backend =
            Arc::new(MockBackend::new().with_connect_delay(Duration::from_millis(20)));
        let p1 = backend.seed_remote("p1", "10.0.0.1");
        let p2 = backend.seed_remote("p2", "10.0.0.2");
        let tracker = ConnectionTracker::new(backend.clone());

        let (a, b) = tokio::join!(tracker.connect(&p1), tracker.connect(&p2));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert!(a.is_bound_to(&p1));
        assert!(b.is_bound_to(&p2));
        assert_eq!(backend.calls("connect_to_remote_project"), 2);

        let active = tracker.get_active().await.unwrap().unwrap();
        assert!(active == a || active == b);
        assert_eq!(tracker.state().await, ConnectionState::Connected(active));
    }
}
