//! Connection session domain model.

use crate::project::{ProjectId, RemoteProjectRecord};
use serde::{Deserialize, Serialize};

/// The backend's record of the one connected remote project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSession {
    /// Project the session is bound to
    pub id: ProjectId,
    /// Record the session was established against
    pub project: RemoteProjectRecord,
    /// RFC3339 timestamp of when the backend established the session
    pub connected_at: String,
}

impl ConnectionSession {
    pub fn is_bound_to(&self, id: &ProjectId) -> bool {
        &self.id == id
    }
}

/// Client-side view of the connection lifecycle.
///
/// There is no disconnect transition: `Connected` is only left by
/// connecting somewhere else, which the backend treats as superseding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting(ProjectId),
    Connected(ConnectionSession),
}

impl ConnectionState {
    pub fn session(&self) -> Option<&ConnectionSession> {
        match self {
            Self::Connected(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_connected_to(&self, id: &ProjectId) -> bool {
        self.session().is_some_and(|s| s.is_bound_to(id))
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::Connecting(_))
    }
}

impl From<Option<ConnectionSession>> for ConnectionState {
    fn from(session: Option<ConnectionSession>) -> Self {
        match session {
            Some(session) => Self::Connected(session),
            None => Self::Disconnected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str) -> ConnectionSession {
        ConnectionSession {
            id: ProjectId::from(id),
            project: RemoteProjectRecord {
                host: "10.0.0.1".to_string(),
                port: 22,
                user: "root".to_string(),
            },
            connected_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_state_from_session() {
        let state = ConnectionState::from(Some(session("p1")));
        assert!(state.is_connected_to(&ProjectId::from("p1")));
        assert!(!state.is_connected_to(&ProjectId::from("p2")));

        let state = ConnectionState::from(None);
        assert_eq!(state, ConnectionState::Disconnected);
        assert!(state.session().is_none());
    }

    #[test]
    fn test_connecting_has_no_session() {
        let state = ConnectionState::Connecting(ProjectId::from("p1"));
        assert!(state.is_connecting());
        assert!(!state.is_connected_to(&ProjectId::from("p1")));
    }
}
