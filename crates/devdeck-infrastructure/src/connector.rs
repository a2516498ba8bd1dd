//! Transport used to establish remote sessions.

use crate::project_store::StoredRemoteProject;
use async_trait::async_trait;
use devdeck_core::error::{ConnectFailureKind, DeckError, Result};
use std::time::Duration;
use tokio::net::TcpStream;

/// An open link to a remote host, held for the lifetime of a session.
#[derive(Debug)]
pub struct ConnectionHandle {
    peer: String,
    stream: Option<TcpStream>,
}

impl ConnectionHandle {
    pub fn new(peer: String, stream: TcpStream) -> Self {
        Self {
            peer,
            stream: Some(stream),
        }
    }

    /// A handle with no underlying socket.
    pub fn detached(peer: impl Into<String>) -> Self {
        Self {
            peer: peer.into(),
            stream: None,
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn is_attached(&self) -> bool {
        self.stream.is_some()
    }
}

/// Opens connections to remote projects.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self, project: &StoredRemoteProject) -> Result<ConnectionHandle>;
}

/// Connector that verifies the host accepts TCP connections on the
/// project's port.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    timeout: Duration,
}

impl TcpConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn open(&self, project: &StoredRemoteProject) -> Result<ConnectionHandle> {
        let peer = format!("{}:{}", project.host, project.port);
        tracing::debug!("[TcpConnector] Opening {} as {}", peer, project.user);

        match tokio::time::timeout(self.timeout, TcpStream::connect(&peer)).await {
            Ok(Ok(stream)) => Ok(ConnectionHandle::new(peer, stream)),
            Ok(Err(e)) => Err(DeckError::connection(
                ConnectFailureKind::Unreachable,
                format!("Failed to connect to remote project: {}", e),
            )),
            Err(_) => Err(DeckError::connection(
                ConnectFailureKind::Timeout,
                format!(
                    "Connection to {} timed out after {}s",
                    peer,
                    self.timeout.as_secs()
                ),
            )),
        }
    }
}
