//! Command-execution backend interface.
//!
//! The backend is the sole authority on which projects exist and which
//! remote project is connected. Every operation answers with a dual-shaped
//! [`CommandOutcome`]; callers go through [`crate::gateway::invoke`] to turn
//! it into a `Result`.

use crate::connection::ConnectionSession;
use crate::outcome::CommandOutcome;
use crate::project::{ProjectCatalog, ProjectId, RemoteProjectDraft};
use async_trait::async_trait;

/// Operations exposed by the command-execution backend.
///
/// # Implementation Notes
///
/// Implementations should:
/// - Assign identifiers themselves and keep local and remote ids disjoint
/// - Keep at most one active connection; a new connect supersedes the old one
/// - Never return credentials from `list_all_projects`
#[async_trait]
pub trait ProjectBackend: Send + Sync {
    /// Lists every known local and remote project.
    async fn list_all_projects(&self) -> CommandOutcome<ProjectCatalog>;

    /// Registers a local project rooted at `path` and returns its id.
    async fn add_local_project(&self, path: String) -> CommandOutcome<ProjectId>;

    /// Registers a remote project and returns its id.
    async fn add_remote_project(&self, draft: RemoteProjectDraft) -> CommandOutcome<ProjectId>;

    /// Removes a remote project. Unknown ids are a failure.
    async fn remove_remote_project(&self, id: ProjectId) -> CommandOutcome<()>;

    /// Removes a local project. Unknown ids are a failure.
    async fn remove_local_project(&self, id: ProjectId) -> CommandOutcome<()>;

    /// Returns the active connection, if any.
    async fn get_active_connection(&self) -> CommandOutcome<Option<ConnectionSession>>;

    /// Connects to the remote project `id`, superseding any active session.
    async fn connect_to_remote_project(&self, id: ProjectId) -> CommandOutcome<ConnectionSession>;
}
