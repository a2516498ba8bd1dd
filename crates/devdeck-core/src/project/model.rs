//! Project catalog domain model.

use crate::error::{DeckError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Default SSH port offered for new remote projects.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Default login offered for new remote projects.
pub const DEFAULT_SSH_USER: &str = "root";

/// Opaque project identifier assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ProjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A project rooted in a local filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalProjectRecord {
    pub path: String,
}

/// A project reachable over SSH.
///
/// The credential is deliberately absent: the catalog only ever holds what
/// the front end may display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProjectRecord {
    pub host: String,
    pub port: u16,
    pub user: String,
}

impl RemoteProjectRecord {
    /// `user@host:port`, as shown in project listings.
    pub fn address(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.port)
    }
}

/// A secret that must not leak into logs or debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Everything the backend needs to register a remote project.
#[derive(Debug, Clone)]
pub struct RemoteProjectDraft {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Credential,
}

impl RemoteProjectDraft {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: Credential::new(password),
        }
    }

    /// Checks the constraints the add form enforces before submitting.
    ///
    /// The port needs no check: `u16` cannot be negative.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(DeckError::validation("host must not be empty"));
        }
        if self.user.trim().is_empty() {
            return Err(DeckError::validation("user must not be empty"));
        }
        if self.password.is_empty() {
            return Err(DeckError::validation("password must not be empty"));
        }
        Ok(())
    }

    /// The displayable part of the draft.
    pub fn record(&self) -> RemoteProjectRecord {
        RemoteProjectRecord {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
        }
    }
}

/// Snapshot of all known projects.
///
/// Local and remote identifiers share one namespace: an id present in one
/// mapping is never present in the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CatalogParts")]
pub struct ProjectCatalog {
    local_projects: HashMap<ProjectId, LocalProjectRecord>,
    remote_projects: HashMap<ProjectId, RemoteProjectRecord>,
}

#[derive(Deserialize)]
struct CatalogParts {
    #[serde(default)]
    local_projects: HashMap<ProjectId, LocalProjectRecord>,
    #[serde(default)]
    remote_projects: HashMap<ProjectId, RemoteProjectRecord>,
}

impl TryFrom<CatalogParts> for ProjectCatalog {
    type Error = DeckError;

    fn try_from(parts: CatalogParts) -> Result<Self> {
        Self::new(parts.local_projects, parts.remote_projects)
    }
}

impl ProjectCatalog {
    /// Builds a catalog, rejecting identifiers present in both mappings.
    pub fn new(
        local_projects: HashMap<ProjectId, LocalProjectRecord>,
        remote_projects: HashMap<ProjectId, RemoteProjectRecord>,
    ) -> Result<Self> {
        if let Some(id) = local_projects
            .keys()
            .find(|id| remote_projects.contains_key(*id))
        {
            return Err(DeckError::backend(format!(
                "Project id '{}' is registered as both local and remote",
                id
            )));
        }

        Ok(Self {
            local_projects,
            remote_projects,
        })
    }

    pub fn local_projects(&self) -> &HashMap<ProjectId, LocalProjectRecord> {
        &self.local_projects
    }

    pub fn remote_projects(&self) -> &HashMap<ProjectId, RemoteProjectRecord> {
        &self.remote_projects
    }

    pub fn local(&self, id: &ProjectId) -> Option<&LocalProjectRecord> {
        self.local_projects.get(id)
    }

    pub fn remote(&self, id: &ProjectId) -> Option<&RemoteProjectRecord> {
        self.remote_projects.get(id)
    }

    pub fn contains(&self, id: &ProjectId) -> bool {
        self.local_projects.contains_key(id) || self.remote_projects.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.local_projects.is_empty() && self.remote_projects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.local_projects.len() + self.remote_projects.len()
    }

    /// Remote projects sorted by id, for stable listings.
    pub fn remote_sorted(&self) -> Vec<(&ProjectId, &RemoteProjectRecord)> {
        let mut entries: Vec<_> = self.remote_projects.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Local projects sorted by id, for stable listings.
    pub fn local_sorted(&self) -> Vec<(&ProjectId, &LocalProjectRecord)> {
        let mut entries: Vec<_> = self.local_projects.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}
