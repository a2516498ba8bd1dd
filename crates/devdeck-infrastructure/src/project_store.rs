//! JSON file holding the project catalog and remote credentials.
//!
//! Writes go through a temporary file, fsync and rename so a crash never
//! leaves a half-written store behind.

use devdeck_core::error::{DeckError, Result};
use devdeck_core::project::{
    Credential, LocalProjectRecord, ProjectCatalog, ProjectId, RemoteProjectRecord,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// A remote project as persisted, credential included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRemoteProject {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Credential,
}

impl StoredRemoteProject {
    pub fn record(&self) -> RemoteProjectRecord {
        RemoteProjectRecord {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
        }
    }
}

/// On-disk layout of projects.json.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub local_projects: HashMap<ProjectId, LocalProjectRecord>,
    #[serde(default)]
    pub remote_projects: HashMap<ProjectId, StoredRemoteProject>,
}

impl StoreData {
    /// The displayable catalog; credentials are dropped here.
    pub fn catalog(&self) -> Result<ProjectCatalog> {
        let remote = self
            .remote_projects
            .iter()
            .map(|(id, project)| (id.clone(), project.record()))
            .collect();
        ProjectCatalog::new(self.local_projects.clone(), remote)
    }

    pub fn contains(&self, id: &ProjectId) -> bool {
        self.local_projects.contains_key(id) || self.remote_projects.contains_key(id)
    }
}

/// Handle to the projects.json file.
///
/// Callers serialize read-modify-write cycles themselves.
#[derive(Debug, Clone)]
pub struct JsonProjectStore {
    path: PathBuf,
}

impl JsonProjectStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the store. A missing or empty file is an empty store.
    pub async fn load(&self) -> Result<StoreData> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StoreData::default()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(StoreData::default());
        }

        Ok(serde_json::from_str(&content)?)
    }

    /// Saves the store atomically.
    pub async fn save(&self, data: &StoreData) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| DeckError::io("Store path has no parent directory"))?;
        tokio::fs::create_dir_all(parent).await?;

        let json = serde_json::to_string_pretty(data)?;
        let tmp_path = self.path.with_extension("json.tmp");

        let mut tmp_file = tokio::fs::File::create(&tmp_path).await?;
        tmp_file.write_all(json.as_bytes()).await?;
        tmp_file.sync_all().await?;
        drop(tmp_file);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&tmp_path, permissions).await?;
        }

        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    /// Loads, applies `f`, and saves if `f` succeeds.
    pub async fn update<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut StoreData) -> Result<R>,
    {
        let mut data = self.load().await?;
        let result = f(&mut data)?;
        self.save(&data).await?;
        Ok(result)
    }
}
