pub mod model;

pub use model::{
    Credential, LocalProjectRecord, ProjectCatalog, ProjectId, RemoteProjectDraft,
    RemoteProjectRecord, DEFAULT_SSH_PORT, DEFAULT_SSH_USER,
};
