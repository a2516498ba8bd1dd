pub mod config_service;
pub mod connector;
pub mod local_backend;
pub mod paths;
pub mod project_store;

pub use crate::config_service::{ConfigService, DeckConfig};
pub use crate::connector::{ConnectionHandle, Connector, TcpConnector};
pub use crate::local_backend::LocalBackend;
pub use crate::paths::DeckPaths;
pub use crate::project_store::JsonProjectStore;
