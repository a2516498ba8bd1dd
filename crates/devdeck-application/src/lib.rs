//! Application layer for devdeck.
//!
//! Coordinates the catalog view and the single remote connection on top of
//! the backend trait from `devdeck-core`.

pub mod catalog_cache;
pub mod connection_tracker;
pub mod project_coordinator;

#[cfg(test)]
mod test_support;

pub use catalog_cache::CatalogCache;
pub use connection_tracker::ConnectionTracker;
pub use project_coordinator::{Navigation, ProjectCoordinator};
