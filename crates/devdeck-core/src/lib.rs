//! Domain layer for devdeck.
//!
//! Holds the project and connection models, the dual-shaped command
//! outcome, the command gateway that unwraps it, and the backend trait the
//! application layer talks to.

pub mod backend;
pub mod connection;
pub mod error;
pub mod gateway;
pub mod outcome;
pub mod project;

pub use backend::ProjectBackend;
pub use error::{ConnectFailureKind, DeckError, Result};
pub use outcome::{CommandOutcome, ErrorPayload};
