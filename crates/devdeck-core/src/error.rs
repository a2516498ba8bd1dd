//! Error types for devdeck.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a connect attempt did not establish a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectFailureKind {
    /// Host could not be reached (refused, no route, DNS failure)
    Unreachable,
    /// Host answered but rejected the credentials
    AuthRejected,
    /// The attempt did not finish in time
    Timeout,
    /// Anything the backend did not describe more precisely
    Other,
}

impl ConnectFailureKind {
    /// Classifies a backend failure message.
    ///
    /// The backend only reports text, so the kind is recovered from the
    /// stage names it uses ("authenticate", "timed out", "connect").
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("authenticat") || lower.contains("permission denied") {
            Self::AuthRejected
        } else if lower.contains("timed out") || lower.contains("timeout") {
            Self::Timeout
        } else if lower.contains("failed to connect")
            || lower.contains("unreachable")
            || lower.contains("refused")
            || lower.contains("no route")
        {
            Self::Unreachable
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for ConnectFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unreachable => "unreachable",
            Self::AuthRejected => "authentication rejected",
            Self::Timeout => "timeout",
            Self::Other => "failed",
        };
        f.write_str(label)
    }
}

/// The shared error type for devdeck.
///
/// `Backend` and `Connection` are the two failures the coordinator surfaces
/// to the front end. The remaining variants belong to the infrastructure
/// and front-end layers.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum DeckError {
    /// A backend operation was rejected or could not be completed
    #[error("{message}")]
    Backend { message: String },

    /// A connect attempt did not establish a session
    #[error("{message}")]
    Connection {
        kind: ConnectFailureKind,
        message: String,
    },

    /// Input rejected before it reached the backend
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO error (file system, sockets)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeckError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Creates a Connection error with an explicit kind
    pub fn connection(kind: ConnectFailureKind, message: impl Into<String>) -> Self {
        Self::Connection {
            kind,
            message: message.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Backend error
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }

    /// Check if this is a Connection error
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns the connect failure kind, if this is a Connection error.
    pub fn connect_kind(&self) -> Option<ConnectFailureKind> {
        match self {
            Self::Connection { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Check if this error reports an identifier the backend no longer knows.
    pub fn is_stale_reference(&self) -> bool {
        match self {
            Self::Backend { message } => message.to_lowercase().contains("not found"),
            _ => false,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for DeckError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for DeckError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for DeckError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for DeckError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, DeckError>`.
pub type Result<T> = std::result::Result<T, DeckError>;
