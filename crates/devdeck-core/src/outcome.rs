//! Dual-shaped results returned by backend commands.
//!
//! A command bridge reports either `{"status": "ok", "data": ...}` or
//! `{"status": "error", "error": ...}`. The error payload is untyped: it may
//! be a plain string, an error-like object carrying a `message`, or any other
//! value.

use serde::{Deserialize, Serialize};

/// Text used when a failure payload carries no usable message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Outcome of a single backend command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandOutcome<T> {
    Ok { data: T },
    Error { error: ErrorPayload },
}

impl<T> CommandOutcome<T> {
    pub fn ok(data: T) -> Self {
        Self::Ok { data }
    }

    pub fn error(error: impl Into<ErrorPayload>) -> Self {
        Self::Error {
            error: error.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

impl<T, E: Into<ErrorPayload>> From<Result<T, E>> for CommandOutcome<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::error(err),
        }
    }
}

/// Failure payload as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorPayload {
    /// A plain text failure.
    Text(String),
    /// A native error value carrying its own message.
    Native { message: String },
    /// Anything else.
    Untyped(serde_json::Value),
}

impl ErrorPayload {
    /// Wraps a native error, keeping only its message.
    pub fn native(err: &dyn std::error::Error) -> Self {
        Self::Native {
            message: err.to_string(),
        }
    }

    /// The failure reason surfaced to callers.
    pub fn message(&self) -> String {
        match self {
            Self::Native { message } => message.clone(),
            Self::Text(text) => text.clone(),
            Self::Untyped(_) => UNKNOWN_ERROR.to_string(),
        }
    }
}

impl From<String> for ErrorPayload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ErrorPayload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<serde_json::Value> for ErrorPayload {
    fn from(value: serde_json::Value) -> Self {
        Self::Untyped(value)
    }
}
