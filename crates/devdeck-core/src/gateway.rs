//! Command gateway.
//!
//! The single place where a dual-shaped [`CommandOutcome`] is unwrapped.
//! Everything above this layer sees either a value or a
//! [`DeckError::Backend`].

use crate::error::{DeckError, Result};
use crate::outcome::CommandOutcome;
use std::future::Future;

/// Runs a backend operation and normalizes its outcome.
///
/// # Arguments
///
/// * `operation` - Zero-argument thunk producing the command's outcome
///
/// # Returns
///
/// - `Ok(T)`: the command's data
/// - `Err(DeckError::Backend)`: the command failed; the message is the
///   native error's message, the failure text itself, or `Unknown error`
pub async fn invoke<T, F, Fut>(operation: F) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = CommandOutcome<T>>,
{
    match operation().await {
        CommandOutcome::Ok { data } => Ok(data),
        CommandOutcome::Error { error } => {
            let message = error.message();
            tracing::debug!("[CommandGateway] command failed: {}", message);
            Err(DeckError::backend(message))
        }
    }
}
