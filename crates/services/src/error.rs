//! Shared error types for the services crate.

use thiserror::Error;

use storage::StorageError;

use crate::sessions::SessionState;

/// Errors emitted by session orchestration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("invalid session transition from {from:?} to {to:?}")]
    InvalidTransition { from: SessionState, to: SessionState },
    #[error(transparent)]
    Storage(#[from] StorageError),
}
