//! # Store Errors
//!
//! Failures of the store plumbing itself. Request failures are never reported here:
//! they land in [`ProductCollectionState::last_error`](super::ProductCollectionState).

/// Errors that can occur while talking to the store actor.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum StoreError {
    #[error("Store closed")]
    Closed,
    #[error("Store dropped response channel")]
    Dropped,
    #[error("Store task failed: {0}")]
    TaskFailed(String),
}
