//! Error types for the store and the request facade.

use crate::types::RecordId;
use crate::validation::ValidationErrors;
use thiserror::Error;

/// Errors raised by [`RecordStore`](crate::store::RecordStore) operations.
///
/// A failed operation leaves the forest untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("Parent record not found: {0}")]
    ParentNotFound(RecordId),

    #[error("Invalid seed data: {0}")]
    Seed(String),
}

/// Errors surfaced by the request facade.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Request failed to settle: {0}")]
    Settlement(String),

    #[error("Failed to load records: {0}")]
    Load(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ApiError {
    /// True when the request failed because an id did not resolve.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::Store(StoreError::RecordNotFound(_) | StoreError::ParentNotFound(_))
        )
    }
}
