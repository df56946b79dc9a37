use thiserror::Error;

use crate::domain::models::ProjectId;

/// Errors that can occur during tracker operations.
///
/// `Validation`, `ReferentialIntegrity`, `InvalidDuration` and
/// `InvalidBackup` are raised before any in-memory mutation takes place.
/// `Storage` is raised after the in-memory mutation succeeded; the caller
/// may retry persistence without losing the change.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("project {0} still has tasks assigned to it")]
    ReferentialIntegrity(ProjectId),
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
    #[error("invalid backup payload: {0}")]
    InvalidBackup(String),
    #[error(transparent)]
    Storage(#[from] tempo_store::StorageError),
}

impl TrackerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_duration(msg: impl Into<String>) -> Self {
        Self::InvalidDuration(msg.into())
    }

    pub fn invalid_backup(msg: impl Into<String>) -> Self {
        Self::InvalidBackup(msg.into())
    }
}
