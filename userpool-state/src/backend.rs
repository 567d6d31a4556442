//! State backend trait and error types

use async_trait::async_trait;
use thiserror::Error;

use crate::lock::LockInfo;
use crate::state::StateFile;

#[derive(Debug, Error)]
pub enum BackendError {
    /// Another run holds the lock
    #[error("State is locked by {who} (lock ID: {lock_id}, operation: {operation})")]
    Locked {
        lock_id: String,
        who: String,
        operation: String,
    },

    #[error("Lock not found: {0}")]
    LockNotFound(String),

    #[error("Lock ID mismatch: expected {expected}, got {actual}")]
    LockMismatch { expected: String, actual: String },

    #[error("Invalid state file: {0}")]
    InvalidState(String),

    /// The file on disk belongs to a different state history
    #[error("State lineage mismatch: expected {expected}, got {actual}")]
    LineageMismatch { expected: String, actual: String },

    #[error("Unsupported state file version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BackendError {
    pub fn locked(lock: &LockInfo) -> Self {
        Self::Locked {
            lock_id: lock.id.clone(),
            who: lock.who.clone(),
            operation: lock.operation.clone(),
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Where state and its lock live
#[async_trait]
pub trait StateBackend: Send + Sync {
    /// `None` before the first apply
    async fn read_state(&self) -> BackendResult<Option<StateFile>>;

    async fn write_state(&self, state: &StateFile) -> BackendResult<()>;

    /// Fails with `Locked` while an unexpired lock exists
    async fn acquire_lock(&self, operation: &str) -> BackendResult<LockInfo>;

    async fn release_lock(&self, lock: &LockInfo) -> BackendResult<()>;

    /// Remove a lock left behind by a crashed run
    async fn force_unlock(&self, lock_id: &str) -> BackendResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_error_names_holder() {
        let lock = LockInfo::new("apply");
        let err = BackendError::locked(&lock);

        assert_eq!(
            err.to_string(),
            format!(
                "State is locked by {} (lock ID: {}, operation: apply)",
                lock.who, lock.id
            )
        );
    }
}
