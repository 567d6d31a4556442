//! State kept in a JSON file next to the declaration
//!
//! The lock is a sibling `.lock` file holding a serialized `LockInfo`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::backend::{BackendError, BackendResult, StateBackend};
use crate::lock::LockInfo;
use crate::state::StateFile;

pub struct LocalBackend {
    state_path: PathBuf,
    lock_path: PathBuf,
}

impl LocalBackend {
    pub const DEFAULT_STATE_FILE: &'static str = "userpool.state.json";

    /// The lock lives at `<state file name>.lock` in the same directory
    pub fn with_path(state_path: impl Into<PathBuf>) -> Self {
        let state_path = state_path.into();
        let lock_path = sibling(&state_path, ".lock");
        Self {
            state_path,
            lock_path,
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    async fn read_lock(&self) -> BackendResult<Option<LockInfo>> {
        match fs::read_to_string(&self.lock_path).await {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|e| BackendError::InvalidState(format!("Failed to parse lock file: {}", e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::Io(format!("Failed to read lock file: {}", e))),
        }
    }

    /// Describe the lock that appeared between our check and our create.
    /// The winner may not have written it out yet.
    async fn lost_race(&self) -> BackendError {
        match self.read_lock().await {
            Ok(Some(existing)) => BackendError::locked(&existing),
            _ => BackendError::Locked {
                lock_id: "(being written)".to_string(),
                who: "another run".to_string(),
                operation: "unknown".to_string(),
            },
        }
    }

    async fn remove_lock_file(&self) -> BackendResult<()> {
        fs::remove_file(&self.lock_path)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to remove lock file: {}", e)))
    }

    /// Create the lock file, failing with `Locked` if another run got there first
    async fn create_lock_file(&self, lock: &LockInfo) -> BackendResult<()> {
        let content = serde_json::to_vec_pretty(lock)
            .map_err(|e| BackendError::Serialization(format!("Failed to serialize lock: {}", e)))?;

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.lock_path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(self.lost_race().await);
            }
            Err(e) => {
                return Err(BackendError::Io(format!(
                    "Failed to create lock file: {}",
                    e
                )));
            }
        };
        file.write_all(&content)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to write lock file: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| BackendError::Io(format!("Failed to write lock file: {}", e)))
    }
}

/// `path` with `suffix` appended to its full file name
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

#[async_trait]
impl StateBackend for LocalBackend {
    async fn read_state(&self) -> BackendResult<Option<StateFile>> {
        let content = match fs::read_to_string(&self.state_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BackendError::Io(format!("Failed to read state file: {}", e))),
        };

        let state: StateFile = serde_json::from_str(&content)
            .map_err(|e| BackendError::InvalidState(format!("Failed to parse state file: {}", e)))?;

        if state.version > StateFile::CURRENT_VERSION {
            return Err(BackendError::UnsupportedVersion {
                found: state.version,
                expected: StateFile::CURRENT_VERSION,
            });
        }

        Ok(Some(state))
    }

    async fn write_state(&self, state: &StateFile) -> BackendResult<()> {
        if let Some(existing) = self.read_state().await?
            && existing.lineage != state.lineage
        {
            return Err(BackendError::LineageMismatch {
                expected: existing.lineage,
                actual: state.lineage.clone(),
            });
        }

        let content = serde_json::to_string_pretty(state)
            .map_err(|e| BackendError::Serialization(format!("Failed to serialize state: {}", e)))?;

        // Write then rename so a crash never leaves a truncated state file
        let tmp_path = sibling(&self.state_path, ".tmp");
        fs::write(&tmp_path, content)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to write state file: {}", e)))?;
        fs::rename(&tmp_path, &self.state_path)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to write state file: {}", e)))?;

        log::debug!(
            "Wrote state serial {} to {}",
            state.serial,
            self.state_path.display()
        );
        Ok(())
    }

    async fn acquire_lock(&self, operation: &str) -> BackendResult<LockInfo> {
        match self.read_lock().await? {
            Some(existing) if !existing.is_expired() => {
                return Err(BackendError::locked(&existing));
            }
            Some(existing) => {
                log::warn!(
                    "Taking over expired lock {} held by {}",
                    existing.id,
                    existing.who
                );
                self.remove_lock_file().await?;
            }
            None => {}
        }

        let lock = LockInfo::new(operation);
        self.create_lock_file(&lock).await?;
        log::debug!("Acquired state lock {} for {}", lock.id, operation);
        Ok(lock)
    }

    async fn release_lock(&self, lock: &LockInfo) -> BackendResult<()> {
        let existing = self
            .read_lock()
            .await?
            .ok_or_else(|| BackendError::LockNotFound(lock.id.clone()))?;

        if existing.id != lock.id {
            return Err(BackendError::LockMismatch {
                expected: lock.id.clone(),
                actual: existing.id,
            });
        }

        self.remove_lock_file().await
    }

    async fn force_unlock(&self, lock_id: &str) -> BackendResult<()> {
        let existing = self
            .read_lock()
            .await?
            .ok_or_else(|| BackendError::LockNotFound(lock_id.to_string()))?;

        if existing.id != lock_id {
            return Err(BackendError::LockMismatch {
                expected: lock_id.to_string(),
                actual: existing.id,
            });
        }

        self.remove_lock_file().await
    }
}
