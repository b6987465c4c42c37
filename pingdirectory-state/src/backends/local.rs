//! Local file backend
//!
//! State lives in a JSON file (default `pingdirectory.state.json`); a
//! sibling `.lock` file holds the lock.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::backend::{BackendConfig, BackendError, BackendResult, StateBackend};
use crate::lock::LockInfo;
use crate::state::StateFile;

pub struct LocalBackend {
    state_path: PathBuf,
    lock_path: PathBuf,
}

impl LocalBackend {
    pub const DEFAULT_STATE_FILE: &'static str = "pingdirectory.state.json";

    pub fn new() -> Self {
        Self::with_path(PathBuf::from(Self::DEFAULT_STATE_FILE))
    }

    pub fn with_path(state_path: PathBuf) -> Self {
        let lock_path = state_path.with_extension("lock");
        Self {
            state_path,
            lock_path,
        }
    }

    pub fn from_config(config: &BackendConfig) -> BackendResult<Self> {
        match config.attributes.get("path") {
            None => Ok(Self::new()),
            Some(_) => config
                .get_string("path")
                .filter(|p| !p.is_empty())
                .map(|p| Self::with_path(PathBuf::from(p)))
                .ok_or_else(|| BackendError::configuration("path must be a non-empty string")),
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    async fn read_lock(&self) -> BackendResult<Option<LockInfo>> {
        match tokio::fs::read_to_string(&self.lock_path).await {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|source| BackendError::Parse {
                    path: self.lock_path.clone(),
                    source,
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::io("read", &self.lock_path, e)),
        }
    }

    async fn remove_lock(&self) -> BackendResult<()> {
        tokio::fs::remove_file(&self.lock_path)
            .await
            .map_err(|e| BackendError::io("remove", &self.lock_path, e))
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateBackend for LocalBackend {
    async fn read_state(&self) -> BackendResult<Option<StateFile>> {
        let content = match tokio::fs::read_to_string(&self.state_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BackendError::io("read", &self.state_path, e)),
        };

        let state: StateFile =
            serde_json::from_str(&content).map_err(|source| BackendError::Parse {
                path: self.state_path.clone(),
                source,
            })?;

        if state.version > StateFile::CURRENT_VERSION {
            return Err(BackendError::InvalidState(format!(
                "state file version {} is newer than supported version {}",
                state.version,
                StateFile::CURRENT_VERSION
            )));
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

        let content = serde_json::to_string_pretty(state)?;

        let tmp_path = self.state_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(|e| BackendError::io("write", &tmp_path, e))?;
        tokio::fs::rename(&tmp_path, &self.state_path)
            .await
            .map_err(|e| BackendError::io("replace", &self.state_path, e))?;

        log::debug!(
            "wrote state serial {} to {}",
            state.serial,
            self.state_path.display()
        );
        Ok(())
    }

    async fn acquire_lock(&self, operation: &str) -> BackendResult<LockInfo> {
        match self.read_lock().await {
            Ok(Some(existing)) if !existing.is_expired() => {
                return Err(BackendError::locked(&existing));
            }
            Ok(Some(existing)) => {
                log::warn!(
                    "taking over expired lock {} held by {}",
                    existing.id,
                    existing.who
                );
            }
            Ok(None) => {}
            // An unreadable lock file is replaced
            Err(BackendError::Parse { .. }) => {}
            Err(e) => return Err(e),
        }

        let lock = LockInfo::new(operation);
        let content = serde_json::to_string_pretty(&lock)?;
        tokio::fs::write(&self.lock_path, content)
            .await
            .map_err(|e| BackendError::io("write", &self.lock_path, e))?;

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

        self.remove_lock().await
    }

    async fn force_unlock(&self, lock_id: &str) -> BackendResult<()> {
        match self.read_lock().await {
            Ok(None) => return Err(BackendError::LockNotFound(lock_id.to_string())),
            Ok(Some(existing)) if existing.id != lock_id => {
                return Err(BackendError::LockMismatch {
                    expected: lock_id.to_string(),
                    actual: existing.id,
                });
            }
            Ok(Some(_)) | Err(BackendError::Parse { .. }) => {}
            Err(e) => return Err(e),
        }

        self.remove_lock().await
    }

    async fn init(&self) -> BackendResult<()> {
        if let Some(parent) = self.state_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BackendError::io("create", parent, e))?;
        }
        Ok(())
    }
}
