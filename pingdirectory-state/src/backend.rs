//! State backend trait and error types

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pingdirectory_core::resource::Value;
use thiserror::Error;

use crate::lock::LockInfo;
use crate::state::StateFile;

/// Errors raised by a state backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error(
        "State is locked by {} since {} (lock ID: {}, operation: {})",
        .0.who, .0.created, .0.id, .0.operation
    )]
    Locked(Box<LockInfo>),

    #[error("Lock not found: {0}")]
    LockNotFound(String),

    #[error("Lock ID mismatch: expected {expected}, got {actual}")]
    LockMismatch { expected: String, actual: String },

    #[error("Unsupported backend type: {0}")]
    UnsupportedBackend(String),

    #[error("Backend configuration error: {0}")]
    Configuration(String),

    /// State file is corrupted or was written by a newer format version
    #[error("Invalid state file: {0}")]
    InvalidState(String),

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Refuses to overwrite a state file that belongs to another lineage
    #[error("State lineage mismatch: expected {expected}, got {actual}")]
    LineageMismatch { expected: String, actual: String },

    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BackendError {
    pub fn locked(lock: &LockInfo) -> Self {
        Self::Locked(Box::new(lock.clone()))
    }

    pub fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn unsupported_backend(backend_type: impl Into<String>) -> Self {
        Self::UnsupportedBackend(backend_type.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Storage for the state file and its lock
#[async_trait]
pub trait StateBackend: Send + Sync {
    /// Read the current state. `None` when nothing has been written yet.
    async fn read_state(&self) -> BackendResult<Option<StateFile>>;

    /// Write the state. Callers increment the serial first.
    async fn write_state(&self, state: &StateFile) -> BackendResult<()>;

    /// Fails while another unexpired lock is held
    async fn acquire_lock(&self, operation: &str) -> BackendResult<LockInfo>;

    async fn release_lock(&self, lock: &LockInfo) -> BackendResult<()>;

    /// Remove a lock by id regardless of its owner
    async fn force_unlock(&self, lock_id: &str) -> BackendResult<()>;

    /// Prepare the storage location
    async fn init(&self) -> BackendResult<()>;
}

/// Configuration for a state backend
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Backend type, currently only "local"
    pub backend_type: String,
    pub attributes: HashMap<String, Value>,
}

impl BackendConfig {
    /// Local backend writing to `path`
    pub fn local(path: impl Into<String>) -> Self {
        let mut attributes = HashMap::new();
        attributes.insert("path".to_string(), Value::String(path.into()));
        Self {
            backend_type: "local".to_string(),
            attributes,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key) {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.attributes.get(key) {
            Some(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_error_names_the_holder() {
        let lock = LockInfo::new("apply");
        let message = BackendError::locked(&lock).to_string();

        assert!(message.contains(&lock.who));
        assert!(message.contains(&lock.id));
        assert!(message.contains("operation: apply"));
    }

    #[test]
    fn io_error_names_the_file() {
        let err = BackendError::io(
            "read",
            Path::new("pingdirectory.state.json"),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(
            err.to_string()
                .starts_with("Failed to read pingdirectory.state.json:")
        );
    }

    #[test]
    fn local_config_exposes_path() {
        let config = BackendConfig::local("dev.state.json");
        assert_eq!(config.backend_type, "local");
        assert_eq!(config.get_string("path"), Some("dev.state.json"));
        assert_eq!(config.get_bool("create_dirs"), None);
        assert!(config.get_bool_or("create_dirs", true));
    }
}
