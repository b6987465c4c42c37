//! State lock records

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Seconds before a lock may be taken over by another run
pub const DEFAULT_LOCK_TIMEOUT_SECS: i64 = 900;

/// Written to the lock file while a run modifies the state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    pub id: String,
    /// Command holding the lock: "apply", "destroy" or "import"
    pub operation: String,
    /// user@host
    pub who: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(operation: impl Into<String>) -> Self {
        Self::with_timeout(operation, Duration::seconds(DEFAULT_LOCK_TIMEOUT_SECS))
    }

    pub fn with_timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        let created = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            operation: operation.into(),
            who: current_owner(),
            created,
            expires: created + timeout,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires < Utc::now()
    }

    pub fn time_remaining(&self) -> Duration {
        (self.expires - Utc::now()).max(Duration::zero())
    }
}

fn current_owner() -> String {
    let user = ["USER", "USERNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok())
        .unwrap_or_else(|| "unknown".to_string());

    let host = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());

    format!("{}@{}", user, host)
}
