//! PingDirectory State Management
//!
//! Persists the state of managed configuration objects between runs.
//!
//! - **StateFile**: serial, lineage and one entry per managed resource
//! - **StateBackend**: storage trait, implemented by the local JSON backend
//! - **LockInfo**: lock held while a run modifies state
//!
//! # Example
//!
//! ```ignore
//! use pingdirectory_state::{create_backend, BackendConfig};
//!
//! let backend = create_backend(&BackendConfig::local("pingdirectory.state.json")).await?;
//! let lock = backend.acquire_lock("apply").await?;
//! let mut state = backend.read_state().await?.unwrap_or_default();
//!
//! // ... apply changes ...
//!
//! state.increment_serial();
//! backend.write_state(&state).await?;
//! backend.release_lock(&lock).await?;
//! ```

pub mod backend;
pub mod backends;
pub mod lock;
pub mod state;

pub use backend::{BackendConfig, BackendError, BackendResult, StateBackend};
pub use backends::{LocalBackend, create_backend};
pub use lock::LockInfo;
pub use state::{ResourceState, StateFile};
