//! userpool state management
//!
//! Records which resources were created and under which identifier, so a
//! later run can read them back and plan against them.
//!
//! - **StateFile**: serial, lineage and the recorded resources
//! - **StateBackend**: storage for the state file plus a lock
//! - **LockInfo**: who holds the lock and until when
//!
//! ```ignore
//! let backend = LocalBackend::with_path("userpool.state.json");
//! let lock = backend.acquire_lock("apply").await?;
//! let mut state = backend.read_state().await?.unwrap_or_default();
//! // ... apply changes, state.record(&observed) ...
//! state.increment_serial();
//! backend.write_state(&state).await?;
//! backend.release_lock(&lock).await?;
//! ```

pub mod backend;
pub mod backends;
pub mod lock;
pub mod state;

pub use backend::{BackendError, BackendResult, StateBackend};
pub use backends::LocalBackend;
pub use lock::LockInfo;
pub use state::{ResourceState, StateFile};
