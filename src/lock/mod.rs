//! Two-tier locking for recordfs
//!
//! - `ProcessLock`: exclusive advisory lock on `<root>/mutex`, shared by all
//!   cooperating processes, reentrant for its owner
//! - `LocalLock`: in-memory reader/writer lock for the threads of one process
//! - `LockCoordinator`: takes the tiers in a fixed order per operation kind and
//!   hands back an `OperationGuard` that releases them on drop
//!
//! Writes take both tiers. Reads take only the local tier, so a reader may
//! observe a record file that another process is still writing.

mod coordinator;
mod local;
mod process;

pub use coordinator::{LockCoordinator, OperationGuard};
pub use local::LocalLock;
pub use process::ProcessLock;
