//! Remote synchronization layer.
//!
//! Pull-based refresh against the remote achievement store, per-field
//! max/OR reconciliation with local optimistic state, and a retrying push
//! queue for locally detected unlocks and progress updates.

pub mod coordinator;
pub mod merge;
pub mod remote;
pub mod types;


pub use coordinator::SyncCoordinator;
pub use remote::{AchievementRemote, HttpRemote};
pub use types::{PushItem, SyncError, SyncState, SyncStatus};
