//! Core types for remote synchronization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the engine's data currently comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// No data loaded yet.
    #[default]
    Cold,
    /// Serving from the local cache, possibly stale.
    Cached,
    /// Freshly pulled from the remote store.
    Synced,
}

/// Current sync status read model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStatus {
    pub state: SyncState,
    /// Last successful pull timestamp.
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Number of queued pushes awaiting a successful flush.
    pub pending_pushes: usize,
    /// Whether the most recent pull attempt failed.
    pub last_pull_failed: bool,
}

/// A local change waiting to be pushed to the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PushItem {
    Unlock { achievement_id: u32 },
    Progress { achievement_id: u32, progress: u32 },
}

impl PushItem {
    pub fn achievement_id(&self) -> u32 {
        match self {
            PushItem::Unlock { achievement_id } => *achievement_id,
            PushItem::Progress { achievement_id, .. } => *achievement_id,
        }
    }
}

/// Sync error types.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No authenticated user")]
    NoUser,
}
