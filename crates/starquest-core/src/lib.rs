//! # Starquest Core Library
//!
//! Client-side gamification engine for the Starquest learning app. It turns
//! gameplay events into rolling per-user statistics, evaluates a catalog of
//! achievement conditions against them, unlocks achievements exactly once,
//! and reconciles the locally computed state with the remote store while
//! staying fully usable offline.
//!
//! ## Architecture
//!
//! - **Dispatcher**: [`AchievementEngine`], the facade gameplay code calls;
//!   serializes all mutating passes for the active user
//! - **Stats**: [`PlayerStats`] accumulator fed by [`GameEvent`]s
//! - **Evaluator**: pure condition-matching over the closed
//!   [`ConditionKind`] enum
//! - **Store**: [`ProgressStore`], the authoritative merged view, cached
//!   locally as one snapshot per user
//! - **Sync**: pull-based refresh with per-field max/OR merge and a
//!   retrying push queue
//! - **Notifications**: a paced FIFO of unlock banners
//!
//! Nothing in this crate ever blocks or fails a gameplay action: the
//! worst-case failure mode is achievements being under-reported until
//! connectivity returns.

pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod evaluator;
pub mod events;
pub mod identity;
pub mod notify;
pub mod stats;
pub mod storage;
pub mod store;
pub mod sync;

pub use catalog::{
    builtin_catalog, AchievementCategory, AchievementDef, ConditionKind, Language, LessonCategory,
    LocalizedText, Rarity,
};
pub use config::EngineConfig;
pub use dispatcher::AchievementEngine;
pub use error::{CacheError, ConfigError, EngineError, Result};
pub use events::{ActivityCompletion, GameEvent};
pub use identity::{IdentityProvider, StaticIdentity, UserId};
pub use notify::{NotificationQueue, UnlockNotice};
pub use stats::PlayerStats;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use store::{AchievementView, CacheSnapshot, ProgressStore, ProgressSummary, UserProgress};
pub use sync::{AchievementRemote, HttpRemote, SyncError, SyncState, SyncStatus};
