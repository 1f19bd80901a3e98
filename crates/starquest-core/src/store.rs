//! Achievement state store: the authoritative merged view of definitions,
//! per-user progress, and rolling stats for the active user.
//!
//! Owns the [`CacheSnapshot`] persisted through the key/value boundary. The
//! sync coordinator borrows the store during a pull to reconcile remote
//! snapshots but never holds it beyond that pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{AchievementCategory, AchievementDef};
use crate::identity::UserId;
use crate::stats::PlayerStats;
use crate::storage::KeyValueStore;
use crate::sync::merge;

/// Per-user progress toward one achievement.
///
/// `unlocked` is monotonic false-to-true and never reverts. `progress` is
/// non-decreasing while locked and frozen at the target once unlocked.
/// `unlocked_at` is set exactly once, on the unlock transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub achievement_id: u32,
    pub unlocked: bool,
    pub progress: u32,
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl UserProgress {
    pub fn zero(achievement_id: u32) -> Self {
        Self {
            achievement_id,
            unlocked: false,
            progress: 0,
            unlocked_at: None,
        }
    }
}

/// One evaluation outcome handed to [`ProgressStore::apply_results`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalResult {
    pub achievement_id: u32,
    pub progress: u32,
    pub unlocked: bool,
}

/// Merged (definition, progress) view for display callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementView {
    pub def: AchievementDef,
    pub unlocked: bool,
    pub progress: u32,
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Aggregate read model for the profile screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub total: usize,
    pub unlocked: usize,
    pub points_earned: u32,
    pub unlock_percentage: f32,
    pub unlocked_by_category: BTreeMap<AchievementCategory, usize>,
}

/// The serialized bundle persisted per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub user_id: UserId,
    /// Catalog ids seen by this client; definitions themselves are not
    /// cached (the built-in table covers offline, a pull refreshes them).
    pub achievement_ids: Vec<u32>,
    pub progress: Vec<UserProgress>,
    pub stats: PlayerStats,
    pub last_sync_at: Option<DateTime<Utc>>,
}

fn cache_key(user: UserId) -> String {
    format!("starquest/snapshot/{user}")
}

/// Authoritative in-memory state for one user.
pub struct ProgressStore {
    user_id: UserId,
    defs: Vec<AchievementDef>,
    progress: BTreeMap<u32, UserProgress>,
    stats: PlayerStats,
    last_sync_at: Option<DateTime<Utc>>,
}

impl ProgressStore {
    /// Fresh store seeded with zero progress for every catalog entry.
    pub fn new(user_id: UserId, defs: Vec<AchievementDef>) -> Self {
        let progress = defs
            .iter()
            .map(|d| (d.id, UserProgress::zero(d.id)))
            .collect();
        Self {
            user_id,
            defs,
            progress,
            stats: PlayerStats::new(),
            last_sync_at: None,
        }
    }

    /// Load the cached snapshot for `user`, falling back to an empty store.
    ///
    /// Never fails: a missing, corrupt, or foreign-user blob yields a fresh
    /// store (corruption is logged). The second element reports whether a
    /// usable snapshot was found.
    pub async fn load_from_cache(
        kv: &dyn KeyValueStore,
        user: UserId,
        defs: Vec<AchievementDef>,
    ) -> (Self, bool) {
        let mut store = Self::new(user, defs);

        let blob = match kv.get(&cache_key(user)).await {
            Ok(Some(blob)) => blob,
            Ok(None) => return (store, false),
            Err(e) => {
                log::warn!("failed to read cached snapshot for user {user}: {e}");
                return (store, false);
            }
        };

        let snapshot: CacheSnapshot = match serde_json::from_str(&blob) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("discarding corrupt snapshot for user {user}: {e}");
                return (store, false);
            }
        };
        if snapshot.user_id != user {
            log::warn!(
                "cached snapshot belongs to user {}, expected {user}; ignoring",
                snapshot.user_id
            );
            return (store, false);
        }

        for entry in snapshot.progress {
            store.progress.insert(entry.achievement_id, entry);
        }
        store.stats = snapshot.stats;
        store.last_sync_at = snapshot.last_sync_at;
        (store, true)
    }

    /// Persist the current snapshot. Best-effort: failures are logged only.
    pub async fn save_to_cache(&self, kv: &dyn KeyValueStore) {
        let snapshot = self.snapshot();
        let blob = match serde_json::to_string(&snapshot) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("failed to serialize snapshot for user {}: {e}", self.user_id);
                return;
            }
        };
        if let Err(e) = kv.set(&cache_key(self.user_id), &blob).await {
            log::warn!("failed to persist snapshot for user {}: {e}", self.user_id);
        }
    }

    /// Remove the persisted snapshot for `user` (logout).
    pub async fn clear_cache(kv: &dyn KeyValueStore, user: UserId) {
        if let Err(e) = kv.remove(&cache_key(user)).await {
            log::warn!("failed to clear snapshot for user {user}: {e}");
        }
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            user_id: self.user_id,
            achievement_ids: self.defs.iter().map(|d| d.id).collect(),
            progress: self.progress.values().cloned().collect(),
            stats: self.stats.clone(),
            last_sync_at: self.last_sync_at,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn defs(&self) -> &[AchievementDef] {
        &self.defs
    }

    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut PlayerStats {
        &mut self.stats
    }

    pub fn progress_of(&self, achievement_id: u32) -> Option<&UserProgress> {
        self.progress.get(&achievement_id)
    }

    pub fn last_sync_at(&self) -> Option<DateTime<Utc>> {
        self.last_sync_at
    }

    /// Whether this store has never seen a successful remote pull.
    pub fn never_synced(&self) -> bool {
        self.last_sync_at.is_none()
    }

    /// Fold evaluation results into the store, returning the achievements
    /// that unlocked in this pass, in the order the results were given (the
    /// dispatcher evaluates in catalog order).
    ///
    /// Already-unlocked entries are never modified, so re-running the same
    /// results is idempotent and an unlock can be reported at most once.
    pub fn apply_results(
        &mut self,
        results: &[EvalResult],
        now: DateTime<Utc>,
    ) -> Vec<AchievementDef> {
        let mut newly_unlocked = Vec::new();

        for result in results {
            let Some(def) = self.defs.iter().find(|d| d.id == result.achievement_id) else {
                continue;
            };
            let target = def.target;
            let entry = self
                .progress
                .entry(result.achievement_id)
                .or_insert_with(|| UserProgress::zero(result.achievement_id));

            if entry.unlocked {
                continue;
            }
            if result.unlocked {
                entry.unlocked = true;
                entry.progress = target;
                entry.unlocked_at = Some(now);
                newly_unlocked.push(def.clone());
            } else if result.progress > entry.progress {
                entry.progress = result.progress;
            }
        }

        newly_unlocked
    }

    /// The merged (definition, progress) view, in catalog order.
    pub fn all(&self) -> Vec<AchievementView> {
        self.defs
            .iter()
            .map(|def| {
                let p = self.progress.get(&def.id);
                AchievementView {
                    def: def.clone(),
                    unlocked: p.map_or(false, |p| p.unlocked),
                    progress: p.map_or(0, |p| p.progress),
                    unlocked_at: p.and_then(|p| p.unlocked_at),
                }
            })
            .collect()
    }

    pub fn summary(&self) -> ProgressSummary {
        let views = self.all();
        let total = views.len();
        let unlocked: Vec<_> = views.iter().filter(|v| v.unlocked).collect();
        let points_earned = unlocked.iter().map(|v| v.def.points).sum();
        let mut by_category = BTreeMap::new();
        for view in &unlocked {
            *by_category.entry(view.def.category).or_insert(0) += 1;
        }
        ProgressSummary {
            total,
            unlocked: unlocked.len(),
            points_earned,
            unlock_percentage: if total == 0 {
                0.0
            } else {
                unlocked.len() as f32 * 100.0 / total as f32
            },
            unlocked_by_category: by_category,
        }
    }

    /// Apply a successful remote pull.
    ///
    /// Definitions replace the local table wholesale (they are immutable
    /// from the client's perspective); progress and stats merge per-field by
    /// max/OR so a local optimistic unlock is never downgraded by a remote
    /// snapshot that hasn't caught up yet.
    pub fn reconcile(
        &mut self,
        remote_defs: Vec<AchievementDef>,
        remote_progress: Vec<UserProgress>,
        remote_stats: PlayerStats,
        now: DateTime<Utc>,
    ) {
        if !remote_defs.is_empty() {
            self.defs = remote_defs;
        }
        for def in &self.defs {
            self.progress
                .entry(def.id)
                .or_insert_with(|| UserProgress::zero(def.id));
        }

        for remote in remote_progress {
            let merged = match self.progress.get(&remote.achievement_id) {
                Some(local) => merge::merge_progress(local, &remote),
                None => remote.clone(),
            };
            self.progress.insert(merged.achievement_id, merged);
        }

        self.stats = merge::merge_stats(&self.stats, &remote_stats);
        self.last_sync_at = Some(now);
    }
}
