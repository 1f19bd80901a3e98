//! Sync coordination: when to pull, how to apply it, and the push queue.
//!
//! The coordinator moves through `Cold -> Cached -> Synced` and owns the
//! queue of local changes awaiting a push. Pull and push failures are
//! swallowed here (flagged or retried later); normal operation never
//! surfaces them.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::identity::{IdentityProvider, UserId};
use crate::store::ProgressStore;
use crate::sync::remote::AchievementRemote;
use crate::sync::types::{PushItem, SyncState, SyncStatus};

pub struct SyncCoordinator {
    remote: Arc<dyn AchievementRemote>,
    min_refresh_interval: Duration,
    state: SyncState,
    last_pull_at: Option<DateTime<Utc>>,
    last_pull_failed: bool,
    /// Pending pushes keyed by achievement id; an unlock supersedes any
    /// queued progress update for the same achievement.
    pending: BTreeMap<u32, PushItem>,
}

impl SyncCoordinator {
    pub fn new(remote: Arc<dyn AchievementRemote>, min_refresh_interval_secs: u64) -> Self {
        Self {
            remote,
            min_refresh_interval: Duration::seconds(min_refresh_interval_secs as i64),
            state: SyncState::Cold,
            last_pull_at: None,
            last_pull_failed: false,
            pending: BTreeMap::new(),
        }
    }

    /// Record that a local cache snapshot is now backing the store.
    pub fn mark_cached(&mut self) {
        if self.state == SyncState::Cold {
            self.state = SyncState::Cached;
        }
    }

    /// Seed the refresh gate from a cached snapshot's last-sync timestamp,
    /// so a restart doesn't bypass the minimum refresh interval.
    pub fn restore_last_pull(&mut self, at: Option<DateTime<Utc>>) {
        self.last_pull_at = at;
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            state: self.state,
            last_sync_at: self.last_pull_at,
            pending_pushes: self.pending.len(),
            last_pull_failed: self.last_pull_failed,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether a pull should run now: forced, never synced, or the minimum
    /// refresh interval has elapsed.
    pub fn should_pull(&self, store: &ProgressStore, force: bool, now: DateTime<Utc>) -> bool {
        if force || store.never_synced() {
            return true;
        }
        match self.last_pull_at {
            None => true,
            Some(last) => now - last >= self.min_refresh_interval,
        }
    }

    /// Pull catalog, progress, and stats, and reconcile into the store.
    ///
    /// The pull is all-or-nothing: a failure in any fetch leaves the store
    /// and state untouched and only sets the failure flag. Before applying,
    /// the active user is re-checked so a late-arriving response for a
    /// logged-out or switched user is discarded.
    pub async fn pull(
        &mut self,
        store: &mut ProgressStore,
        identity: &dyn IdentityProvider,
        now: DateTime<Utc>,
    ) -> bool {
        let user = store.user_id();

        let fetched = async {
            let defs = self.remote.fetch_catalog().await?;
            let progress = self.remote.fetch_user_progress(user).await?;
            let stats = self.remote.fetch_user_stats(user).await?;
            Ok::<_, crate::sync::SyncError>((defs, progress, stats))
        }
        .await;

        let (defs, progress, stats) = match fetched {
            Ok(parts) => parts,
            Err(e) => {
                log::debug!("remote pull failed for user {user}: {e}");
                self.last_pull_failed = true;
                return false;
            }
        };

        if identity.current_user_id() != Some(user) {
            log::warn!("discarding pull result: user {user} is no longer active");
            return false;
        }

        store.reconcile(defs, progress, stats, now);
        self.state = SyncState::Synced;
        self.last_pull_at = Some(now);
        self.last_pull_failed = false;
        true
    }

    /// Queue an unlock push. Replaces any queued progress update for the
    /// same achievement.
    pub fn enqueue_unlock(&mut self, achievement_id: u32) {
        self.pending
            .insert(achievement_id, PushItem::Unlock { achievement_id });
    }

    /// Queue a progress push. Never replaces a queued unlock; the newest
    /// progress value wins otherwise.
    pub fn enqueue_progress(&mut self, achievement_id: u32, progress: u32) {
        match self.pending.get(&achievement_id) {
            Some(PushItem::Unlock { .. }) => {}
            _ => {
                self.pending.insert(
                    achievement_id,
                    PushItem::Progress {
                        achievement_id,
                        progress,
                    },
                );
            }
        }
    }

    /// Best-effort flush of the push queue. Items that fail stay queued for
    /// the next flush; local state is never rolled back.
    pub async fn flush_pushes(&mut self, user: UserId) {
        let items: Vec<PushItem> = self.pending.values().copied().collect();
        for item in items {
            let result = match item {
                PushItem::Unlock { achievement_id } => {
                    self.remote.push_unlock(user, achievement_id).await
                }
                PushItem::Progress {
                    achievement_id,
                    progress,
                } => self.remote.push_progress(user, achievement_id, progress).await,
            };
            match result {
                Ok(()) => {
                    self.pending.remove(&item.achievement_id());
                }
                Err(e) => {
                    log::debug!(
                        "push for achievement {} failed, keeping queued: {e}",
                        item.achievement_id()
                    );
                }
            }
        }
    }
}
