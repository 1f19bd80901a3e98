//! The engine facade gameplay code talks to.
//!
//! [`AchievementEngine`] owns the collaborators (remote store, key/value
//! cache, identity provider) and a lazily created per-user session. Every
//! mutating pass runs under one async mutex, so two in-flight record calls
//! cannot interleave their read-modify-write of stats. Entry points never
//! fail toward gameplay: with no authenticated user they return empty
//! results, and cache or network trouble degrades to local state.

use chrono::{DateTime, Local, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::catalog::{builtin_catalog, AchievementDef};
use crate::config::EngineConfig;
use crate::evaluator;
use crate::events::{ActivityCompletion, GameEvent};
use crate::identity::{IdentityProvider, UserId};
use crate::notify::{NotificationQueue, UnlockNotice};
use crate::storage::KeyValueStore;
use crate::store::{AchievementView, EvalResult, ProgressStore, ProgressSummary};
use crate::sync::{AchievementRemote, SyncCoordinator, SyncStatus};

/// Per-user engine state, built at first use and torn down at logout.
struct ActiveSession {
    user: UserId,
    store: ProgressStore,
    coordinator: SyncCoordinator,
    notifications: NotificationQueue,
}

pub struct AchievementEngine {
    remote: Arc<dyn AchievementRemote>,
    kv: Arc<dyn KeyValueStore>,
    identity: Arc<dyn IdentityProvider>,
    config: EngineConfig,
    catalog: Vec<AchievementDef>,
    session: Mutex<Option<ActiveSession>>,
}

impl AchievementEngine {
    pub fn new(
        remote: Arc<dyn AchievementRemote>,
        kv: Arc<dyn KeyValueStore>,
        identity: Arc<dyn IdentityProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            remote,
            kv,
            identity,
            config,
            catalog: builtin_catalog(),
            session: Mutex::new(None),
        }
    }

    /// Record a finished activity. Returns achievements newly unlocked by
    /// this pass, in catalog order; empty when nobody is logged in.
    pub async fn record_activity_completion(
        &self,
        completion: ActivityCompletion,
    ) -> Vec<AchievementDef> {
        self.record_event(completion.into()).await
    }

    /// Record a help/hint tap that is its own action (not part of a
    /// completion report).
    pub async fn record_help_used(&self, lesson_id: u32, step_id: u32) -> Vec<AchievementDef> {
        self.record_event(GameEvent::HelpUsed {
            lesson_id,
            step_id,
            at: Utc::now(),
        })
        .await
    }

    /// Record the daily check-in for `local` time. Idempotent for a date
    /// already recorded; this is the only event the time-of-day and weekend
    /// conditions react to.
    pub async fn record_daily_check_in(&self, local: DateTime<Local>) -> Vec<AchievementDef> {
        self.record_event(GameEvent::daily_check_in(local)).await
    }

    /// Load cached state and pull from the remote if the refresh gate
    /// allows. Pull failure is reported only through the returned status.
    pub async fn initialize(&self) -> SyncStatus {
        let mut guard = self.session.lock().await;
        let Some(session) = self.ensure_session(&mut guard).await else {
            return SyncStatus::default();
        };
        Self::refresh(session, &*self.identity, &*self.kv, false).await;
        session.coordinator.status()
    }

    /// Pull now regardless of the refresh interval, then retry any queued
    /// pushes.
    pub async fn force_refresh(&self) -> SyncStatus {
        let mut guard = self.session.lock().await;
        let Some(session) = self.ensure_session(&mut guard).await else {
            return SyncStatus::default();
        };
        Self::refresh(session, &*self.identity, &*self.kv, true).await;
        session.coordinator.status()
    }

    /// The merged (definition, progress) view, in catalog order.
    pub async fn achievements_with_progress(&self) -> Vec<AchievementView> {
        let mut guard = self.session.lock().await;
        match self.ensure_session(&mut guard).await {
            Some(session) => session.store.all(),
            None => Vec::new(),
        }
    }

    pub async fn summary(&self) -> ProgressSummary {
        let mut guard = self.session.lock().await;
        match self.ensure_session(&mut guard).await {
            Some(session) => session.store.summary(),
            None => ProgressSummary::default(),
        }
    }

    pub async fn sync_status(&self) -> SyncStatus {
        let guard = self.session.lock().await;
        guard
            .as_ref()
            .map(|s| s.coordinator.status())
            .unwrap_or_default()
    }

    /// Next unlock banner to display, honoring the pacing gates.
    pub async fn next_notification(&self) -> Option<UnlockNotice> {
        let mut guard = self.session.lock().await;
        guard
            .as_mut()
            .and_then(|s| s.notifications.poll_next(Utc::now()))
    }

    /// Acknowledge that the visible banner was dismissed.
    pub async fn notification_dismissed(&self) {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.as_mut() {
            session.notifications.dismiss(Utc::now());
        }
    }

    /// Tear down the active session: in-memory state, the cached snapshot,
    /// and any queued notifications. In-flight remote calls for the old
    /// user are discarded by the user-id check when they land.
    pub async fn logout(&self) {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.take() {
            ProgressStore::clear_cache(&*self.kv, session.user).await;
        }
    }

    /// One full evaluation pass: mutate stats, evaluate the catalog, apply
    /// the results, persist, push, notify.
    async fn record_event(&self, event: GameEvent) -> Vec<AchievementDef> {
        let mut guard = self.session.lock().await;
        let Some(session) = self.ensure_session(&mut guard).await else {
            return Vec::new();
        };

        session.store.stats_mut().apply(&event);

        let defs: Vec<AchievementDef> = session.store.defs().to_vec();
        let mut results = Vec::with_capacity(defs.len());
        let mut prior = Vec::with_capacity(defs.len());
        for def in &defs {
            let entry = session.store.progress_of(def.id);
            let current = entry.map_or(0, |p| p.progress);
            prior.push((def.id, current, entry.map_or(false, |p| p.unlocked)));
            let eval = evaluator::evaluate(
                &def.condition,
                session.store.stats(),
                def.target,
                current,
                Some(&event),
                &self.config.time_bands,
            );
            results.push(EvalResult {
                achievement_id: def.id,
                progress: eval.progress,
                unlocked: eval.unlocked,
            });
        }

        let newly_unlocked = session.store.apply_results(&results, Utc::now());
        session.store.save_to_cache(&*self.kv).await;

        for def in &newly_unlocked {
            session.coordinator.enqueue_unlock(def.id);
        }
        for ((id, old_progress, was_unlocked), result) in prior.iter().zip(&results) {
            if *was_unlocked || result.unlocked {
                continue;
            }
            let stored = session.store.progress_of(*id).map_or(0, |p| p.progress);
            if stored > *old_progress {
                session.coordinator.enqueue_progress(*id, stored);
            }
        }
        session.coordinator.flush_pushes(session.user).await;

        let lang = self.config.language;
        session.notifications.enqueue(
            newly_unlocked
                .iter()
                .map(|def| UnlockNotice::from_def(def, lang))
                .collect(),
        );

        newly_unlocked
    }

    /// Gated pull plus push retry, persisting on success.
    async fn refresh(
        session: &mut ActiveSession,
        identity: &dyn IdentityProvider,
        kv: &dyn KeyValueStore,
        force: bool,
    ) {
        let now = Utc::now();
        if session.coordinator.should_pull(&session.store, force, now)
            && session
                .coordinator
                .pull(&mut session.store, identity, now)
                .await
        {
            session.store.save_to_cache(kv).await;
        }
        session.coordinator.flush_pushes(session.user).await;
    }

    /// Lazy, idempotent session setup for the current user. Returns `None`
    /// when nobody is logged in; a switched user replaces the old session.
    async fn ensure_session<'a>(
        &self,
        guard: &'a mut Option<ActiveSession>,
    ) -> Option<&'a mut ActiveSession> {
        let user = self.identity.current_user_id()?;

        let rebuild = match guard.as_ref() {
            Some(session) => session.user != user,
            None => true,
        };
        if rebuild {
            let (store, found) =
                ProgressStore::load_from_cache(&*self.kv, user, self.catalog.clone()).await;
            let mut coordinator = SyncCoordinator::new(
                self.remote.clone(),
                self.config.sync.min_refresh_interval_secs,
            );
            if found {
                coordinator.mark_cached();
                coordinator.restore_last_pull(store.last_sync_at());
            }
            let mut session = ActiveSession {
                user,
                store,
                coordinator,
                notifications: NotificationQueue::new(&self.config.notifications),
            };

            let now = Utc::now();
            if session.coordinator.should_pull(&session.store, false, now)
                && session
                    .coordinator
                    .pull(&mut session.store, &*self.identity, now)
                    .await
            {
                session.store.save_to_cache(&*self.kv).await;
            }

            *guard = Some(session);
        }
        guard.as_mut()
    }
}
