//! Pure merge functions for reconciling local and remote state.
//!
//! The rule throughout is per-field max/OR: unlocked wins over not-unlocked,
//! higher progress wins, counters take the max, sets and maps take the
//! union. A local optimistic unlock is therefore never downgraded by a
//! remote snapshot that hasn't caught up yet.

use std::collections::BTreeMap;

use crate::stats::PlayerStats;
use crate::store::UserProgress;

/// Merge two progress entries for the same achievement id.
pub fn merge_progress(local: &UserProgress, remote: &UserProgress) -> UserProgress {
    debug_assert_eq!(local.achievement_id, remote.achievement_id);

    let unlocked = local.unlocked || remote.unlocked;
    // Whichever side unlocked first keeps its timestamp; an entry that
    // never unlocked contributes none.
    let unlocked_at = match (
        local.unlocked.then_some(local.unlocked_at).flatten(),
        remote.unlocked.then_some(remote.unlocked_at).flatten(),
    ) {
        (Some(l), Some(r)) => Some(l.min(r)),
        (l, r) => l.or(r),
    };

    UserProgress {
        achievement_id: local.achievement_id,
        unlocked,
        progress: local.progress.max(remote.progress),
        unlocked_at,
    }
}

/// Merge local and server-authoritative stats counters.
pub fn merge_stats(local: &PlayerStats, remote: &PlayerStats) -> PlayerStats {
    let mut attempts: BTreeMap<u32, u32> = local.attempts_per_lesson.clone();
    for (lesson, count) in &remote.attempts_per_lesson {
        let entry = attempts.entry(*lesson).or_insert(0);
        *entry = (*entry).max(*count);
    }

    PlayerStats {
        lessons_completed: local.lessons_completed.max(remote.lessons_completed),
        stars_earned: local.stars_earned.max(remote.stars_earned),
        help_used: local.help_used.max(remote.help_used),
        perfect_runs: local.perfect_runs.max(remote.perfect_runs),
        fast_completions: local.fast_completions.max(remote.fast_completions),
        consecutive_days: local.consecutive_days.max(remote.consecutive_days),
        categories_touched: local
            .categories_touched
            .union(&remote.categories_touched)
            .copied()
            .collect(),
        play_dates: local.play_dates.union(&remote.play_dates).copied().collect(),
        attempts_per_lesson: attempts,
    }
}
