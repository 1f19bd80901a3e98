//! Rolling per-user statistics derived from the gameplay event stream.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::LessonCategory;
use crate::events::GameEvent;

/// A completion counts as fast below this elapsed time.
pub const FAST_COMPLETION_SECS: u32 = 120;

/// Accumulated counters for one user.
///
/// All counters are monotonically non-decreasing except `consecutive_days`,
/// which resets when a calendar day is skipped. Created zeroed on first use,
/// cleared on logout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub lessons_completed: u32,
    pub stars_earned: u32,
    pub help_used: u32,
    pub perfect_runs: u32,
    pub fast_completions: u32,
    pub consecutive_days: u32,
    pub categories_touched: BTreeSet<LessonCategory>,
    pub play_dates: BTreeSet<NaiveDate>,
    pub attempts_per_lesson: BTreeMap<u32, u32>,
}

impl PlayerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event in place. Never fails; events carry no effects beyond
    /// this mutation.
    pub fn apply(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ActivityCompleted {
                lesson_id,
                category,
                stars,
                elapsed_seconds,
                used_help,
                is_perfect,
                ..
            } => {
                self.lessons_completed = self.lessons_completed.saturating_add(1);
                self.stars_earned = self.stars_earned.saturating_add(*stars);
                if *used_help {
                    self.help_used = self.help_used.saturating_add(1);
                }
                if *is_perfect {
                    self.perfect_runs = self.perfect_runs.saturating_add(1);
                }
                if *elapsed_seconds < FAST_COMPLETION_SECS {
                    self.fast_completions = self.fast_completions.saturating_add(1);
                }
                self.categories_touched.insert(*category);
                let attempts = self.attempts_per_lesson.entry(*lesson_id).or_insert(0);
                *attempts = attempts.saturating_add(1);
            }
            GameEvent::HelpUsed { .. } => {
                self.help_used = self.help_used.saturating_add(1);
            }
            GameEvent::DailyCheckIn { date, .. } => {
                self.play_dates.insert(*date);
                self.consecutive_days = self.streak_ending_at(*date);
            }
        }
    }

    /// Length of the unbroken run of play dates ending at `date`.
    ///
    /// Walks backward one calendar day at a time and stops at the first gap,
    /// so a skipped day collapses the streak to whatever run includes `date`.
    fn streak_ending_at(&self, date: NaiveDate) -> u32 {
        let mut streak = 0u32;
        let mut cursor = date;
        while self.play_dates.contains(&cursor) {
            streak += 1;
            match cursor.checked_sub_days(Days::new(1)) {
                Some(prev) => cursor = prev,
                None => break,
            }
        }
        streak
    }

    /// Clear everything back to zero (logout).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn completion(lesson_id: u32, stars: u32, elapsed: u32, perfect: bool, help: bool) -> GameEvent {
        GameEvent::ActivityCompleted {
            lesson_id,
            step_id: 1,
            category: LessonCategory::Numbers,
            stars,
            errors: if perfect { 0 } else { 2 },
            elapsed_seconds: elapsed,
            used_help: help,
            is_perfect: perfect,
            at: Utc::now(),
        }
    }

    fn check_in(y: i32, m: u32, d: u32) -> GameEvent {
        GameEvent::DailyCheckIn {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            hour: 12,
            is_weekend: false,
            at: Utc::now(),
        }
    }

    #[test]
    fn test_activity_completion_counters() {
        let mut stats = PlayerStats::new();
        stats.apply(&completion(7, 3, 45, true, false));

        assert_eq!(stats.lessons_completed, 1);
        assert_eq!(stats.stars_earned, 3);
        assert_eq!(stats.perfect_runs, 1);
        assert_eq!(stats.fast_completions, 1);
        assert_eq!(stats.help_used, 0);
        assert!(stats.categories_touched.contains(&LessonCategory::Numbers));
        assert_eq!(stats.attempts_per_lesson.get(&7), Some(&1));
    }

    #[test]
    fn test_slow_imperfect_completion() {
        let mut stats = PlayerStats::new();
        stats.apply(&completion(1, 1, 300, false, true));

        assert_eq!(stats.perfect_runs, 0);
        assert_eq!(stats.fast_completions, 0);
        assert_eq!(stats.help_used, 1);
    }

    #[test]
    fn test_fast_completion_boundary() {
        let mut stats = PlayerStats::new();
        stats.apply(&completion(1, 1, 120, false, false));
        assert_eq!(stats.fast_completions, 0);

        stats.apply(&completion(1, 1, 119, false, false));
        assert_eq!(stats.fast_completions, 1);
    }

    #[test]
    fn test_help_used_independent_channel() {
        let mut stats = PlayerStats::new();
        stats.apply(&GameEvent::HelpUsed {
            lesson_id: 1,
            step_id: 1,
            at: Utc::now(),
        });
        stats.apply(&GameEvent::HelpUsed {
            lesson_id: 1,
            step_id: 2,
            at: Utc::now(),
        });
        assert_eq!(stats.help_used, 2);
        // Help taps alone complete nothing.
        assert_eq!(stats.lessons_completed, 0);
    }

    #[test]
    fn test_attempts_accumulate_per_lesson() {
        let mut stats = PlayerStats::new();
        stats.apply(&completion(5, 1, 200, false, false));
        stats.apply(&completion(5, 2, 200, false, false));
        stats.apply(&completion(9, 3, 200, false, false));

        assert_eq!(stats.attempts_per_lesson.get(&5), Some(&2));
        assert_eq!(stats.attempts_per_lesson.get(&9), Some(&1));
    }

    #[test]
    fn test_streak_scenario_consecutive_then_gap() {
        let mut stats = PlayerStats::new();
        stats.apply(&check_in(2024, 1, 1));
        stats.apply(&check_in(2024, 1, 2));
        stats.apply(&check_in(2024, 1, 3));
        assert_eq!(stats.consecutive_days, 3);

        // Skipping 01-04 resets the streak to the new single-day run.
        stats.apply(&check_in(2024, 1, 5));
        assert_eq!(stats.consecutive_days, 1);
    }

    #[test]
    fn test_check_in_idempotent_for_same_date() {
        let mut stats = PlayerStats::new();
        stats.apply(&check_in(2024, 3, 10));
        stats.apply(&check_in(2024, 3, 10));

        assert_eq!(stats.play_dates.len(), 1);
        assert_eq!(stats.consecutive_days, 1);
    }

    #[test]
    fn test_streak_bridges_existing_dates() {
        let mut stats = PlayerStats::new();
        stats.apply(&check_in(2024, 2, 1));
        stats.apply(&check_in(2024, 2, 3));
        assert_eq!(stats.consecutive_days, 1);

        // Filling the gap joins both runs.
        stats.apply(&check_in(2024, 2, 2));
        assert_eq!(stats.consecutive_days, 2);
        stats.apply(&check_in(2024, 2, 4));
        assert_eq!(stats.consecutive_days, 4);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut stats = PlayerStats::new();
        stats.apply(&completion(1, 3, 50, true, true));
        stats.apply(&check_in(2024, 1, 1));

        stats.reset();
        assert_eq!(stats, PlayerStats::default());
    }
}
