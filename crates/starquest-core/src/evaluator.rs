//! Pure condition evaluation.
//!
//! `evaluate` is a total function over the closed [`ConditionKind`] enum:
//! deterministic given its inputs, no state of its own. The dispatcher runs
//! it once per catalog entry on every pass.

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::catalog::{ConditionKind, LessonCategory};
use crate::config::TimeBandsConfig;
use crate::events::GameEvent;
use crate::stats::PlayerStats;

/// Result of evaluating one condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub progress: u32,
    pub unlocked: bool,
}

/// Evaluate one condition against the current stats.
///
/// Stat-gated kinds ignore `event`; the time-of-day and weekend kinds are
/// event-gated and inspect only `DailyCheckIn` events, reporting `current`
/// unchanged for anything else. Progress is clamped to `[0, target]` and
/// `unlocked == (progress >= target)` always holds in the returned value.
pub fn evaluate(
    condition: &ConditionKind,
    stats: &PlayerStats,
    target: u32,
    current: u32,
    event: Option<&GameEvent>,
    bands: &TimeBandsConfig,
) -> Evaluation {
    let progress = match condition {
        ConditionKind::FirstActivity => satisfied(stats.lessons_completed >= 1, target),
        ConditionKind::ActivitiesCount => stats.lessons_completed,
        ConditionKind::StarsCount => stats.stars_earned,
        ConditionKind::PerfectRun => satisfied(stats.perfect_runs >= 1, target),
        ConditionKind::FastCompletion => satisfied(stats.fast_completions >= 1, target),
        ConditionKind::ConsecutiveDays => stats.consecutive_days,
        ConditionKind::HelpUsedCount => stats.help_used,
        ConditionKind::AllCategories => satisfied(
            LessonCategory::ALL
                .iter()
                .all(|c| stats.categories_touched.contains(c)),
            target,
        ),
        ConditionKind::ExactAttempts { attempts } => satisfied(
            stats.attempts_per_lesson.values().any(|&n| n == *attempts),
            target,
        ),
        ConditionKind::FullWeekPlay => {
            satisfied(has_consecutive_run(&stats.play_dates, 7), target)
        }
        ConditionKind::MorningPlay => match event {
            Some(GameEvent::DailyCheckIn { hour, .. }) => {
                satisfied_or(bands.is_morning(*hour), target, current)
            }
            _ => current,
        },
        ConditionKind::EveningPlay => match event {
            Some(GameEvent::DailyCheckIn { hour, .. }) => {
                satisfied_or(bands.is_evening(*hour), target, current)
            }
            _ => current,
        },
        ConditionKind::WeekendPlay => match event {
            Some(GameEvent::DailyCheckIn { is_weekend, .. }) => {
                satisfied_or(*is_weekend, target, current)
            }
            _ => current,
        },
        ConditionKind::Unknown => {
            log::warn!("skipping unknown condition kind (target {target})");
            return Evaluation {
                progress: current,
                unlocked: false,
            };
        }
    };

    let progress = progress.min(target);
    Evaluation {
        progress,
        unlocked: progress >= target,
    }
}

fn satisfied(met: bool, target: u32) -> u32 {
    if met {
        target
    } else {
        0
    }
}

fn satisfied_or(met: bool, target: u32, current: u32) -> u32 {
    if met {
        target
    } else {
        current
    }
}

/// Whether `dates` contains a run of `len` consecutive calendar days.
fn has_consecutive_run(dates: &BTreeSet<NaiveDate>, len: u32) -> bool {
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for &date in dates {
        run = match prev {
            Some(p) if p.succ_opt() == Some(date) => run + 1,
            _ => 1,
        };
        if run >= len {
            return true;
        }
        prev = Some(date);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bands() -> TimeBandsConfig {
        TimeBandsConfig::default()
    }

    fn check_in(hour: u32, is_weekend: bool) -> GameEvent {
        GameEvent::DailyCheckIn {
            date: NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
            hour,
            is_weekend,
            at: Utc::now(),
        }
    }

    fn dates(days: &[(i32, u32, u32)]) -> BTreeSet<NaiveDate> {
        days.iter()
            .map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
            .collect()
    }

    #[test]
    fn test_first_activity() {
        let mut stats = PlayerStats::new();
        let eval = evaluate(&ConditionKind::FirstActivity, &stats, 1, 0, None, &bands());
        assert_eq!(eval, Evaluation { progress: 0, unlocked: false });

        stats.lessons_completed = 1;
        let eval = evaluate(&ConditionKind::FirstActivity, &stats, 1, 0, None, &bands());
        assert_eq!(eval, Evaluation { progress: 1, unlocked: true });
    }

    #[test]
    fn test_counting_kinds_clamp_to_target() {
        let mut stats = PlayerStats::new();
        stats.lessons_completed = 7;
        stats.stars_earned = 120;
        stats.help_used = 3;

        let eval = evaluate(&ConditionKind::ActivitiesCount, &stats, 10, 0, None, &bands());
        assert_eq!(eval, Evaluation { progress: 7, unlocked: false });

        let eval = evaluate(&ConditionKind::StarsCount, &stats, 100, 0, None, &bands());
        assert_eq!(eval, Evaluation { progress: 100, unlocked: true });

        let eval = evaluate(&ConditionKind::HelpUsedCount, &stats, 5, 0, None, &bands());
        assert_eq!(eval, Evaluation { progress: 3, unlocked: false });
    }

    #[test]
    fn test_perfect_and_fast() {
        let mut stats = PlayerStats::new();
        stats.perfect_runs = 2;
        let eval = evaluate(&ConditionKind::PerfectRun, &stats, 1, 0, None, &bands());
        assert!(eval.unlocked);

        let eval = evaluate(&ConditionKind::FastCompletion, &stats, 1, 0, None, &bands());
        assert!(!eval.unlocked);
        assert_eq!(eval.progress, 0);
    }

    #[test]
    fn test_consecutive_days() {
        let mut stats = PlayerStats::new();
        stats.consecutive_days = 4;
        let eval = evaluate(&ConditionKind::ConsecutiveDays, &stats, 7, 0, None, &bands());
        assert_eq!(eval, Evaluation { progress: 4, unlocked: false });

        stats.consecutive_days = 9;
        let eval = evaluate(&ConditionKind::ConsecutiveDays, &stats, 7, 0, None, &bands());
        assert_eq!(eval, Evaluation { progress: 7, unlocked: true });
    }

    #[test]
    fn test_all_categories() {
        let mut stats = PlayerStats::new();
        for cat in LessonCategory::ALL.iter().take(5) {
            stats.categories_touched.insert(*cat);
        }
        let eval = evaluate(&ConditionKind::AllCategories, &stats, 1, 0, None, &bands());
        assert!(!eval.unlocked);

        stats.categories_touched.insert(LessonCategory::ALL[5]);
        let eval = evaluate(&ConditionKind::AllCategories, &stats, 1, 0, None, &bands());
        assert!(eval.unlocked);
    }

    #[test]
    fn test_exact_attempts() {
        let kind = ConditionKind::ExactAttempts { attempts: 3 };
        let mut stats = PlayerStats::new();
        stats.attempts_per_lesson.insert(4, 2);
        assert!(!evaluate(&kind, &stats, 1, 0, None, &bands()).unlocked);

        stats.attempts_per_lesson.insert(4, 3);
        assert!(evaluate(&kind, &stats, 1, 0, None, &bands()).unlocked);

        // A fourth retry no longer matches; the store keeps the unlock.
        stats.attempts_per_lesson.insert(4, 4);
        assert!(!evaluate(&kind, &stats, 1, 0, None, &bands()).unlocked);
    }

    #[test]
    fn test_full_week_play() {
        let mut stats = PlayerStats::new();
        stats.play_dates = dates(&[
            (2024, 1, 1),
            (2024, 1, 2),
            (2024, 1, 3),
            (2024, 1, 4),
            (2024, 1, 5),
            (2024, 1, 6),
        ]);
        let eval = evaluate(&ConditionKind::FullWeekPlay, &stats, 7, 0, None, &bands());
        assert_eq!(eval.progress, 0);

        stats.play_dates.insert(NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
        let eval = evaluate(&ConditionKind::FullWeekPlay, &stats, 7, 0, None, &bands());
        assert_eq!(eval, Evaluation { progress: 7, unlocked: true });
    }

    #[test]
    fn test_full_week_gap_breaks_run() {
        let mut stats = PlayerStats::new();
        stats.play_dates = dates(&[
            (2024, 1, 1),
            (2024, 1, 2),
            (2024, 1, 3),
            // gap
            (2024, 1, 5),
            (2024, 1, 6),
            (2024, 1, 7),
            (2024, 1, 8),
        ]);
        assert!(!evaluate(&ConditionKind::FullWeekPlay, &stats, 7, 0, None, &bands()).unlocked);
    }

    #[test]
    fn test_morning_play_event_gated() {
        let stats = PlayerStats::new();

        let eval = evaluate(
            &ConditionKind::MorningPlay,
            &stats,
            1,
            0,
            Some(&check_in(8, false)),
            &bands(),
        );
        assert!(eval.unlocked);

        // Afternoon check-in leaves progress unchanged.
        let eval = evaluate(
            &ConditionKind::MorningPlay,
            &stats,
            1,
            0,
            Some(&check_in(14, false)),
            &bands(),
        );
        assert_eq!(eval, Evaluation { progress: 0, unlocked: false });

        // A non-check-in event is ignored entirely.
        let activity = GameEvent::HelpUsed {
            lesson_id: 1,
            step_id: 1,
            at: Utc::now(),
        };
        let eval = evaluate(
            &ConditionKind::MorningPlay,
            &stats,
            1,
            0,
            Some(&activity),
            &bands(),
        );
        assert_eq!(eval.progress, 0);
    }

    #[test]
    fn test_evening_and_weekend_play() {
        let stats = PlayerStats::new();

        assert!(evaluate(
            &ConditionKind::EveningPlay,
            &stats,
            1,
            0,
            Some(&check_in(20, false)),
            &bands()
        )
        .unlocked);

        assert!(evaluate(
            &ConditionKind::WeekendPlay,
            &stats,
            1,
            0,
            Some(&check_in(12, true)),
            &bands()
        )
        .unlocked);

        assert!(!evaluate(
            &ConditionKind::WeekendPlay,
            &stats,
            1,
            0,
            Some(&check_in(12, false)),
            &bands()
        )
        .unlocked);
    }

    #[test]
    fn test_unknown_kind_keeps_current() {
        let stats = PlayerStats::new();
        let eval = evaluate(&ConditionKind::Unknown, &stats, 5, 3, None, &bands());
        assert_eq!(eval, Evaluation { progress: 3, unlocked: false });
    }

    #[test]
    fn test_event_gated_without_event_keeps_current() {
        let stats = PlayerStats::new();
        let eval = evaluate(&ConditionKind::WeekendPlay, &stats, 1, 0, None, &bands());
        assert_eq!(eval, Evaluation { progress: 0, unlocked: false });
    }
}
