use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::catalog::LessonCategory;

/// Every gameplay action the engine reacts to produces a GameEvent.
/// Call sites build these; the dispatcher feeds them through the stats
/// accumulator and the condition evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    ActivityCompleted {
        lesson_id: u32,
        step_id: u32,
        category: LessonCategory,
        stars: u32,
        errors: u32,
        elapsed_seconds: u32,
        used_help: bool,
        is_perfect: bool,
        at: DateTime<Utc>,
    },
    HelpUsed {
        lesson_id: u32,
        step_id: u32,
        at: DateTime<Utc>,
    },
    DailyCheckIn {
        date: NaiveDate,
        hour: u32,
        is_weekend: bool,
        at: DateTime<Utc>,
    },
}

impl GameEvent {
    /// Build a check-in from a single local timestamp, deriving the calendar
    /// date, hour band input, and weekend flag from it.
    pub fn daily_check_in(local: DateTime<chrono::Local>) -> Self {
        let date = local.date_naive();
        let is_weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        GameEvent::DailyCheckIn {
            date,
            hour: local.hour(),
            is_weekend,
            at: local.with_timezone(&Utc),
        }
    }
}

/// What gameplay reports when the player finishes an activity. One logical
/// action, one report: `used_help` marks a completion that consumed help, so
/// call sites must not also send a separate help-used event for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityCompletion {
    pub lesson_id: u32,
    pub step_id: u32,
    pub category: LessonCategory,
    pub stars: u32,
    pub errors: u32,
    pub elapsed_seconds: u32,
    pub used_help: bool,
    pub is_perfect: bool,
}

impl From<ActivityCompletion> for GameEvent {
    fn from(c: ActivityCompletion) -> Self {
        GameEvent::ActivityCompleted {
            lesson_id: c.lesson_id,
            step_id: c.step_id,
            category: c.category,
            stars: c.stars,
            errors: c.errors,
            elapsed_seconds: c.elapsed_seconds,
            used_help: c.used_help,
            is_perfect: c.is_perfect,
            at: Utc::now(),
        }
    }
}
