//! Unlock notification queue.
//!
//! A pure ordering/pacing buffer between evaluation and the presentation
//! layer: one banner at a time, a fixed gap between banners, and a short
//! cooldown after dismissal. No business logic lives here.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::VecDeque;

use crate::catalog::{AchievementDef, Language, Rarity};
use crate::config::NotificationsConfig;

/// What the presentation layer receives for one unlock banner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnlockNotice {
    pub achievement_id: u32,
    pub title: String,
    pub description: String,
    pub encouragement: String,
    pub points: u32,
    pub rarity: Rarity,
}

impl UnlockNotice {
    pub fn from_def(def: &AchievementDef, lang: Language) -> Self {
        Self {
            achievement_id: def.id,
            title: def.title.get(lang).to_string(),
            description: def.description.get(lang).to_string(),
            encouragement: def.encouragement.get(lang).to_string(),
            points: def.points,
            rarity: def.rarity,
        }
    }
}

/// FIFO of unlock notices awaiting display.
pub struct NotificationQueue {
    pending: VecDeque<UnlockNotice>,
    /// The banner currently on screen, with the time it was shown.
    displayed: Option<(UnlockNotice, DateTime<Utc>)>,
    /// Earliest time the next banner may be shown.
    next_eligible_at: Option<DateTime<Utc>>,
    gap: Duration,
    dismiss_cooldown: Duration,
}

impl NotificationQueue {
    pub fn new(config: &NotificationsConfig) -> Self {
        Self {
            pending: VecDeque::new(),
            displayed: None,
            next_eligible_at: None,
            gap: Duration::seconds(config.gap_secs as i64),
            dismiss_cooldown: Duration::seconds(config.dismiss_cooldown_secs as i64),
        }
    }

    /// Append notices in order.
    pub fn enqueue(&mut self, notices: Vec<UnlockNotice>) {
        self.pending.extend(notices);
    }

    /// Pop the next notice for display, if nothing is on screen and the
    /// pacing gate has passed.
    pub fn poll_next(&mut self, now: DateTime<Utc>) -> Option<UnlockNotice> {
        if self.displayed.is_some() {
            return None;
        }
        if let Some(eligible_at) = self.next_eligible_at {
            if now < eligible_at {
                return None;
            }
        }
        let notice = self.pending.pop_front()?;
        self.displayed = Some((notice.clone(), now));
        Some(notice)
    }

    /// Acknowledge the visible banner and schedule the next one.
    pub fn dismiss(&mut self, now: DateTime<Utc>) {
        if let Some((_, shown_at)) = self.displayed.take() {
            let after_gap = shown_at + self.gap;
            let after_dismiss = now + self.dismiss_cooldown;
            self.next_eligible_at = Some(after_gap.max(after_dismiss));
        }
    }

    pub fn currently_displayed(&self) -> Option<&UnlockNotice> {
        self.displayed.as_ref().map(|(n, _)| n)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drop everything (logout).
    pub fn clear(&mut self) {
        self.pending.clear();
        self.displayed = None;
        self.next_eligible_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_catalog;

    fn queue() -> NotificationQueue {
        NotificationQueue::new(&NotificationsConfig::default())
    }

    fn notices(n: usize) -> Vec<UnlockNotice> {
        builtin_catalog()
            .iter()
            .take(n)
            .map(|d| UnlockNotice::from_def(d, Language::En))
            .collect()
    }

    #[test]
    fn test_fifo_order_preserved() {
        let mut q = queue();
        let now = Utc::now();
        q.enqueue(notices(3));

        let first = q.poll_next(now).unwrap();
        assert_eq!(first.achievement_id, 1);
        q.dismiss(now);

        let later = now + Duration::seconds(6);
        assert_eq!(q.poll_next(later).unwrap().achievement_id, 2);
    }

    #[test]
    fn test_one_banner_at_a_time() {
        let mut q = queue();
        let now = Utc::now();
        q.enqueue(notices(2));

        assert!(q.poll_next(now).is_some());
        // Nothing else until the first is dismissed.
        assert!(q.poll_next(now + Duration::seconds(60)).is_none());
        assert_eq!(q.pending_count(), 1);
    }

    #[test]
    fn test_gap_between_banners() {
        let mut q = queue();
        let now = Utc::now();
        q.enqueue(notices(2));

        q.poll_next(now);
        // Dismissed quickly: the 5s inter-banner gap still applies.
        q.dismiss(now + Duration::seconds(1));
        assert!(q.poll_next(now + Duration::seconds(3)).is_none());
        assert!(q.poll_next(now + Duration::seconds(5)).is_some());
    }

    #[test]
    fn test_dismiss_cooldown_applies_after_long_display() {
        let mut q = queue();
        let now = Utc::now();
        q.enqueue(notices(2));

        q.poll_next(now);
        // Banner sat on screen well past the gap; the 1s dismissal
        // cooldown is what gates the next one.
        let dismissed = now + Duration::seconds(30);
        q.dismiss(dismissed);
        assert!(q.poll_next(dismissed).is_none());
        assert!(q.poll_next(dismissed + Duration::seconds(1)).is_some());
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut q = queue();
        let now = Utc::now();
        q.enqueue(notices(3));
        q.poll_next(now);

        q.clear();
        assert_eq!(q.pending_count(), 0);
        assert!(q.currently_displayed().is_none());
        assert!(q.poll_next(now).is_none());
    }

    #[test]
    fn test_notice_resolves_language() {
        let def = &builtin_catalog()[0];
        let en = UnlockNotice::from_def(def, Language::En);
        let es = UnlockNotice::from_def(def, Language::Es);
        assert_eq!(en.title, "First Steps");
        assert_eq!(es.title, "Primeros Pasos");
    }
}
