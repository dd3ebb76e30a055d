use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutTick {
    Locked { remaining_secs: i64 },
    /// The lock just expired; the countdown has cleared itself.
    Unlocked,
}

/// Per-second countdown shown while an account is locked out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockoutCountdown {
    username: Option<String>,
    unlock_at: Option<DateTime<Utc>>,
}

impl LockoutCountdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, username: &str, remaining: Duration, now: DateTime<Utc>) {
        log::warn!(
            "Account '{}' locked for {} more minute(s)",
            username,
            remaining.num_minutes()
        );
        self.username = Some(username.to_string());
        self.unlock_at = Some(now + remaining);
    }

    pub fn clear(&mut self) {
        self.username = None;
        self.unlock_at = None;
    }

    pub fn is_active(&self) -> bool {
        self.unlock_at.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Clears the countdown when the form now names a different account.
    pub fn on_username_changed(&mut self, username: &str) {
        if self.username.as_deref().is_some_and(|locked| locked != username) {
            self.clear();
        }
    }

    pub fn remaining_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        self.unlock_at
            .map(|unlock_at| (unlock_at - now).num_seconds().max(0))
    }

    /// `None` while inactive. Reaching zero clears the countdown and reports
    /// [`LockoutTick::Unlocked`] exactly once.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<LockoutTick> {
        let remaining_secs = self.remaining_secs(now)?;
        if remaining_secs > 0 {
            return Some(LockoutTick::Locked { remaining_secs });
        }

        log::info!(
            "Lockout for '{}' expired",
            self.username.as_deref().unwrap_or_default()
        );
        self.clear();
        Some(LockoutTick::Unlocked)
    }
}

/// `MM:SS` rendering of a countdown.
pub fn format_countdown(remaining_secs: i64) -> String {
    let secs = remaining_secs.max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_counts_down_then_unlocks_once() {
        let mut countdown = LockoutCountdown::new();
        countdown.start("amy", Duration::minutes(2), now());

        assert_eq!(
            countdown.tick_at(now() + Duration::seconds(1)),
            Some(LockoutTick::Locked { remaining_secs: 119 })
        );
        assert_eq!(
            countdown.tick_at(now() + Duration::minutes(2)),
            Some(LockoutTick::Unlocked)
        );
        assert!(!countdown.is_active());
        assert_eq!(countdown.tick_at(now() + Duration::minutes(3)), None);
    }

    #[test]
    fn test_username_change_clears_countdown() {
        let mut countdown = LockoutCountdown::new();
        countdown.start("amy", Duration::minutes(5), now());

        countdown.on_username_changed("amy");
        assert!(countdown.is_active());

        countdown.on_username_changed("bob");
        assert!(!countdown.is_active());
        assert_eq!(countdown.username(), None);
    }

    #[test]
    fn test_inactive_countdown_does_not_tick() {
        let mut countdown = LockoutCountdown::new();
        assert_eq!(countdown.tick_at(now()), None);
        assert_eq!(countdown.remaining_secs(now()), None);
    }

    #[test_case(0, "00:00")]
    #[test_case(59, "00:59")]
    #[test_case(61, "01:01")]
    #[test_case(1800, "30:00")]
    #[test_case(-5, "00:00")]
    fn test_format_countdown(secs: i64, expected: &str) {
        assert_eq!(format_countdown(secs), expected);
    }
}
