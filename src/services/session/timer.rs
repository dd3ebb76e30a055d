use chrono::{DateTime, Duration, Utc};

/// Poll-driven repeating timer.
///
/// The owner calls [`RepeatingTimer::poll`] from its update loop with the
/// current time. Cancelling is immediate: a cancelled timer never fires
/// again until it is restarted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatingTimer {
    period: Duration,
    next_due_at: Option<DateTime<Utc>>,
}

impl RepeatingTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due_at: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Arms the timer to fire one period after `now`. Restarting a running
    /// timer replaces its schedule; there is never more than one pending fire.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.next_due_at = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next_due_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due_at.is_some()
    }

    pub fn next_due_at(&self) -> Option<DateTime<Utc>> {
        self.next_due_at
    }

    /// Returns true when the timer is due, re-arming it at `now + period`.
    /// Missed periods are coalesced into a single fire.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.next_due_at {
            Some(due) if now >= due => {
                self.next_due_at = Some(now + self.period);
                true
            }
            _ => false,
        }
    }

    /// Time left until the next fire, for scheduling a repaint.
    pub fn next_due_in(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        let due = self.next_due_at?;
        Some((due - now).to_std().unwrap_or(std::time::Duration::ZERO))
    }
}
