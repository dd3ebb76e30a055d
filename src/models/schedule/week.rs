use chrono::{Datelike, Duration, NaiveDate};

/// Monday-to-Sunday window a student's short-term bookings belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    pub fn containing(date: NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_monday() as i64;
        let start = date - Duration::days(offset);
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    pub fn next(&self) -> Self {
        Self::containing(self.start + Duration::days(7))
    }

    pub fn previous(&self) -> Self {
        Self::containing(self.start - Duration::days(7))
    }

    /// Calendar date of a 1-based day of week inside this window.
    pub fn date_of(&self, day_of_week: u8) -> Option<NaiveDate> {
        match day_of_week {
            1..=7 => Some(self.start + Duration::days(day_of_week as i64 - 1)),
            _ => None,
        }
    }

    pub fn start_param(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }

    pub fn label(&self) -> String {
        format!(
            "{} – {}",
            self.start.format("%b %d"),
            self.end.format("%b %d, %Y")
        )
    }
}
