use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

pub const DAYS_PER_WEEK: u8 = 7;

/// Placement key of one grid cell: `(day_of_week, time_slot)`.
///
/// The composite identifier used by drop targets is `"{day}-{time_slot}"`,
/// for example `3-10:00:00`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub day_of_week: u8,
    pub time_slot: String,
}

impl SlotKey {
    pub fn new(day_of_week: u8, time_slot: impl Into<String>) -> Self {
        Self {
            day_of_week,
            time_slot: time_slot.into(),
        }
    }

    /// Parses a drop-target identifier back into a slot key.
    pub fn parse(id: &str) -> Result<Self, String> {
        let (day, time_slot) = id
            .split_once('-')
            .ok_or_else(|| format!("Invalid cell id '{}': missing separator", id))?;

        let day_of_week: u8 = day
            .trim()
            .parse()
            .map_err(|_| format!("Invalid cell id '{}': day is not a number", id))?;

        if !(1..=DAYS_PER_WEEK).contains(&day_of_week) {
            return Err(format!(
                "Invalid cell id '{}': day must be between 1 and {}",
                id, DAYS_PER_WEEK
            ));
        }

        let time_slot = time_slot.trim();
        if time_slot.is_empty() {
            return Err(format!("Invalid cell id '{}': empty time slot", id));
        }

        Ok(Self::new(day_of_week, time_slot))
    }

    pub fn cell_id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.day_of_week, self.time_slot)
    }
}

/// Normalizes the time-of-day encodings the server emits to `HH:MM:SS`.
///
/// Accepts `HH:MM`, `HH:MM:SS`, `HH:MM:SS.fff` and ISO timestamps such as
/// `1970-01-01T09:00:00.000Z` (SQL TIME columns serialized as dates).
pub fn normalize_time_slot(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let time_part = match raw.split_once('T') {
        Some((_, rest)) => rest.trim_end_matches('Z'),
        None => raw,
    };

    let time_part = time_part.split('.').next().unwrap_or(time_part);

    NaiveTime::parse_from_str(time_part, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time_part, "%H:%M"))
        .ok()
        .map(|time| time.format("%H:%M:%S").to_string())
}
