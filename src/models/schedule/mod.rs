// Schedule module
// Short-term bookings, time slots and teachers as served by the REST API

mod draft;
mod slot;
mod student;
mod week;

pub use draft::{BookingDraft, SlotMove};
pub use slot::{normalize_time_slot, SlotKey, DAYS_PER_WEEK};
pub use student::{Student, SHORT_TERM_CLASS};
pub use week::WeekWindow;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Short day labels indexed by `day_of_week - 1` (Monday first).
pub const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Returns the label for a 1-based day of week, or `"?"` when out of range.
pub fn day_name(day_of_week: u8) -> &'static str {
    match day_of_week {
        1..=7 => DAY_NAMES[(day_of_week - 1) as usize],
        _ => "?",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonType {
    #[default]
    Physical,
    Online,
}

impl LessonType {
    pub const ALL: [LessonType; 2] = [LessonType::Physical, LessonType::Online];

    pub fn label(&self) -> &'static str {
        match self {
            LessonType::Physical => "In person",
            LessonType::Online => "Online",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
}

impl ScheduleStatus {
    pub const ALL: [ScheduleStatus; 4] = [
        ScheduleStatus::Scheduled,
        ScheduleStatus::Completed,
        ScheduleStatus::Cancelled,
        ScheduleStatus::Rescheduled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ScheduleStatus::Scheduled => "Scheduled",
            ScheduleStatus::Completed => "Completed",
            ScheduleStatus::Cancelled => "Cancelled",
            ScheduleStatus::Rescheduled => "Rescheduled",
        }
    }
}

/// One booked lesson in a student's week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: i64,
    pub student_id: i64,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(deserialize_with = "date_prefix")]
    pub week_start_date: NaiveDate,
    #[serde(deserialize_with = "date_prefix")]
    pub week_end_date: NaiveDate,
    pub day_of_week: u8,
    #[serde(deserialize_with = "time_slot_string")]
    pub time_slot: String,
    pub duration_minutes: i32,
    pub lesson_type: LessonType,
    #[serde(default)]
    pub status: ScheduleStatus,
    #[serde(default)]
    pub teacher_id: Option<i64>,
    #[serde(default)]
    pub teacher_name: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub classroom: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ScheduleItem {
    /// Placement key of the grid cell this booking occupies.
    pub fn slot_key(&self) -> SlotKey {
        SlotKey::new(self.day_of_week, self.time_slot.clone())
    }

    pub fn occupies(&self, day_of_week: u8, time_slot: &str) -> bool {
        self.day_of_week == day_of_week && self.time_slot == time_slot
    }

    pub fn subject_label(&self) -> &str {
        non_empty(self.subject.as_deref()).unwrap_or("No subject")
    }

    pub fn teacher_label(&self) -> &str {
        non_empty(self.teacher_name.as_deref()).unwrap_or("No teacher assigned")
    }
}

/// A row on the grid's time axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(deserialize_with = "time_slot_string")]
    pub time_slot: String,
    pub display_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "flag")]
    pub is_active: bool,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// SQL DATE columns arrive either as `YYYY-MM-DD` or as a full ISO timestamp.
fn date_prefix<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let prefix = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

fn time_slot_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    normalize_time_slot(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid time slot '{}'", raw)))
}

// BIT columns may be serialized as booleans or as 0/1.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(value) => Ok(value),
        serde_json::Value::Number(n) => Ok(n.as_i64().unwrap_or(0) != 0),
        serde_json::Value::Null => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected boolean flag, found {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_json() -> serde_json::Value {
        json!({
            "id": 1,
            "student_id": 7,
            "student_name": "Amy",
            "week_start_date": "2025-03-03T00:00:00.000Z",
            "week_end_date": "2025-03-09",
            "day_of_week": 2,
            "time_slot": "1970-01-01T09:00:00.000Z",
            "duration_minutes": 30,
            "lesson_type": "physical",
            "status": "scheduled",
            "teacher_id": null,
            "teacher_name": null,
            "subject": "Math",
            "classroom": "A1",
            "notes": null,
            "school": "ignored extra column"
        })
    }

    #[test]
    fn test_deserialize_schedule_item_normalizes_server_formats() {
        let item: ScheduleItem = serde_json::from_value(sample_json()).unwrap();

        assert_eq!(item.week_start_date, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(item.week_end_date, NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
        assert_eq!(item.time_slot, "09:00:00");
        assert_eq!(item.lesson_type, LessonType::Physical);
        assert_eq!(item.status, ScheduleStatus::Scheduled);
        assert!(item.teacher_id.is_none());
    }

    #[test]
    fn test_missing_status_defaults_to_scheduled() {
        let mut value = sample_json();
        value.as_object_mut().unwrap().remove("status");

        let item: ScheduleItem = serde_json::from_value(value).unwrap();
        assert_eq!(item.status, ScheduleStatus::Scheduled);
    }

    #[test]
    fn test_unknown_lesson_type_is_rejected() {
        let mut value = sample_json();
        value["lesson_type"] = json!("hybrid");

        assert!(serde_json::from_value::<ScheduleItem>(value).is_err());
    }

    #[test]
    fn test_labels_fall_back_when_blank() {
        let mut item: ScheduleItem = serde_json::from_value(sample_json()).unwrap();
        item.subject = Some("   ".to_string());

        assert_eq!(item.subject_label(), "No subject");
        assert_eq!(item.teacher_label(), "No teacher assigned");
    }

    #[test]
    fn test_teacher_active_flag_accepts_bit_values() {
        let active: Teacher =
            serde_json::from_value(json!({"id": 1, "name": "Lin", "is_active": 1})).unwrap();
        let inactive: Teacher =
            serde_json::from_value(json!({"id": 2, "name": "Wu", "is_active": false})).unwrap();
        let missing: Teacher = serde_json::from_value(json!({"id": 3, "name": "Ho"})).unwrap();

        assert!(active.is_active);
        assert!(!inactive.is_active);
        assert!(!missing.is_active);
    }

    #[test]
    fn test_day_name_bounds() {
        assert_eq!(day_name(1), "Mon");
        assert_eq!(day_name(7), "Sun");
        assert_eq!(day_name(0), "?");
        assert_eq!(day_name(8), "?");
    }
}
