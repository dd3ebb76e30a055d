use serde::{Deserialize, Serialize};

use super::{LessonType, ScheduleItem, ScheduleStatus, WeekWindow, DAYS_PER_WEEK};

pub const DEFAULT_TIME_SLOT: &str = "09:00:00";
pub const DEFAULT_DURATION_MINUTES: i32 = 30;

/// Full editable field set sent when creating or editing a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub student_id: i64,
    pub week_start_date: String,
    pub week_end_date: String,
    pub day_of_week: u8,
    pub time_slot: String,
    pub duration_minutes: i32,
    pub lesson_type: LessonType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
    pub subject: String,
    pub classroom: String,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ScheduleStatus>,
}

impl BookingDraft {
    /// Defaults for a brand-new booking in the given week.
    pub fn new_for(student_id: i64, week: &WeekWindow) -> Self {
        Self {
            student_id,
            week_start_date: week.start_param(),
            week_end_date: week.end_param(),
            day_of_week: 1,
            time_slot: DEFAULT_TIME_SLOT.to_string(),
            duration_minutes: DEFAULT_DURATION_MINUTES,
            lesson_type: LessonType::Physical,
            teacher_id: None,
            subject: String::new(),
            classroom: String::new(),
            notes: String::new(),
            status: None,
        }
    }

    /// Pre-populates the form from an existing booking.
    pub fn from_item(item: &ScheduleItem, week: &WeekWindow) -> Self {
        Self {
            student_id: item.student_id,
            week_start_date: week.start_param(),
            week_end_date: week.end_param(),
            day_of_week: item.day_of_week,
            time_slot: item.time_slot.clone(),
            duration_minutes: item.duration_minutes,
            lesson_type: item.lesson_type,
            teacher_id: item.teacher_id,
            subject: item.subject.clone().unwrap_or_default(),
            classroom: item.classroom.clone().unwrap_or_default(),
            notes: item.notes.clone().unwrap_or_default(),
            status: Some(item.status),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(1..=DAYS_PER_WEEK).contains(&self.day_of_week) {
            return Err("Day of week must be between 1 and 7".to_string());
        }

        if self.time_slot.trim().is_empty() {
            return Err("A time slot must be selected".to_string());
        }

        if self.duration_minutes <= 0 {
            return Err("Duration must be greater than 0 minutes".to_string());
        }

        Ok(())
    }
}

/// Body of a relocation request: only the placement fields change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotMove {
    pub day_of_week: u8,
    pub time_slot: String,
}
