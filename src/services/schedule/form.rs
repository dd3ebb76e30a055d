use crate::models::schedule::{BookingDraft, ScheduleItem, WeekWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { booking_id: i64 },
}

/// Create/edit dialog state. Stays open until a save succeeds or the user
/// closes it.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingForm {
    pub mode: FormMode,
    pub draft: BookingDraft,
    pub error: Option<String>,
    /// Set while a save is waiting for the server.
    pub saving: bool,
}

impl BookingForm {
    pub fn create(student_id: i64, week: &WeekWindow) -> Self {
        Self {
            mode: FormMode::Create,
            draft: BookingDraft::new_for(student_id, week),
            error: None,
            saving: false,
        }
    }

    pub fn edit(item: &ScheduleItem, week: &WeekWindow) -> Self {
        Self {
            mode: FormMode::Edit {
                booking_id: item.id,
            },
            draft: BookingDraft::from_item(item, week),
            error: None,
            saving: false,
        }
    }

    pub fn is_new(&self) -> bool {
        self.mode == FormMode::Create
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "New Booking",
            FormMode::Edit { .. } => "Edit Booking",
        }
    }
}
