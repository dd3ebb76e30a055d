use crate::models::schedule::SlotKey;
use crate::services::schedule::drag::DropIntent;

pub mod login_view;
pub mod schedule_view;

/// Requests raised while rendering the schedule screen. The app applies them
/// after the frame's widgets are laid out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScheduleRequest {
    PreviousWeek,
    NextWeek,
    CurrentWeek,
    Reload,
    SelectStudent(i64),
    NewBooking,
    NewBookingAt(SlotKey),
    EditBooking(i64),
    DeleteBooking(i64),
    Move(DropIntent),
    DismissError,
    LogOut,
}
