//! Day-of-week × time-slot projection of a week's bookings.

use crate::models::schedule::{ScheduleItem, SlotKey, TimeSlot, DAYS_PER_WEEK};

/// One cell of the weekly grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell<'a> {
    pub key: SlotKey,
    pub booking: Option<&'a ScheduleItem>,
}

/// One time-slot row: seven cells, Monday first.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow<'a> {
    pub slot: &'a TimeSlot,
    pub cells: Vec<GridCell<'a>>,
}

/// First booking occupying `(day_of_week, time_slot)`.
pub fn schedule_at<'a>(
    schedules: &'a [ScheduleItem],
    day_of_week: u8,
    time_slot: &str,
) -> Option<&'a ScheduleItem> {
    schedules
        .iter()
        .find(|item| item.occupies(day_of_week, time_slot))
}

/// Builds the grid rows in server slot order. Bookings whose slot is not in
/// `time_slots` have no cell and are not rendered.
pub fn build_rows<'a>(time_slots: &'a [TimeSlot], schedules: &'a [ScheduleItem]) -> Vec<GridRow<'a>> {
    time_slots
        .iter()
        .map(|slot| GridRow {
            slot,
            cells: (1..=DAYS_PER_WEEK)
                .map(|day| GridCell {
                    key: SlotKey::new(day, slot.time_slot.clone()),
                    booking: schedule_at(schedules, day, &slot.time_slot),
                })
                .collect(),
        })
        .collect()
}

/// Bookings that the grid cannot place (unknown slot or day out of range).
pub fn unplaced<'a>(time_slots: &[TimeSlot], schedules: &'a [ScheduleItem]) -> Vec<&'a ScheduleItem> {
    schedules
        .iter()
        .filter(|item| {
            !(1..=DAYS_PER_WEEK).contains(&item.day_of_week)
                || !time_slots.iter().any(|slot| slot.time_slot == item.time_slot)
        })
        .collect()
}
