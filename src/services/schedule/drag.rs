//! Input-agnostic drag-and-drop for the weekly grid.
//!
//! Pointer and keyboard input both reduce to the same pick-up / move-over /
//! drop / cancel events. The session only tracks what is being dragged and
//! which cell is hovered; deciding whether the drop is legal is the
//! engine's job.

use crate::models::schedule::{SlotKey, TimeSlot, DAYS_PER_WEEK};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        booking_id: i64,
        origin: SlotKey,
        over: Option<SlotKey>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    PickUp { booking_id: i64, origin: SlotKey },
    /// `None` when the pointer left every drop target.
    MoveOver(Option<SlotKey>),
    Drop,
    Cancel,
}

/// A completed drag: move `booking_id` to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropIntent {
    pub booking_id: i64,
    pub target: SlotKey,
}

impl DropIntent {
    pub fn target_id(&self) -> String {
        self.target.cell_id()
    }
}

#[derive(Debug, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn active_booking(&self) -> Option<i64> {
        match &self.state {
            DragState::Dragging { booking_id, .. } => Some(*booking_id),
            DragState::Idle => None,
        }
    }

    pub fn hovered(&self) -> Option<&SlotKey> {
        match &self.state {
            DragState::Dragging { over, .. } => over.as_ref(),
            DragState::Idle => None,
        }
    }

    /// Feeds one event. Returns the drop intent when a drag completes over a
    /// cell other than the one it started from.
    pub fn handle(&mut self, event: DragEvent) -> Option<DropIntent> {
        match event {
            DragEvent::PickUp { booking_id, origin } => {
                if !self.is_dragging() {
                    self.state = DragState::Dragging {
                        booking_id,
                        over: Some(origin.clone()),
                        origin,
                    };
                }
                None
            }
            DragEvent::MoveOver(target) => {
                if let DragState::Dragging { over, .. } = &mut self.state {
                    *over = target;
                }
                None
            }
            DragEvent::Drop => match std::mem::take(&mut self.state) {
                DragState::Dragging {
                    booking_id,
                    origin,
                    over: Some(target),
                } if target != origin => Some(DropIntent { booking_id, target }),
                _ => None,
            },
            DragEvent::Cancel => {
                self.state = DragState::Idle;
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKey {
    Up,
    Down,
    Left,
    Right,
    /// Space or Enter: pick up when idle, drop when dragging.
    Activate,
    Escape,
}

/// Keyboard adapter: moves a cell cursor over the 7 × N grid and turns key
/// presses into drag events.
#[derive(Debug, Default)]
pub struct KeyboardDragAdapter {
    day_of_week: u8,
    row: usize,
}

impl KeyboardDragAdapter {
    pub fn new() -> Self {
        Self {
            day_of_week: 1,
            row: 0,
        }
    }

    /// Cursor position as a slot key, if the grid has rows.
    pub fn cursor(&self, time_slots: &[TimeSlot]) -> Option<SlotKey> {
        time_slots
            .get(self.row)
            .map(|slot| SlotKey::new(self.day_of_week.max(1), slot.time_slot.clone()))
    }

    /// Moves the cursor onto `key` (e.g. after a click on a cell).
    pub fn focus(&mut self, key: &SlotKey, time_slots: &[TimeSlot]) {
        if let Some(row) = time_slots.iter().position(|s| s.time_slot == key.time_slot) {
            self.row = row;
            self.day_of_week = key.day_of_week.clamp(1, DAYS_PER_WEEK);
        }
    }

    pub fn handle_key<F>(
        &mut self,
        key: GridKey,
        session: &mut DragSession,
        time_slots: &[TimeSlot],
        booking_at: F,
    ) -> Option<DropIntent>
    where
        F: Fn(&SlotKey) -> Option<i64>,
    {
        if time_slots.is_empty() {
            return None;
        }
        self.day_of_week = self.day_of_week.clamp(1, DAYS_PER_WEEK);
        self.row = self.row.min(time_slots.len() - 1);

        match key {
            GridKey::Up => self.row = self.row.saturating_sub(1),
            GridKey::Down => self.row = (self.row + 1).min(time_slots.len() - 1),
            GridKey::Left => self.day_of_week = self.day_of_week.saturating_sub(1).max(1),
            GridKey::Right => self.day_of_week = (self.day_of_week + 1).min(DAYS_PER_WEEK),
            GridKey::Escape => return session.handle(DragEvent::Cancel),
            GridKey::Activate => {
                let cursor = self.cursor(time_slots)?;
                if session.is_dragging() {
                    return session.handle(DragEvent::Drop);
                }
                if let Some(booking_id) = booking_at(&cursor) {
                    session.handle(DragEvent::PickUp {
                        booking_id,
                        origin: cursor,
                    });
                }
                return None;
            }
        }

        if session.is_dragging() {
            session.handle(DragEvent::MoveOver(self.cursor(time_slots)));
        }
        None
    }
}
