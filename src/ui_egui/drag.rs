//! Pointer adapter between egui cell responses and [`DragSession`].
//!
//! Each frame the grid reports every cell it paints; the adapter picks up a
//! booking when its cell starts a drag, tracks which cell the pointer is over
//! and turns the release into a drop.

use egui::{Pos2, Rect, Response};

use crate::models::schedule::SlotKey;
use crate::services::schedule::drag::{DragEvent, DragSession, DropIntent};

#[derive(Debug, Default)]
pub struct PointerDragAdapter {
    hovered: Option<SlotKey>,
    released: bool,
}

impl PointerDragAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_frame(&mut self) {
        self.hovered = None;
        self.released = false;
    }

    pub fn observe_cell(
        &mut self,
        session: &mut DragSession,
        response: &Response,
        rect: Rect,
        key: &SlotKey,
        booking_id: Option<i64>,
        pointer: Option<Pos2>,
    ) {
        // Check drag_started before anything else so the pick-up lands first
        if response.drag_started() {
            if let Some(booking_id) = booking_id {
                session.handle(DragEvent::PickUp {
                    booking_id,
                    origin: key.clone(),
                });
            }
        }

        if session.is_dragging() && pointer.is_some_and(|pos| rect.contains(pos)) {
            self.hovered = Some(key.clone());
        }

        if response.drag_stopped() {
            self.released = true;
        }
    }

    /// Publishes the hovered cell and completes the drop if the pointer was
    /// released this frame.
    pub fn end_frame(&mut self, session: &mut DragSession) -> Option<DropIntent> {
        if !session.is_dragging() {
            return None;
        }

        session.handle(DragEvent::MoveOver(self.hovered.take()));
        if self.released {
            self.released = false;
            return session.handle(DragEvent::Drop);
        }
        None
    }
}
