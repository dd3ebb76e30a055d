//! Weekly short-term schedule editor.
//!
//! Holds one student's bookings for one week together with the time-slot
//! axis and the active teachers. Every mutation goes to the server first and
//! is followed by a full reload; local state is never patched speculatively,
//! so a failed request leaves the last loaded snapshot untouched.
//!
//! Each network step comes in two halves so the UI can run the request on a
//! worker thread: `begin_*`/`plan_*` prepares it on the UI thread and
//! `apply_*`/`finish_*` folds the result back in. The one-call methods
//! (`load`, `move_booking`, `submit_form`, `confirm_delete`) chain the halves
//! synchronously.

pub mod drag;
mod form;
pub mod grid;
mod student;

pub use form::{BookingForm, FormMode};
pub use grid::{GridCell, GridRow};
pub use student::{lookup_student, NOT_SHORT_TERM, STUDENT_LOAD_FAILED};

use std::thread::{self, ScopedJoinHandle};

use crate::models::schedule::{
    BookingDraft, ScheduleItem, SlotKey, SlotMove, Teacher, TimeSlot, WeekWindow,
};
use crate::services::api::{ApiError, ApiResult, ScheduleApi};

pub const LOAD_FAILED: &str = "Failed to load schedule data";
pub const SLOT_OCCUPIED: &str = "The target time slot already has a booking";
pub const MOVE_FAILED: &str = "Failed to move booking";
pub const SAVE_FAILED: &str = "Failed to save booking";
pub const DELETE_FAILED: &str = "Failed to delete booking";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Result of dropping a booking on a grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Unknown booking, unparsable target or grid not loaded.
    Ignored,
    /// Target cell holds another booking; nothing was sent.
    Conflict,
    Moved,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    NoForm,
    /// The open form is already waiting for the server.
    InFlight,
    /// Rejected locally; nothing was sent.
    Invalid(String),
    Saved,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    NothingPending,
    Deleted,
    Failed(String),
}

/// Identifies one load of the grid. A result whose ticket is no longer the
/// newest (the view changed or another load started) is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub student_id: i64,
    pub week: WeekWindow,
    generation: u64,
}

impl LoadTicket {
    /// Fetches bookings, time slots and teachers concurrently. Fails with the
    /// first error if any of the three fails.
    pub fn fetch<A>(&self, api: &A) -> ApiResult<Snapshot>
    where
        A: ScheduleApi + Sync + ?Sized,
    {
        let student_id = self.student_id;
        let week = self.week;

        let (schedules, time_slots, teachers) = thread::scope(|scope| {
            let schedules = scope.spawn(move || api.list_student_schedules(student_id, &week));
            let time_slots = scope.spawn(move || api.list_time_slots());
            let teachers = api.list_teachers();
            (join_fetch(schedules), join_fetch(time_slots), teachers)
        });

        Ok(Snapshot {
            schedules: schedules?,
            time_slots: time_slots?,
            teachers: teachers?,
        })
    }
}

/// Everything one grid load returns, applied as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub schedules: Vec<ScheduleItem>,
    pub time_slots: Vec<TimeSlot>,
    pub teachers: Vec<Teacher>,
}

/// A validated form on its way to the server.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave {
    pub mode: FormMode,
    pub draft: BookingDraft,
}

impl PendingSave {
    pub fn send<A: ScheduleApi + ?Sized>(&self, api: &A) -> ApiResult<()> {
        match self.mode {
            FormMode::Create => api.create_schedule(&self.draft),
            FormMode::Edit { booking_id } => api.update_schedule(booking_id, &self.draft),
        }
    }
}

pub struct ScheduleEditor {
    student_id: i64,
    week: WeekWindow,
    schedules: Vec<ScheduleItem>,
    time_slots: Vec<TimeSlot>,
    teachers: Vec<Teacher>,
    phase: LoadPhase,
    /// Bumped by every load and reset; only the newest load may apply.
    generation: u64,
    error: Option<String>,
    form: Option<BookingForm>,
    pending_delete: Option<i64>,
}

impl ScheduleEditor {
    pub fn new(student_id: i64, week: WeekWindow) -> Self {
        Self {
            student_id,
            week,
            schedules: Vec::new(),
            time_slots: Vec::new(),
            teachers: Vec::new(),
            phase: LoadPhase::Idle,
            generation: 0,
            error: None,
            form: None,
            pending_delete: None,
        }
    }

    pub fn student_id(&self) -> i64 {
        self.student_id
    }

    pub fn week(&self) -> WeekWindow {
        self.week
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == LoadPhase::Ready
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    /// Inline (non-blocking) error from the last conflict or failed mutation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn schedules(&self) -> &[ScheduleItem] {
        &self.schedules
    }

    pub fn time_slots(&self) -> &[TimeSlot] {
        &self.time_slots
    }

    /// Active teachers only.
    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn booking(&self, booking_id: i64) -> Option<&ScheduleItem> {
        self.schedules.iter().find(|item| item.id == booking_id)
    }

    /// Booking occupying `(day_of_week, time_slot)`, if any.
    pub fn schedule_at(&self, day_of_week: u8, time_slot: &str) -> Option<&ScheduleItem> {
        grid::schedule_at(&self.schedules, day_of_week, time_slot)
    }

    /// Grid rows; only available once the whole week has loaded.
    pub fn grid(&self) -> Option<Vec<GridRow<'_>>> {
        self.is_ready()
            .then(|| grid::build_rows(&self.time_slots, &self.schedules))
    }

    /// Switches student and/or week. Returns true when a reload is needed.
    pub fn set_view(&mut self, student_id: i64, week: WeekWindow) -> bool {
        if self.student_id == student_id && self.week == week && self.phase != LoadPhase::Idle {
            return false;
        }

        self.student_id = student_id;
        self.week = week;
        self.reset();
        true
    }

    /// Drops the loaded week, e.g. when the user signs out. Loads still in
    /// flight are discarded when they finish.
    pub fn reset(&mut self) {
        self.clear_snapshot();
        self.generation += 1;
        self.phase = LoadPhase::Idle;
        self.error = None;
        self.form = None;
        self.pending_delete = None;
    }

    /// Loads the current view synchronously.
    pub fn load<A>(&mut self, api: &A) -> bool
    where
        A: ScheduleApi + Sync + ?Sized,
    {
        let ticket = self.begin_load();
        let result = ticket.fetch(api);
        self.apply_snapshot(ticket, result)
    }

    /// Enters [`LoadPhase::Loading`] and returns the ticket to fetch with.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.phase = LoadPhase::Loading;
        LoadTicket {
            student_id: self.student_id,
            week: self.week,
            generation: self.generation,
        }
    }

    /// Applies a finished load. The snapshot replaces the old one only if
    /// every request succeeded; a failure leaves no grid behind. Returns true
    /// when the grid is ready, false on failure or for a superseded ticket.
    pub fn apply_snapshot(&mut self, ticket: LoadTicket, result: ApiResult<Snapshot>) -> bool {
        if ticket.generation != self.generation {
            log::debug!(
                "Discarding superseded load for student {} ({})",
                ticket.student_id,
                ticket.week.start_param()
            );
            return false;
        }

        match result {
            Ok(snapshot) => {
                log::info!(
                    "Loaded {} bookings for student {} ({} to {})",
                    snapshot.schedules.len(),
                    ticket.student_id,
                    ticket.week.start_param(),
                    ticket.week.end_param()
                );
                self.schedules = snapshot.schedules;
                self.time_slots = snapshot.time_slots;
                self.teachers = snapshot
                    .teachers
                    .into_iter()
                    .filter(|t| t.is_active)
                    .collect();
                self.phase = LoadPhase::Ready;
                true
            }
            Err(err) => {
                log::error!(
                    "Schedule load for student {} failed: {}",
                    ticket.student_id,
                    err
                );
                self.clear_snapshot();
                self.phase = LoadPhase::Failed(LOAD_FAILED.to_string());
                false
            }
        }
    }

    fn clear_snapshot(&mut self) {
        self.schedules.clear();
        self.time_slots.clear();
        self.teachers.clear();
    }

    /// Handles a drop on the cell identified by `target_id` (`"{day}-{slot}"`).
    pub fn handle_drop<A>(&mut self, api: &A, booking_id: i64, target_id: &str) -> DropOutcome
    where
        A: ScheduleApi + Sync + ?Sized,
    {
        match SlotKey::parse(target_id) {
            Ok(target) => self.move_booking(api, booking_id, &target),
            Err(err) => {
                log::warn!("Ignoring drop of booking {}: {}", booking_id, err);
                DropOutcome::Ignored
            }
        }
    }

    pub fn move_booking<A>(&mut self, api: &A, booking_id: i64, target: &SlotKey) -> DropOutcome
    where
        A: ScheduleApi + Sync + ?Sized,
    {
        let slot = match self.plan_move(booking_id, target) {
            Ok(slot) => slot,
            Err(outcome) => return outcome,
        };

        let outcome = self.finish_move(booking_id, &slot, api.move_schedule(booking_id, &slot));
        if outcome == DropOutcome::Moved {
            self.load(api);
        }
        outcome
    }

    /// Checks a drop against the loaded week. `Err` carries the outcome when
    /// nothing needs to be sent, e.g. a conflict.
    pub fn plan_move(&mut self, booking_id: i64, target: &SlotKey) -> Result<SlotMove, DropOutcome> {
        if !self.is_ready() || self.booking(booking_id).is_none() {
            return Err(DropOutcome::Ignored);
        }

        if let Some(occupant) = self.schedule_at(target.day_of_week, &target.time_slot) {
            if occupant.id != booking_id {
                log::warn!(
                    "Rejected move of booking {} to {}: occupied by booking {}",
                    booking_id,
                    target,
                    occupant.id
                );
                self.error = Some(SLOT_OCCUPIED.to_string());
                return Err(DropOutcome::Conflict);
            }
        }

        Ok(SlotMove {
            day_of_week: target.day_of_week,
            time_slot: target.time_slot.clone(),
        })
    }

    /// Records the server's answer to a move. On `Moved` the caller reloads.
    pub fn finish_move(
        &mut self,
        booking_id: i64,
        slot: &SlotMove,
        result: ApiResult<()>,
    ) -> DropOutcome {
        match result {
            Ok(()) => {
                log::info!(
                    "Moved booking {} to day {} at {}",
                    booking_id,
                    slot.day_of_week,
                    slot.time_slot
                );
                self.error = None;
                DropOutcome::Moved
            }
            Err(err) => {
                log::error!("Failed to move booking {}: {}", booking_id, err);
                let message = err.user_message(MOVE_FAILED);
                self.error = Some(message.clone());
                DropOutcome::Failed(message)
            }
        }
    }

    pub fn form(&self) -> Option<&BookingForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut BookingForm> {
        self.form.as_mut()
    }

    /// The open form together with the choices it offers.
    pub fn form_parts(&mut self) -> Option<(&mut BookingForm, &[Teacher], &[TimeSlot])> {
        let form = self.form.as_mut()?;
        Some((form, &self.teachers, &self.time_slots))
    }

    pub fn open_new_form(&mut self) {
        self.form = Some(BookingForm::create(self.student_id, &self.week));
    }

    /// Opens the form pre-populated from `booking_id`. Returns false if the
    /// booking is not in the loaded week.
    pub fn open_edit_form(&mut self, booking_id: i64) -> bool {
        let Some(item) = self.booking(booking_id) else {
            return false;
        };
        self.form = Some(BookingForm::edit(item, &self.week));
        true
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Sends the open form. On failure the form stays open with the error.
    pub fn submit_form<A>(&mut self, api: &A) -> SaveOutcome
    where
        A: ScheduleApi + Sync + ?Sized,
    {
        let pending = match self.begin_submit() {
            Ok(pending) => pending,
            Err(outcome) => return outcome,
        };

        let outcome = self.finish_submit(pending.mode, pending.send(api));
        if outcome == SaveOutcome::Saved {
            self.load(api);
        }
        outcome
    }

    /// Validates the open form and marks it as saving.
    pub fn begin_submit(&mut self) -> Result<PendingSave, SaveOutcome> {
        let Some(form) = self.form.as_mut() else {
            return Err(SaveOutcome::NoForm);
        };
        if form.saving {
            return Err(SaveOutcome::InFlight);
        }

        if let Err(message) = form.draft.validate() {
            form.error = Some(message.clone());
            return Err(SaveOutcome::Invalid(message));
        }

        form.error = None;
        form.saving = true;
        Ok(PendingSave {
            mode: form.mode,
            draft: form.draft.clone(),
        })
    }

    /// Records the server's answer to a save. A success closes the form it
    /// came from and the caller reloads; a failure goes back into that form,
    /// or to the banner if the form was closed meanwhile.
    pub fn finish_submit(&mut self, mode: FormMode, result: ApiResult<()>) -> SaveOutcome {
        let form = self.form.as_mut().filter(|form| form.mode == mode);

        match result {
            Ok(()) => {
                log::info!("Saved booking ({:?}) for student {}", mode, self.student_id);
                if form.is_some() {
                    self.form = None;
                }
                self.error = None;
                SaveOutcome::Saved
            }
            Err(err) => {
                log::error!("Failed to save booking ({:?}): {}", mode, err);
                let message = err.user_message(SAVE_FAILED);
                match form {
                    Some(form) => {
                        form.saving = false;
                        form.error = Some(message.clone());
                    }
                    None => self.error = Some(message.clone()),
                }
                SaveOutcome::Failed(message)
            }
        }
    }

    /// Asks for confirmation before deleting. Returns false for unknown ids.
    pub fn request_delete(&mut self, booking_id: i64) -> bool {
        if self.booking(booking_id).is_none() {
            return false;
        }
        self.pending_delete = Some(booking_id);
        true
    }

    pub fn pending_delete(&self) -> Option<&ScheduleItem> {
        self.pending_delete.and_then(|id| self.booking(id))
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Deletes the booking confirmed through [`Self::request_delete`].
    pub fn confirm_delete<A>(&mut self, api: &A) -> DeleteOutcome
    where
        A: ScheduleApi + Sync + ?Sized,
    {
        let Some(booking_id) = self.take_pending_delete() else {
            return DeleteOutcome::NothingPending;
        };

        let outcome = self.finish_delete(booking_id, api.delete_schedule(booking_id));
        if outcome == DeleteOutcome::Deleted {
            self.load(api);
        }
        outcome
    }

    /// Hands out the confirmed booking id once.
    pub fn take_pending_delete(&mut self) -> Option<i64> {
        self.pending_delete.take()
    }

    /// Records the server's answer to a delete. On `Deleted` the caller reloads.
    pub fn finish_delete(&mut self, booking_id: i64, result: ApiResult<()>) -> DeleteOutcome {
        match result {
            Ok(()) => {
                log::info!("Deleted booking {}", booking_id);
                self.error = None;
                DeleteOutcome::Deleted
            }
            Err(err) => {
                log::error!("Failed to delete booking {}: {}", booking_id, err);
                let message = err.user_message(DELETE_FAILED);
                self.error = Some(message.clone());
                DeleteOutcome::Failed(message)
            }
        }
    }
}

fn join_fetch<T>(handle: ScopedJoinHandle<'_, ApiResult<T>>) -> ApiResult<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(ApiError::Network("fetch worker panicked".to_string())))
}
