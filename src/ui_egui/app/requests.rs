use chrono::Local;

use super::confirm::{ConfirmAction, ConfirmResult};
use super::jobs::Job;
use super::TutorDeskApp;
use crate::models::schedule::{day_name, SlotMove, Student, WeekWindow};
use crate::services::api::ApiResult;
use crate::services::schedule::drag::{DragEvent, DropIntent};
use crate::services::schedule::{DeleteOutcome, DropOutcome, FormMode, SaveOutcome};
use crate::ui_egui::booking_dialog::{render_booking_dialog, BookingDialogResult};
use crate::ui_egui::views::schedule_view::ScheduleView;
use crate::ui_egui::views::ScheduleRequest;

impl TutorDeskApp {
    pub(super) fn render_schedule_screen(&mut self, ctx: &egui::Context) {
        if !self.editor.is_ready() && self.drag.is_dragging() {
            self.drag.handle(DragEvent::Cancel);
        }

        self.handle_grid_keys(ctx);

        let user_label = self
            .session
            .user()
            .map(|user| user.display_name().to_string())
            .unwrap_or_default();

        let requests = egui::CentralPanel::default()
            .show(ctx, |ui| {
                ScheduleView {
                    editor: &self.editor,
                    student_input: &mut self.student_input,
                    student: self.student.as_ref(),
                    student_error: self.student_error.as_deref(),
                    looking_up: self.student_lookup.is_some(),
                    busy: self.jobs.is_busy(),
                    drag: &mut self.drag,
                    pointer: &mut self.pointer_drag,
                    cursor: self.keyboard_cursor.clone(),
                    user_label: &user_label,
                    theme: &self.theme,
                }
                .show(ui)
            })
            .inner;

        for request in requests {
            self.apply_request(ctx, request);
        }

        self.render_booking_form(ctx);
    }

    fn apply_request(&mut self, ctx: &egui::Context, request: ScheduleRequest) {
        match request {
            ScheduleRequest::PreviousWeek => self.show_week(ctx, self.editor.week().previous()),
            ScheduleRequest::NextWeek => self.show_week(ctx, self.editor.week().next()),
            ScheduleRequest::CurrentWeek => {
                self.show_week(ctx, WeekWindow::containing(Local::now().date_naive()))
            }
            ScheduleRequest::Reload => self.reload_schedule(ctx),
            ScheduleRequest::SelectStudent(student_id) => self.select_student(ctx, student_id),
            ScheduleRequest::NewBooking => self.editor.open_new_form(),
            ScheduleRequest::NewBookingAt(key) => {
                self.editor.open_new_form();
                if let Some(form) = self.editor.form_mut() {
                    form.draft.day_of_week = key.day_of_week;
                    form.draft.time_slot = key.time_slot;
                }
            }
            ScheduleRequest::EditBooking(booking_id) => {
                if !self.editor.open_edit_form(booking_id) {
                    log::warn!("Booking {} is no longer in the loaded week", booking_id);
                }
            }
            ScheduleRequest::DeleteBooking(booking_id) => self.request_delete(booking_id),
            ScheduleRequest::Move(intent) => self.apply_move(ctx, intent),
            ScheduleRequest::DismissError => self.editor.clear_error(),
            ScheduleRequest::LogOut => self.confirm_dialog.request(ConfirmAction::LogOut),
        }
    }

    /// Looks the student up before their week is shown. The current student
    /// stays on screen until the answer arrives.
    pub(super) fn select_student(&mut self, ctx: &egui::Context, student_id: i64) {
        log::info!("Looking up student {}", student_id);
        self.student_lookup = Some(student_id);
        self.student_error = None;
        self.jobs.spawn(ctx, Job::LookupStudent { student_id });
    }

    pub(super) fn finish_student_lookup(
        &mut self,
        ctx: &egui::Context,
        student_id: i64,
        result: Result<Student, String>,
    ) {
        if self.student_lookup != Some(student_id) {
            log::debug!("Ignoring stale lookup of student {}", student_id);
            return;
        }
        self.student_lookup = None;

        match result {
            Ok(student) => {
                self.student_input = student.id.to_string();
                self.student = Some(student);
                self.keyboard_cursor = None;
                self.reload_schedule(ctx);
            }
            Err(message) => self.student_error = Some(message),
        }
    }

    fn show_week(&mut self, ctx: &egui::Context, week: WeekWindow) {
        let student_id = self.student.as_ref().map_or(0, |student| student.id);
        self.editor.set_view(student_id, week);
        self.reload_schedule(ctx);
    }

    /// Reloads the week on screen for the accepted student. Does nothing
    /// after sign-out, so late mutation answers cannot start a load.
    pub(super) fn reload_schedule(&mut self, ctx: &egui::Context) {
        if !self.session.is_authenticated() {
            return;
        }
        let Some(student_id) = self.student.as_ref().map(|student| student.id) else {
            return;
        };
        self.editor.set_view(student_id, self.editor.week());
        let ticket = self.editor.begin_load();
        self.jobs.spawn(ctx, Job::LoadSchedule(ticket));
    }

    pub(super) fn apply_move(&mut self, ctx: &egui::Context, intent: DropIntent) {
        if let Ok(slot) = self.editor.plan_move(intent.booking_id, &intent.target) {
            self.jobs.spawn(
                ctx,
                Job::MoveBooking {
                    booking_id: intent.booking_id,
                    slot,
                },
            );
        }
    }

    pub(super) fn finish_move(
        &mut self,
        ctx: &egui::Context,
        booking_id: i64,
        slot: &SlotMove,
        result: ApiResult<()>,
    ) {
        if self.editor.finish_move(booking_id, slot, result) == DropOutcome::Moved {
            self.toast_manager.success("Booking moved");
            self.reload_schedule(ctx);
        }
    }

    fn request_delete(&mut self, booking_id: i64) {
        if !self.editor.request_delete(booking_id) {
            return;
        }
        if let Some(item) = self.editor.pending_delete() {
            let label = format!(
                "{}, {} {}",
                item.subject_label(),
                day_name(item.day_of_week),
                item.time_slot.get(..5).unwrap_or(&item.time_slot)
            );
            self.confirm_dialog
                .request(ConfirmAction::DeleteBooking { booking_id, label });
        }
    }

    fn render_booking_form(&mut self, ctx: &egui::Context) {
        let Some((form, teachers, time_slots)) = self.editor.form_parts() else {
            return;
        };

        match render_booking_dialog(ctx, form, teachers, time_slots) {
            BookingDialogResult::Open => {}
            BookingDialogResult::Save => {
                if let Ok(pending) = self.editor.begin_submit() {
                    self.jobs.spawn(ctx, Job::SaveBooking(pending));
                }
            }
            BookingDialogResult::Cancel => self.editor.close_form(),
            BookingDialogResult::Delete { booking_id } => self.request_delete(booking_id),
        }
    }

    pub(super) fn finish_save(&mut self, ctx: &egui::Context, mode: FormMode, result: ApiResult<()>) {
        if self.editor.finish_submit(mode, result) == SaveOutcome::Saved {
            self.toast_manager.success("Booking saved");
            self.reload_schedule(ctx);
        }
    }

    /// Handle the confirmation dialog rendering and process confirmed actions
    pub(super) fn handle_confirm_dialog(&mut self, ctx: &egui::Context) {
        match self.confirm_dialog.render(ctx, &self.theme) {
            ConfirmResult::Confirmed => {
                if let Some(action) = self.confirm_dialog.take_action() {
                    self.execute_confirmed_action(ctx, action);
                }
            }
            ConfirmResult::Cancelled => self.editor.cancel_delete(),
            ConfirmResult::Pending => {}
        }
    }

    fn execute_confirmed_action(&mut self, ctx: &egui::Context, action: ConfirmAction) {
        match action {
            ConfirmAction::DeleteBooking { booking_id, label } => {
                if self.editor.take_pending_delete() == Some(booking_id) {
                    self.jobs
                        .spawn(ctx, Job::DeleteBooking { booking_id, label });
                }
            }
            ConfirmAction::LogOut => {
                self.session.logout();
                self.on_signed_out();
                self.toast_manager.info("Signed out");
            }
        }
    }

    pub(super) fn finish_delete(
        &mut self,
        ctx: &egui::Context,
        booking_id: i64,
        label: &str,
        result: ApiResult<()>,
    ) {
        if self.editor.finish_delete(booking_id, result) != DeleteOutcome::Deleted {
            return;
        }

        let editing_deleted = self
            .editor
            .form()
            .is_some_and(|form| form.mode == FormMode::Edit { booking_id });
        if editing_deleted {
            self.editor.close_form();
        }
        self.toast_manager.success(format!("Deleted \"{}\"", label));
        self.reload_schedule(ctx);
    }
}
