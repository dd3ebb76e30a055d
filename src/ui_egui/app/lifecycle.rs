use std::time::Duration;

use chrono::{DateTime, Local, Utc};

use super::confirm::ConfirmDialogState;
use super::jobs::{Job, JobQueue, JobResult};
use super::toast::ToastManager;
use super::TutorDeskApp;
use crate::models::schedule::WeekWindow;
use crate::models::session::AuthState;
use crate::models::settings::AppConfig;
use crate::services::api::ApiClient;
use crate::services::schedule::drag::{DragEvent, DragSession, KeyboardDragAdapter};
use crate::services::schedule::ScheduleEditor;
use crate::services::session::{LockoutTick, LoginFlow, LoginOutcome, SessionGuard};
use crate::services::storage::SqliteStorage;
use crate::ui_egui::drag::PointerDragAdapter;
use crate::ui_egui::theme::GridTheme;
use crate::ui_egui::views::login_view::LoginView;

const LOCKOUT_TICK: Duration = Duration::from_secs(1);

impl TutorDeskApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: &AppConfig,
        api: ApiClient,
        storage: SqliteStorage,
    ) -> Self {
        let theme = GridTheme::from_system();
        theme.apply_to_context(&cc.egui_ctx);

        let week = WeekWindow::containing(Local::now().date_naive());
        let student_id = config.default_student_id;
        log::info!(
            "Using API at {} (student {:?}, week {})",
            api.base_url(),
            student_id,
            week.start_param()
        );

        Self {
            jobs: JobQueue::new(api),
            session: SessionGuard::new(storage, config),
            login: LoginFlow::new(),
            editor: ScheduleEditor::new(student_id.unwrap_or_default(), week),
            student: None,
            student_input: student_id.map(|id| id.to_string()).unwrap_or_default(),
            student_error: None,
            student_lookup: None,
            drag: DragSession::new(),
            pointer_drag: PointerDragAdapter::new(),
            keyboard_drag: KeyboardDragAdapter::new(),
            keyboard_cursor: None,
            theme,
            toast_manager: ToastManager::new(),
            confirm_dialog: ConfirmDialogState::new(),
        }
    }

    pub(super) fn handle_update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Utc::now();
        for result in self.jobs.poll() {
            self.apply_job_result(ctx, result, now);
        }

        if self.session.state() == AuthState::Uninitialized {
            self.restore_session(ctx, now);
        }

        if self.session.is_loading() {
            render_startup(ctx);
        } else {
            if let Some(token) = self.session.due_revalidation_at(now) {
                self.jobs.spawn(ctx, Job::Revalidate { token });
            }
            if let Some(wait) = self.session.next_revalidation_in(now) {
                ctx.request_repaint_after(wait);
            }

            // Anything short of a confirmed session gets the login screen
            if self.session.is_authenticated() {
                self.render_schedule_screen(ctx);
            } else {
                self.render_login_screen(ctx, now);
            }

            self.handle_confirm_dialog(ctx);
        }

        // Render toast notifications (last, so they appear on top)
        self.toast_manager.render(ctx, &self.theme);
    }

    pub(super) fn handle_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.session.shutdown();
        log::info!("Tutor Desk shutting down");
    }

    fn restore_session(&mut self, ctx: &egui::Context, now: DateTime<Utc>) {
        match self.session.begin_initialize_at(now) {
            Some(token) => self.jobs.spawn(ctx, Job::RestoreSession { token }),
            None => self.sync_api_token(),
        }
    }

    fn apply_job_result(&mut self, ctx: &egui::Context, result: JobResult, now: DateTime<Utc>) {
        match result {
            JobResult::RestoreSession(result) => {
                if self.session.finish_initialize_at(now, result) == AuthState::Authenticated {
                    self.on_signed_in(ctx);
                } else {
                    self.sync_api_token();
                }
            }
            JobResult::Revalidate { token, result } => {
                if self.session.finish_revalidation(&token, result) {
                    self.on_signed_out();
                    self.toast_manager
                        .warning("Your session is no longer valid. Please sign in again.");
                }
            }
            JobResult::Login { username, reply } => {
                let outcome = self
                    .login
                    .finish_submit_at(now, &mut self.session, &username, reply);
                if outcome == LoginOutcome::SignedIn {
                    self.on_signed_in(ctx);
                }
            }
            JobResult::LockStatus { username, status } => {
                self.login.apply_lock_status_at(now, &username, status)
            }
            JobResult::LookupStudent { student_id, result } => {
                self.finish_student_lookup(ctx, student_id, result)
            }
            JobResult::LoadSchedule { ticket, result } => {
                self.editor.apply_snapshot(ticket, result);
            }
            JobResult::SaveBooking { mode, result } => self.finish_save(ctx, mode, result),
            JobResult::MoveBooking {
                booking_id,
                slot,
                result,
            } => self.finish_move(ctx, booking_id, &slot, result),
            JobResult::DeleteBooking {
                booking_id,
                label,
                result,
            } => self.finish_delete(ctx, booking_id, &label, result),
        }
    }

    fn render_login_screen(&mut self, ctx: &egui::Context, now: DateTime<Utc>) {
        match self.login.tick_at(now) {
            Some(LockoutTick::Locked { .. }) => ctx.request_repaint_after(LOCKOUT_TICK),
            Some(LockoutTick::Unlocked) => {
                self.toast_manager.info("The account is unlocked. You can sign in again.")
            }
            None => {}
        }

        let response = egui::CentralPanel::default()
            .show(ctx, |ui| LoginView::show(ui, &mut self.login, &self.theme))
            .inner;

        if response.username_changed {
            self.login.on_username_changed();
        }
        if response.username_left {
            if let Some(username) = self.login.lock_status_target() {
                self.jobs.spawn(ctx, Job::LockStatus { username });
            }
        }
        if response.submit {
            if let Ok(credentials) = self.login.begin_submit() {
                self.jobs.spawn(ctx, Job::Login(credentials));
            }
        }
    }

    pub(super) fn on_signed_in(&mut self, ctx: &egui::Context) {
        self.sync_api_token();
        if let Some(user) = self.session.user() {
            self.toast_manager
                .success(format!("Signed in as {}", user.display_name()));
        }

        if self.student.is_some() {
            self.reload_schedule(ctx);
        } else if let Ok(student_id @ 1..) = self.student_input.trim().parse::<i64>() {
            self.select_student(ctx, student_id);
        }
    }

    pub(super) fn on_signed_out(&mut self) {
        self.sync_api_token();
        self.drag.handle(DragEvent::Cancel);
        self.keyboard_cursor = None;
        self.editor.reset();
        self.confirm_dialog.take_action();
        self.login.reset();
    }

    fn sync_api_token(&self) {
        self.jobs
            .api()
            .set_token(self.session.token().map(str::to_string));
    }
}

fn render_startup(ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.centered_and_justified(|ui| {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Checking saved session…");
            });
        });
    });
}
