mod confirm;
mod jobs;
mod lifecycle;
mod requests;
mod shortcuts;
mod toast;

use self::confirm::ConfirmDialogState;
use self::jobs::JobQueue;
use self::toast::ToastManager;
use crate::models::schedule::{SlotKey, Student};
use crate::services::schedule::drag::{DragSession, KeyboardDragAdapter};
use crate::services::schedule::ScheduleEditor;
use crate::services::session::{LoginFlow, SessionGuard};
use crate::services::storage::SqliteStorage;
use crate::ui_egui::drag::PointerDragAdapter;
use crate::ui_egui::theme::GridTheme;

pub struct TutorDeskApp {
    /// Runs every request against the shared REST client off the UI thread
    jobs: JobQueue,
    session: SessionGuard<SqliteStorage>,
    login: LoginFlow,
    editor: ScheduleEditor,
    /// Student whose week is on screen, once the lookup has accepted them
    student: Option<Student>,
    student_input: String,
    /// Why the last lookup was refused
    student_error: Option<String>,
    /// Id of the lookup in flight; older answers are ignored
    student_lookup: Option<i64>,
    drag: DragSession,
    pointer_drag: PointerDragAdapter,
    keyboard_drag: KeyboardDragAdapter,
    /// Shown after the first arrow-key press
    keyboard_cursor: Option<SlotKey>,
    theme: GridTheme,
    toast_manager: ToastManager,
    confirm_dialog: ConfirmDialogState,
}

impl eframe::App for TutorDeskApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.handle_update(ctx, frame);
    }

    fn on_exit(&mut self, gl: Option<&eframe::glow::Context>) {
        self.handle_exit(gl);
    }
}
