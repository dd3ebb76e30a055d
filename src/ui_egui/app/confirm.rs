//! Modal confirmation for destructive actions.

use egui::{Color32, Context, RichText};

use crate::ui_egui::theme::GridTheme;

/// Action waiting for the user's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Delete a booking from the loaded week
    DeleteBooking {
        /// Server id of the booking
        booking_id: i64,
        /// Subject, day and time shown in the prompt
        label: String,
    },
    /// End the session and clear the stored sign-in
    LogOut,
}

impl ConfirmAction {
    pub fn title(&self) -> &'static str {
        match self {
            ConfirmAction::DeleteBooking { .. } => "Delete Booking",
            ConfirmAction::LogOut => "Sign Out",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ConfirmAction::DeleteBooking { label, .. } => {
                format!("Delete the booking \"{}\"? It cannot be restored.", label)
            }
            ConfirmAction::LogOut => "Sign out of Tutor Desk?".to_string(),
        }
    }

    pub fn confirm_text(&self) -> &'static str {
        match self {
            ConfirmAction::DeleteBooking { .. } => "Delete",
            ConfirmAction::LogOut => "Sign Out",
        }
    }

    pub fn is_destructive(&self) -> bool {
        matches!(self, ConfirmAction::DeleteBooking { .. })
    }
}

/// What the dialog did this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmResult {
    /// User confirmed; collect the action with `take_action`
    Confirmed,
    /// User cancelled or closed the dialog
    Cancelled,
    /// Still open, or nothing to confirm
    Pending,
}

#[derive(Debug, Default)]
pub struct ConfirmDialogState {
    pending_action: Option<ConfirmAction>,
}

impl ConfirmDialogState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, action: ConfirmAction) {
        self.pending_action = Some(action);
    }

    pub fn is_open(&self) -> bool {
        self.pending_action.is_some()
    }

    /// Shows the dialog. Enter confirms and Escape cancels. A confirmed
    /// action stays pending until [`Self::take_action`] collects it.
    pub fn render(&mut self, ctx: &Context, theme: &GridTheme) -> ConfirmResult {
        let Some(action) = &self.pending_action else {
            return ConfirmResult::Pending;
        };

        let (enter, escape) =
            ctx.input(|i| (i.key_pressed(egui::Key::Enter), i.key_pressed(egui::Key::Escape)));
        let mut result = match (enter, escape) {
            (_, true) => ConfirmResult::Cancelled,
            (true, false) => ConfirmResult::Confirmed,
            _ => ConfirmResult::Pending,
        };

        egui::Window::new(action.title())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.set_width(360.0);
                ui.add_space(6.0);
                let text = RichText::new(action.message()).color(theme.text_primary);
                ui.label(if action.is_destructive() { text.strong() } else { text });
                ui.add_space(12.0);

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let mut confirm = egui::Button::new(
                        RichText::new(action.confirm_text()).color(Color32::WHITE),
                    );
                    confirm = if action.is_destructive() {
                        confirm.fill(theme.drop_conflict)
                    } else {
                        confirm.fill(theme.drop_target)
                    };

                    if ui.add(confirm).clicked() {
                        result = ConfirmResult::Confirmed;
                    }
                    if ui.button("Cancel").clicked() {
                        result = ConfirmResult::Cancelled;
                    }
                });
            });

        if result == ConfirmResult::Cancelled {
            self.pending_action = None;
        }
        result
    }

    pub fn take_action(&mut self) -> Option<ConfirmAction> {
        self.pending_action.take()
    }
}
