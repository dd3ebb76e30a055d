use egui::{Align, Key, Layout, RichText};

use crate::services::session::{format_countdown, LoginFlow};
use crate::ui_egui::theme::GridTheme;

/// What the user did on the login screen this frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoginViewResponse {
    pub submit: bool,
    pub username_changed: bool,
    /// The username field lost focus; time to consult the lock status.
    pub username_left: bool,
}

pub struct LoginView;

impl LoginView {
    pub fn show(ui: &mut egui::Ui, login: &mut LoginFlow, theme: &GridTheme) -> LoginViewResponse {
        let mut response = LoginViewResponse::default();

        ui.with_layout(Layout::top_down(Align::Center), |ui| {
            ui.add_space(ui.available_height() * 0.2);
            ui.heading("Tutor Desk");
            ui.label(RichText::new("Sign in to manage schedules").color(theme.text_secondary));
            ui.add_space(20.0);

            ui.allocate_ui(egui::vec2(320.0, 0.0), |ui| {
                ui.vertical(|ui| {
                    ui.label("Username");
                    let username = ui.add(
                        egui::TextEdit::singleline(&mut login.username)
                            .hint_text("Username")
                            .desired_width(f32::INFINITY),
                    );
                    response.username_changed = username.changed();
                    response.username_left = username.lost_focus();

                    ui.add_space(8.0);
                    ui.label("Password");
                    let password = ui.add(
                        egui::TextEdit::singleline(&mut login.password)
                            .password(true)
                            .hint_text("Password")
                            .desired_width(f32::INFINITY),
                    );
                    let enter_pressed =
                        password.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

                    ui.add_space(12.0);

                    if let Some(message) = login.error() {
                        ui.label(RichText::new(message).color(theme.drop_conflict));
                    }

                    if let Some(secs) = login.lockout_remaining_secs() {
                        ui.label(
                            RichText::new(format!("Try again in {}", format_countdown(secs)))
                                .strong()
                                .color(theme.drop_conflict),
                        );
                    }

                    ui.add_space(8.0);
                    let ready = !login.is_locked() && !login.is_submitting();
                    let label = if login.is_submitting() { "Signing in…" } else { "Sign In" };
                    let clicked = ui
                        .add_enabled(
                            ready,
                            egui::Button::new(label).min_size(egui::vec2(320.0, 28.0)),
                        )
                        .clicked();

                    response.submit = ready && (clicked || enter_pressed);
                });
            });
        });

        response
    }
}
