use egui::{Align, Align2, CursorIcon, FontId, Id, LayerId, Layout, Order, RichText, Sense, Stroke, Vec2};

use super::ScheduleRequest;
use crate::models::schedule::{day_name, ScheduleItem, SlotKey, Student, DAYS_PER_WEEK};
use crate::services::schedule::drag::DragSession;
use crate::services::schedule::{grid, GridCell, LoadPhase, ScheduleEditor};
use crate::ui_egui::drag::PointerDragAdapter;
use crate::ui_egui::theme::GridTheme;

const TIME_COLUMN_WIDTH: f32 = 64.0;
const CELL_WIDTH: f32 = 132.0;
const CELL_HEIGHT: f32 = 44.0;
const HEADER_HEIGHT: f32 = 36.0;

/// Everything the schedule screen needs for one frame.
pub struct ScheduleView<'a> {
    pub editor: &'a ScheduleEditor,
    pub student_input: &'a mut String,
    /// Accepted student whose week is shown.
    pub student: Option<&'a Student>,
    /// Why the last student lookup was refused.
    pub student_error: Option<&'a str>,
    pub looking_up: bool,
    /// Some request is still waiting for the server.
    pub busy: bool,
    pub drag: &'a mut DragSession,
    pub pointer: &'a mut PointerDragAdapter,
    /// Keyboard cursor, shown once the user navigates with the arrow keys.
    pub cursor: Option<SlotKey>,
    pub user_label: &'a str,
    pub theme: &'a GridTheme,
}

impl<'a> ScheduleView<'a> {
    pub fn show(mut self, ui: &mut egui::Ui) -> Vec<ScheduleRequest> {
        let editor = self.editor;
        let mut requests = Vec::new();

        self.toolbar(ui, &mut requests);
        ui.separator();

        if let Some(message) = editor.error() {
            error_banner(ui, message, self.theme, &mut requests);
        }

        match editor.phase() {
            _ if self.student.is_none() => {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        RichText::new("Enter a student ID to view the weekly schedule.")
                            .color(self.theme.text_secondary),
                    );
                });
            }
            LoadPhase::Idle | LoadPhase::Loading => {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
            }
            LoadPhase::Failed(message) => {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.label(RichText::new(message).color(self.theme.drop_conflict));
                    ui.add_space(8.0);
                    if ui.button("Retry").clicked() {
                        requests.push(ScheduleRequest::Reload);
                    }
                });
            }
            LoadPhase::Ready => self.grid(ui, &mut requests),
        }

        requests
    }

    fn toolbar(&mut self, ui: &mut egui::Ui, requests: &mut Vec<ScheduleRequest>) {
        ui.horizontal(|ui| {
            ui.label("Student ID");
            let input = ui.add(
                egui::TextEdit::singleline(&mut *self.student_input)
                    .desired_width(80.0)
                    .hint_text("e.g. 42"),
            );
            let submitted = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let open = ui.add_enabled(!self.looking_up, egui::Button::new("Open"));
            if open.clicked() || (submitted && !self.looking_up) {
                if let Ok(id @ 1..) = self.student_input.trim().parse::<i64>() {
                    requests.push(ScheduleRequest::SelectStudent(id));
                }
            }

            if self.looking_up {
                ui.spinner();
            } else if let Some(message) = self.student_error {
                ui.label(RichText::new(message).color(self.theme.drop_conflict));
            } else if let Some(student) = self.student {
                ui.label(RichText::new(student.display_name()).strong());
            }

            ui.separator();

            if ui.button("◀").on_hover_text("Previous week").clicked() {
                requests.push(ScheduleRequest::PreviousWeek);
            }
            if ui.button("This week").clicked() {
                requests.push(ScheduleRequest::CurrentWeek);
            }
            if ui.button("▶").on_hover_text("Next week").clicked() {
                requests.push(ScheduleRequest::NextWeek);
            }
            ui.label(RichText::new(self.editor.week().label()).strong());

            ui.separator();

            let loading = self.editor.is_loading();
            if ui
                .add_enabled(self.student.is_some() && !loading, egui::Button::new("⟳ Reload"))
                .clicked()
            {
                requests.push(ScheduleRequest::Reload);
            }
            if ui
                .add_enabled(self.editor.is_ready(), egui::Button::new("+ New Booking"))
                .clicked()
            {
                requests.push(ScheduleRequest::NewBooking);
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button("Sign Out").clicked() {
                    requests.push(ScheduleRequest::LogOut);
                }
                ui.label(RichText::new(self.user_label).color(self.theme.text_secondary));
                if self.busy {
                    ui.spinner();
                }
            });
        });
    }

    fn grid(&mut self, ui: &mut egui::Ui, requests: &mut Vec<ScheduleRequest>) {
        let editor = self.editor;
        let Some(rows) = editor.grid() else {
            return;
        };

        let unplaced = grid::unplaced(editor.time_slots(), editor.schedules());
        if !unplaced.is_empty() {
            ui.label(
                RichText::new(format!(
                    "{} booking(s) fall outside the time grid and are not shown",
                    unplaced.len()
                ))
                .color(self.theme.text_secondary),
            );
        }

        let pointer_pos = ui.ctx().pointer_hover_pos();
        self.pointer.begin_frame();

        egui::ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
            ui.spacing_mut().item_spacing = Vec2::ZERO;

            ui.horizontal(|ui| {
                self.header_cell(ui, TIME_COLUMN_WIDTH, "Time".to_string());
                for day in 1..=DAYS_PER_WEEK {
                    let date = editor
                        .week()
                        .date_of(day)
                        .map(|d| d.format(" %m/%d").to_string())
                        .unwrap_or_default();
                    self.header_cell(ui, CELL_WIDTH, format!("{}{}", day_name(day), date));
                }
            });

            for row in &rows {
                ui.horizontal(|ui| {
                    let (rect, _) =
                        ui.allocate_exact_size(Vec2::new(TIME_COLUMN_WIDTH, CELL_HEIGHT), Sense::hover());
                    let painter = ui.painter();
                    painter.rect_filled(rect, 0.0, self.theme.header_background);
                    painter.rect_stroke(rect, 0.0, Stroke::new(1.0, self.theme.cell_border));
                    painter.text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        &row.slot.display_time,
                        FontId::proportional(13.0),
                        self.theme.text_secondary,
                    );

                    for cell in &row.cells {
                        self.cell(ui, cell, pointer_pos, requests);
                    }
                });
            }
        });

        if let Some(intent) = self.pointer.end_frame(self.drag) {
            requests.push(ScheduleRequest::Move(intent));
        }

        if let Some(booking_id) = self.drag.active_booking() {
            ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
            if let (Some(pos), Some(item)) = (pointer_pos, editor.booking(booking_id)) {
                drag_ghost(ui.ctx(), pos, item, self.theme);
            }
        }
    }

    fn header_cell(&self, ui: &mut egui::Ui, width: f32, label: String) {
        let (rect, _) = ui.allocate_exact_size(Vec2::new(width, HEADER_HEIGHT), Sense::hover());
        let painter = ui.painter();
        painter.rect_filled(rect, 0.0, self.theme.header_background);
        painter.rect_stroke(rect, 0.0, Stroke::new(1.0, self.theme.cell_border));
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            label,
            FontId::proportional(14.0),
            self.theme.text_primary,
        );
    }

    fn cell(
        &mut self,
        ui: &mut egui::Ui,
        cell: &GridCell<'_>,
        pointer_pos: Option<egui::Pos2>,
        requests: &mut Vec<ScheduleRequest>,
    ) {
        let (rect, response) =
            ui.allocate_exact_size(Vec2::new(CELL_WIDTH, CELL_HEIGHT), Sense::click_and_drag());
        let dragged_id = self.drag.active_booking();
        let painter = ui.painter();

        painter.rect_filled(rect, 0.0, self.theme.cell_background);
        painter.rect_stroke(rect, 0.0, Stroke::new(1.0, self.theme.cell_border));

        if let Some(item) = cell.booking {
            let inner = rect.shrink(3.0);
            let fill = if dragged_id == Some(item.id) {
                self.theme.booking_fill.gamma_multiply(0.4)
            } else {
                self.theme.booking_fill
            };
            painter.rect_filled(inner, 4.0, fill);
            painter.text(
                inner.left_top() + Vec2::new(6.0, 4.0),
                Align2::LEFT_TOP,
                item.subject_label(),
                FontId::proportional(13.0),
                self.theme.booking_text,
            );
            painter.text(
                inner.left_bottom() + Vec2::new(6.0, -4.0),
                Align2::LEFT_BOTTOM,
                format!("{} · {}", item.teacher_label(), item.lesson_type.label()),
                FontId::proportional(11.0),
                self.theme.text_secondary,
            );
        }

        if self.drag.hovered() == Some(&cell.key) {
            let occupied_by_other = cell
                .booking
                .is_some_and(|item| Some(item.id) != dragged_id);
            let color = if occupied_by_other {
                self.theme.drop_conflict
            } else {
                self.theme.drop_target
            };
            painter.rect_stroke(rect.shrink(1.0), 4.0, Stroke::new(2.0, color));
        } else if self.cursor.as_ref() == Some(&cell.key) {
            painter.rect_stroke(rect.shrink(1.0), 4.0, Stroke::new(2.0, self.theme.cursor));
        }

        self.pointer.observe_cell(
            self.drag,
            &response,
            rect,
            &cell.key,
            cell.booking.map(|item| item.id),
            pointer_pos,
        );

        if self.drag.is_dragging() {
            return;
        }

        if let Some(item) = cell.booking {
            let response = response.on_hover_text(booking_tooltip(item));
            if response.clicked() {
                requests.push(ScheduleRequest::EditBooking(item.id));
            }
            response.context_menu(|ui| {
                if ui.button("Edit").clicked() {
                    requests.push(ScheduleRequest::EditBooking(item.id));
                    ui.close_menu();
                }
                if ui.button("Delete").clicked() {
                    requests.push(ScheduleRequest::DeleteBooking(item.id));
                    ui.close_menu();
                }
            });
        } else if response.double_clicked() {
            requests.push(ScheduleRequest::NewBookingAt(cell.key.clone()));
        }
    }
}

fn error_banner(
    ui: &mut egui::Ui,
    message: &str,
    theme: &GridTheme,
    requests: &mut Vec<ScheduleRequest>,
) {
    egui::Frame::none()
        .fill(theme.drop_conflict.gamma_multiply(0.15))
        .rounding(6.0)
        .inner_margin(egui::Margin::symmetric(12.0, 6.0))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("⚠ {}", message)).color(theme.drop_conflict));
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.small_button("✕").on_hover_text("Dismiss").clicked() {
                        requests.push(ScheduleRequest::DismissError);
                    }
                });
            });
        });
    ui.add_space(4.0);
}

fn drag_ghost(ctx: &egui::Context, pos: egui::Pos2, item: &ScheduleItem, theme: &GridTheme) {
    let painter = ctx.layer_painter(LayerId::new(Order::Tooltip, Id::new("booking_drag_ghost")));
    let rect = egui::Rect::from_min_size(pos + Vec2::new(12.0, 12.0), Vec2::new(CELL_WIDTH - 6.0, 24.0));
    painter.rect_filled(rect, 4.0, theme.booking_fill.gamma_multiply(0.85));
    painter.text(
        rect.left_center() + Vec2::new(6.0, 0.0),
        Align2::LEFT_CENTER,
        item.subject_label(),
        FontId::proportional(13.0),
        theme.booking_text,
    );
}

fn booking_tooltip(item: &ScheduleItem) -> String {
    let mut lines = vec![
        format!(
            "{} {}",
            day_name(item.day_of_week),
            item.time_slot.get(..5).unwrap_or(&item.time_slot)
        ),
        format!("{} minutes · {}", item.duration_minutes, item.lesson_type.label()),
        format!("Teacher: {}", item.teacher_label()),
        format!("Status: {}", item.status.label()),
    ];
    if let Some(classroom) = item.classroom.as_deref().filter(|c| !c.trim().is_empty()) {
        lines.push(format!("Classroom: {}", classroom));
    }
    if let Some(notes) = item.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        lines.push(format!("Notes: {}", notes));
    }
    lines.push("Drag to move · right-click for more".to_string());
    lines.join("\n")
}
