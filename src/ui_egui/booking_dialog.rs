use egui::{Color32, RichText};

use crate::models::schedule::{
    day_name, LessonType, ScheduleStatus, Teacher, TimeSlot, DAYS_PER_WEEK,
};
use crate::services::schedule::{BookingForm, FormMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingDialogResult {
    Open,
    Save,
    Cancel,
    Delete { booking_id: i64 },
}

/// Renders the create/edit booking window.
pub fn render_booking_dialog(
    ctx: &egui::Context,
    form: &mut BookingForm,
    teachers: &[Teacher],
    time_slots: &[TimeSlot],
) -> BookingDialogResult {
    let mut result = BookingDialogResult::Open;
    let mut window_open = true;

    egui::Window::new(form.title())
        .open(&mut window_open)
        .collapsible(false)
        .resizable(false)
        .default_width(420.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            if let Some(error) = &form.error {
                ui.colored_label(Color32::RED, RichText::new(error).strong());
                ui.add_space(8.0);
            }

            egui::Grid::new("booking_form_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    render_slot_fields(ui, form, time_slots);
                    render_lesson_fields(ui, form, teachers);
                });

            ui.add_space(8.0);
            ui.label("Notes");
            ui.add(
                egui::TextEdit::multiline(&mut form.draft.notes)
                    .desired_rows(3)
                    .desired_width(f32::INFINITY),
            );

            ui.add_space(12.0);
            ui.separator();
            ui.horizontal(|ui| {
                let label = if form.saving { "Saving…" } else { "Save" };
                if ui.add_enabled(!form.saving, egui::Button::new(label)).clicked() {
                    result = BookingDialogResult::Save;
                }
                if ui.button("Cancel").clicked() {
                    result = BookingDialogResult::Cancel;
                }
                if let FormMode::Edit { booking_id } = form.mode {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let delete = egui::Button::new(RichText::new("Delete").color(Color32::WHITE))
                            .fill(Color32::from_rgb(180, 60, 60));
                        if ui.add(delete).clicked() {
                            result = BookingDialogResult::Delete { booking_id };
                        }
                    });
                }
            });
        });

    if !window_open {
        result = BookingDialogResult::Cancel;
    }

    result
}

fn render_slot_fields(ui: &mut egui::Ui, form: &mut BookingForm, time_slots: &[TimeSlot]) {
    let draft = &mut form.draft;

    ui.label("Day");
    egui::ComboBox::from_id_source("booking_day_combo")
        .selected_text(day_name(draft.day_of_week))
        .show_ui(ui, |ui| {
            for day in 1..=DAYS_PER_WEEK {
                ui.selectable_value(&mut draft.day_of_week, day, day_name(day));
            }
        });
    ui.end_row();

    ui.label("Time");
    let selected_time = time_slots
        .iter()
        .find(|slot| slot.time_slot == draft.time_slot)
        .map(|slot| slot.display_time.clone())
        .unwrap_or_else(|| draft.time_slot.clone());
    egui::ComboBox::from_id_source("booking_time_combo")
        .selected_text(selected_time)
        .show_ui(ui, |ui| {
            for slot in time_slots {
                ui.selectable_value(&mut draft.time_slot, slot.time_slot.clone(), &slot.display_time);
            }
        });
    ui.end_row();

    ui.label("Duration");
    ui.add(
        egui::DragValue::new(&mut draft.duration_minutes)
            .range(15..=240)
            .speed(15)
            .suffix(" min"),
    );
    ui.end_row();
}

fn render_lesson_fields(ui: &mut egui::Ui, form: &mut BookingForm, teachers: &[Teacher]) {
    let is_new = form.is_new();
    let draft = &mut form.draft;

    ui.label("Lesson type");
    ui.horizontal(|ui| {
        for lesson_type in LessonType::ALL {
            ui.radio_value(&mut draft.lesson_type, lesson_type, lesson_type.label());
        }
    });
    ui.end_row();

    ui.label("Teacher");
    let selected_teacher = draft
        .teacher_id
        .and_then(|id| teachers.iter().find(|t| t.id == id))
        .map(|t| t.name.clone())
        .unwrap_or_else(|| "Unassigned".to_string());
    egui::ComboBox::from_id_source("booking_teacher_combo")
        .selected_text(selected_teacher)
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut draft.teacher_id, None, "Unassigned");
            for teacher in teachers {
                ui.selectable_value(&mut draft.teacher_id, Some(teacher.id), &teacher.name);
            }
        });
    ui.end_row();

    ui.label("Subject");
    ui.text_edit_singleline(&mut draft.subject);
    ui.end_row();

    ui.label("Classroom");
    ui.text_edit_singleline(&mut draft.classroom);
    ui.end_row();

    if !is_new {
        ui.label("Status");
        let mut status = draft.status.unwrap_or_default();
        egui::ComboBox::from_id_source("booking_status_combo")
            .selected_text(status.label())
            .show_ui(ui, |ui| {
                for option in ScheduleStatus::ALL {
                    ui.selectable_value(&mut status, option, option.label());
                }
            });
        draft.status = Some(status);
        ui.end_row();
    }
}
