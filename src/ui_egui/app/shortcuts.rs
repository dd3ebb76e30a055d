use egui::Key;

use super::TutorDeskApp;
use crate::services::schedule::drag::GridKey;

const GRID_KEYS: [(Key, GridKey); 7] = [
    (Key::ArrowUp, GridKey::Up),
    (Key::ArrowDown, GridKey::Down),
    (Key::ArrowLeft, GridKey::Left),
    (Key::ArrowRight, GridKey::Right),
    (Key::Space, GridKey::Activate),
    (Key::Enter, GridKey::Activate),
    (Key::Escape, GridKey::Escape),
];

impl TutorDeskApp {
    /// Keyboard drag and drop on the grid. Inactive while a dialog or a text
    /// field has the keyboard.
    pub(super) fn handle_grid_keys(&mut self, ctx: &egui::Context) {
        if !self.editor.is_ready() || self.editor.form().is_some() || self.confirm_dialog.is_open() {
            return;
        }
        if ctx.memory(|mem| mem.focused().is_some()) {
            return;
        }

        let pressed: Vec<GridKey> = ctx.input(|input| {
            GRID_KEYS
                .iter()
                .filter(|(key, _)| input.key_pressed(*key))
                .map(|(_, grid_key)| *grid_key)
                .collect()
        });

        for grid_key in pressed {
            let editor = &self.editor;
            let intent = self.keyboard_drag.handle_key(
                grid_key,
                &mut self.drag,
                editor.time_slots(),
                |key| {
                    editor
                        .schedule_at(key.day_of_week, &key.time_slot)
                        .map(|item| item.id)
                },
            );
            self.keyboard_cursor = self.keyboard_drag.cursor(self.editor.time_slots());

            if let Some(intent) = intent {
                self.apply_move(ctx, intent);
            }
        }
    }
}
