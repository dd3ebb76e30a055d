//! Colors for the schedule grid and the surrounding panels.

use egui::Color32;

/// Grid palette, in a light and a dark variant.
#[derive(Debug, Clone, PartialEq)]
pub struct GridTheme {
    /// Whether this is a dark theme (affects base egui::Visuals)
    pub is_dark: bool,
    pub app_background: Color32,
    pub cell_background: Color32,
    pub header_background: Color32,
    pub cell_border: Color32,
    /// Filled booking cell
    pub booking_fill: Color32,
    pub booking_text: Color32,
    /// Highlight for the hovered drop target when it is free
    pub drop_target: Color32,
    /// Highlight for the hovered drop target when another booking occupies it
    pub drop_conflict: Color32,
    /// Keyboard cursor outline
    pub cursor: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
}

impl GridTheme {
    pub fn light() -> Self {
        Self {
            is_dark: false,
            app_background: Color32::from_rgb(245, 245, 245),
            cell_background: Color32::from_rgb(255, 255, 255),
            header_background: Color32::from_rgb(235, 238, 243),
            cell_border: Color32::from_rgb(220, 220, 220),
            booking_fill: Color32::from_rgb(219, 234, 254),
            booking_text: Color32::from_rgb(30, 64, 120),
            drop_target: Color32::from_rgb(100, 150, 255),
            drop_conflict: Color32::from_rgb(220, 80, 80),
            cursor: Color32::from_rgb(255, 170, 0),
            text_primary: Color32::from_rgb(40, 40, 40),
            text_secondary: Color32::from_rgb(100, 100, 100),
        }
    }

    pub fn dark() -> Self {
        Self {
            is_dark: true,
            app_background: Color32::from_rgb(30, 30, 30),
            cell_background: Color32::from_rgb(40, 40, 40),
            header_background: Color32::from_rgb(50, 52, 58),
            cell_border: Color32::from_rgb(60, 60, 60),
            booking_fill: Color32::from_rgb(40, 62, 100),
            booking_text: Color32::from_rgb(200, 220, 255),
            drop_target: Color32::from_rgb(100, 150, 255),
            drop_conflict: Color32::from_rgb(230, 100, 100),
            cursor: Color32::from_rgb(255, 190, 60),
            text_primary: Color32::from_rgb(240, 240, 240),
            text_secondary: Color32::from_rgb(170, 170, 170),
        }
    }

    /// Follows the operating system preference, light when unknown.
    pub fn from_system() -> Self {
        match dark_light::detect() {
            dark_light::Mode::Dark => Self::dark(),
            dark_light::Mode::Light | dark_light::Mode::Default => Self::light(),
        }
    }

    /// Apply this theme to an egui context
    pub fn apply_to_context(&self, ctx: &egui::Context) {
        let mut visuals = if self.is_dark {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };

        visuals.window_fill = self.app_background;
        visuals.panel_fill = self.app_background;
        visuals.override_text_color = Some(self.text_primary);

        ctx.set_visuals(visuals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_theme() {
        let theme = GridTheme::light();
        assert!(!theme.is_dark);
        assert_eq!(theme.app_background, Color32::from_rgb(245, 245, 245));
    }

    #[test]
    fn test_dark_theme() {
        let theme = GridTheme::dark();
        assert!(theme.is_dark);
        assert_ne!(theme.drop_target, theme.drop_conflict);
    }
}
