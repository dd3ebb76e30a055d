//! Brief non-blocking notices ("Booking saved", "Signed out", ...), stacked in
//! the bottom-right corner. Errors that need attention stay in the inline
//! banners; toasts only confirm or warn.

use std::time::{Duration, Instant};

use egui::{Color32, Context, Pos2, RichText};

use crate::ui_egui::theme::GridTheme;

const MAX_VISIBLE: usize = 4;
const FADE_OUT: Duration = Duration::from_millis(500);
const TOAST_WIDTH: f32 = 320.0;
const TOAST_HEIGHT: f32 = 40.0;

/// Severity of a toast; sets its accent color and how long it stays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    /// Completed action, e.g. a saved booking (green)
    Success,
    /// Neutral notice such as signing out (theme text color)
    Info,
    /// Needs the user's attention; stays twice as long (cursor accent)
    Warning,
}

impl ToastLevel {
    fn lifetime(self) -> Duration {
        match self {
            ToastLevel::Warning => Duration::from_secs(6),
            ToastLevel::Success | ToastLevel::Info => Duration::from_secs(3),
        }
    }

    fn accent(self, theme: &GridTheme) -> Color32 {
        match self {
            ToastLevel::Success if theme.is_dark => Color32::from_rgb(110, 210, 130),
            ToastLevel::Success => Color32::from_rgb(30, 120, 50),
            ToastLevel::Info => theme.booking_text,
            ToastLevel::Warning => theme.cursor,
        }
    }
}

/// A single notice on screen.
#[derive(Debug, Clone)]
pub struct Toast {
    /// The text to display
    pub message: String,
    /// Severity, which decides color and lifetime
    pub level: ToastLevel,
    /// When the toast was shown or last restarted
    shown_at: Instant,
}

impl Toast {
    pub fn new_at(message: impl Into<String>, level: ToastLevel, now: Instant) -> Self {
        Self {
            message: message.into(),
            level,
            shown_at: now,
        }
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.level.lifetime()
    }

    /// 1.0 until the last half second, then linearly down to 0.0.
    pub fn opacity_at(&self, now: Instant) -> f32 {
        let left = self
            .level
            .lifetime()
            .saturating_sub(now.saturating_duration_since(self.shown_at));
        (left.as_secs_f32() / FADE_OUT.as_secs_f32()).clamp(0.0, 1.0)
    }
}

/// Stack of live toasts, oldest first.
#[derive(Debug, Default)]
pub struct ToastManager {
    toasts: Vec<Toast>,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push_at(message.into(), ToastLevel::Success, Instant::now());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push_at(message.into(), ToastLevel::Info, Instant::now());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push_at(message.into(), ToastLevel::Warning, Instant::now());
    }

    /// Repeating the newest message restarts it instead of stacking a copy.
    /// Only the newest few are kept.
    pub fn push_at(&mut self, message: String, level: ToastLevel, now: Instant) {
        if let Some(last) = self.toasts.last_mut() {
            if last.message == message && last.level == level {
                last.shown_at = now;
                return;
            }
        }
        self.toasts.push(Toast::new_at(message, level, now));
        if self.toasts.len() > MAX_VISIBLE {
            let excess = self.toasts.len() - MAX_VISIBLE;
            self.toasts.drain(..excess);
        }
    }

    pub fn retain_live_at(&mut self, now: Instant) {
        self.toasts.retain(|t| !t.is_expired_at(now));
    }

    pub fn render(&mut self, ctx: &Context, theme: &GridTheme) {
        let now = Instant::now();
        self.retain_live_at(now);
        if self.toasts.is_empty() {
            return;
        }

        // Keep repainting while something is fading
        ctx.request_repaint();

        let screen = ctx.screen_rect();
        let margin = 10.0;

        for (slot, toast) in self.toasts.iter().rev().enumerate() {
            let opacity = toast.opacity_at(now);
            let pos = Pos2::new(
                screen.right() - TOAST_WIDTH - margin,
                screen.bottom() - margin - (slot as f32 + 1.0) * (TOAST_HEIGHT + 6.0),
            );
            let accent = toast.level.accent(theme).gamma_multiply(opacity);
            let fill = theme.cell_background.gamma_multiply(0.95 * opacity);

            egui::Area::new(egui::Id::new(("toast", slot)))
                .fixed_pos(pos)
                .order(egui::Order::Foreground)
                .interactable(false)
                .show(ctx, |ui| {
                    egui::Frame::none()
                        .fill(fill)
                        .rounding(6.0)
                        .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                        .stroke(egui::Stroke::new(1.5, accent))
                        .show(ui, |ui| {
                            ui.set_width(TOAST_WIDTH - 24.0);
                            ui.label(RichText::new(&toast.message).color(accent));
                        });
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(manager: &ToastManager) -> Vec<&str> {
        manager.toasts.iter().map(|t| t.message.as_str()).collect()
    }

    #[test]
    fn test_warnings_outlive_confirmations() {
        let now = Instant::now();
        let warning = Toast::new_at("Session expired", ToastLevel::Warning, now);
        let success = Toast::new_at("Booking saved", ToastLevel::Success, now);

        let later = now + Duration::from_secs(4);
        assert!(success.is_expired_at(later));
        assert!(!warning.is_expired_at(later));
    }

    #[test]
    fn test_opacity_fades_in_last_half_second() {
        let now = Instant::now();
        let toast = Toast::new_at("Booking moved", ToastLevel::Success, now);

        assert_eq!(toast.opacity_at(now), 1.0);
        let fading = toast.opacity_at(now + Duration::from_millis(2750));
        assert!(fading > 0.0 && fading < 1.0);
        assert_eq!(toast.opacity_at(now + Duration::from_secs(3)), 0.0);
    }

    #[test]
    fn test_repeated_message_is_not_stacked() {
        let now = Instant::now();
        let mut manager = ToastManager::new();
        manager.push_at("Booking moved".to_string(), ToastLevel::Success, now);
        manager.push_at("Booking moved".to_string(), ToastLevel::Success, now);

        assert_eq!(messages(&manager), vec!["Booking moved"]);
    }

    #[test]
    fn test_only_newest_toasts_are_kept() {
        let now = Instant::now();
        let mut manager = ToastManager::new();
        for n in 0..6 {
            manager.push_at(format!("Notice {}", n), ToastLevel::Info, now);
        }

        assert_eq!(
            messages(&manager),
            vec!["Notice 2", "Notice 3", "Notice 4", "Notice 5"]
        );
    }

    #[test]
    fn test_expired_toasts_are_dropped() {
        let now = Instant::now();
        let mut manager = ToastManager::new();
        manager.push_at("Signed out".to_string(), ToastLevel::Info, now);
        manager.push_at("Session expired".to_string(), ToastLevel::Warning, now);

        manager.retain_live_at(now + Duration::from_secs(4));
        assert_eq!(messages(&manager), vec!["Session expired"]);
    }
}
