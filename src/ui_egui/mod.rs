mod app;
mod booking_dialog;
pub mod drag;
pub mod theme;
mod views;

pub use app::TutorDeskApp;
