// Module exports for models

pub mod schedule;
pub mod session;
pub mod settings;
