// Tutor Desk
// Main entry point

use anyhow::{anyhow, Context, Result};
use tutor_desk::models::settings::AppConfig;
use tutor_desk::services::api::ApiClient;
use tutor_desk::services::storage::SqliteStorage;
use tutor_desk::ui_egui::TutorDeskApp;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Tutor Desk");

    let config = AppConfig::load();
    let storage_path = config.resolve_storage_path();
    let storage = SqliteStorage::open(&storage_path)
        .with_context(|| format!("Failed to open session storage at {}", storage_path.display()))?;
    let api = ApiClient::from_config(&config)?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Tutor Desk")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Tutor Desk",
        native_options,
        Box::new(move |cc| Ok(Box::new(TutorDeskApp::new(cc, &config, api, storage)))),
    )
    .map_err(|err| anyhow!("Failed to run the application: {}", err))
}
