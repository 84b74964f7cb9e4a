mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::CareWatchApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional single argument: path to a JSON config file.
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let (config, config_error) = match DashboardConfig::load(config_path.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (DashboardConfig::default(), Some(e)),
    };

    let mut state = AppState::new(config);
    state.load_all();
    if let Some(e) = config_error {
        state.report(e.context("using built-in configuration"));
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CareWatch – Healthcare Outbreak Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(CareWatchApp::new(state)))),
    )
}
