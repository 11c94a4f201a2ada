mod app;
mod chart;
mod color;
mod config;
mod data;
mod export;
mod state;
mod ui;

use app::InflationDashboardApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::from_env();
    log::info!("Dataset: {}", config.data_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Inflation Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(InflationDashboardApp::new(config)))),
    )
}
