mod app;
mod color;
mod data;
mod settings;
mod state;
mod ui;

use anyhow::Result;
use app::HrDashboardApp;
use clap::Parser;
use eframe::egui;
use settings::{Args, Settings};

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let settings = Settings::load(&args)?;
    log::debug!("Settings: {settings:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "HR Dashboard – Employee Performance",
        options,
        Box::new(move |_cc| Ok(Box::new(HrDashboardApp::new(&settings)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
