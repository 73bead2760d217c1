mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use app::PetroExplorerApp;
use eframe::egui;
use petro_explorer::Config;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional first argument: the data file.
    let data_path = std::env::args_os().nth(1).map(PathBuf::from);
    let state = match Config::resolve(data_path).context("reading configuration") {
        Ok(config) => AppState::new(config),
        Err(e) => {
            log::error!("{e:#}");
            AppState::failed(Config::default(), format!("{e:#}"))
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Petro Explorer – Petroleum Derivatives Statistics",
        options,
        Box::new(|_cc| Ok(Box::new(PetroExplorerApp::new(state)))),
    )
}
