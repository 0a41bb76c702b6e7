mod app;
mod color;
mod config;
mod data;
mod encode;
mod format;
mod labels;
mod sink;
mod state;
mod ui;

use app::GdpAtlasApp;
use config::DataPaths;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let paths = DataPaths::from_env();
    log::info!(
        "Value table: {}, metadata: {}",
        paths.values.display(),
        paths.metadata.display()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "GDP Atlas – World GDP Map",
        options,
        Box::new(move |_cc| Ok(Box::new(GdpAtlasApp::new(paths)))),
    )
}
