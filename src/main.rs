mod app;
mod backend;
mod data;
mod model;
mod state;
mod training;
mod ui;

use app::FluxStainApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([560.0, 480.0])
            .with_min_inner_size([420.0, 360.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Flux Stain Detector – Trainer",
        options,
        Box::new(|_cc| Ok(Box::new(FluxStainApp::default()))),
    )
}
