// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
use anyhow::anyhow;
use eframe::egui;
use signal_viewer::config::ViewerConfig;
use signal_viewer::gui::SignalViewerApp;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = ViewerConfig::load_or_default();
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1280.0, 860.0])
        .with_min_inner_size([900.0, 600.0])
        .with_title("Signal Viewer");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "Signal Viewer",
        options,
        Box::new(|_cc| Box::new(SignalViewerApp::new(config))),
    )
    .map_err(|err| anyhow!("viewer window failed: {err}"))
}
