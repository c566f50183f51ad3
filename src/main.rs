#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use brush_lite::{CanvasConfig, PaintApp};

/// Optional config file read from the working directory
const CONFIG_FILE: &str = "brush_lite.json";

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config = match CanvasConfig::load(CONFIG_FILE) {
        Ok(config) => config,
        Err(brush_lite::CanvasError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            CanvasConfig::default()
        }
        Err(err) => {
            log::warn!("Ignoring {CONFIG_FILE}: {err}");
            CanvasConfig::default()
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1080.0, 720.0])
            .with_min_inner_size([400.0, 300.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "Beyond the Brush Lite",
        native_options,
        Box::new(|cc| Ok(Box::new(PaintApp::new(cc, config)?))),
    )
}
