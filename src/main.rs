#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod chart;
mod error;
mod io;
mod model;
mod telemetry;
mod ui;

fn main() -> eframe::Result<()> {
    let _ = telemetry::init_default_tracing();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 800.0])
            .with_min_inner_size([900.0, 480.0])
            .with_title("Timeline Gantt"),
        ..Default::default()
    };

    eframe::run_native(
        "Timeline Gantt",
        options,
        Box::new(|cc| Ok(Box::new(app::GanttApp::new(cc)))),
    )
}
