mod app;
mod data;
mod pivot;
mod render;
mod state;
mod ui;

use std::path::Path;

use app::CrosstabApp;
use eframe::egui;

/// Fixed input workbook, resolved in the working directory at startup.
const DATA_FILE: &str = "dataf.xlsx";

fn main() -> eframe::Result {
    env_logger::init();

    // The dashboard cannot run without its dataset: a load failure is fatal.
    let dataset = match data::loader::load_file(Path::new(DATA_FILE)) {
        Ok(ds) => ds,
        Err(e) => {
            log::error!("Failed to load {DATA_FILE}: {e}");
            std::process::exit(1);
        }
    };
    log::info!(
        "Loaded {} rows with columns {:?}",
        dataset.len(),
        dataset.column_names
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Crosstab Studio – Pivot Viewer",
        options,
        Box::new(move |_cc| Ok(Box::new(CrosstabApp::new(dataset)))),
    )
}
