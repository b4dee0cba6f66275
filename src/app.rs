use eframe::egui;

use crate::data::model::Dataset;
use crate::state::SessionState;
use crate::ui::{panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CrosstabApp {
    pub state: SessionState,
}

impl CrosstabApp {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            state: SessionState::new(dataset),
        }
    }
}

impl eframe::App for CrosstabApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: status bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters and pivot settings ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: pivot table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            table::pivot_panel(ui, &mut self.state);
        });
    }
}
