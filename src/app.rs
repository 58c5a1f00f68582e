use eframe::egui;

use crate::state::{AppState, Tab};
use crate::ui::{map, panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct WasteFlowApp {
    pub state: AppState,
}

impl WasteFlowApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for WasteFlowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar + headline numbers ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: facet filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: active tab ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.tab {
            Tab::Map => map::map_view(ui, &mut self.state),
            Tab::Charts => plot::charts(ui, &mut self.state),
            Tab::Table => table::tables(ui, &mut self.state),
        });
    }
}
