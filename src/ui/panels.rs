use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use waste_flow::color::material_color;
use waste_flow::data::filter::{Facet, ALL};
use waste_flow::data::loader;

use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – facet filters
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Filters");
        if ui.small_button("Clear all").clicked() {
            state.clear_all_filters();
        }
    });
    ui.separator();

    if state.records.is_empty() {
        ui.label("No dataset loaded.");
        return;
    }

    // Clone what we need so we can mutate state inside the loop.
    let options = state.options.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (facet, values) in &options {
                let facet = *facet;
                let header_text = state.filters.caption(facet);

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(facet.key())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            ui.label(
                                RichText::new(state.filters.display(facet))
                                    .color(Color32::from_rgb(0x10, 0xb9, 0x81))
                                    .small(),
                            );
                            if ui.small_button("✕").on_hover_text("Clear").clicked() {
                                state.clear_filter(facet);
                            }
                        });

                        for val in values {
                            let mut text = RichText::new(val.as_str());
                            if val == ALL {
                                text = text.italics();
                            } else if facet == Facet::MaterialGroup {
                                text = text.color(super::color32(material_color(val)));
                            }

                            let mut checked = state.filters.is_selected(facet, val);
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(facet, val);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar with the headline numbers.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open dataset…").clicked() {
                open_dataset_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open country boundaries…").clicked() {
                open_boundaries_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.selectable_value(&mut state.tab, Tab::Map, "Map");
        ui.selectable_value(&mut state.tab, Tab::Charts, "Charts");
        ui.selectable_value(&mut state.tab, Tab::Table, "Table");

        ui.separator();

        let summary = &state.view.summary;
        ui.label(format!("Number of exports: {}", summary.record_count));
        ui.label(format!("Average cost: ${:.0} AUD/t", summary.cost_per_tonne));
        if let Some(leading) = &summary.leading_state {
            ui.label(format!("Leading state: {leading}"));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_dataset_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open shipment data")
        .add_filter("Supported files", &["json", "csv", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        load_dataset(state, &path);
    }
}

pub fn load_dataset(state: &mut AppState, path: &std::path::Path) {
    match loader::load_file(path) {
        Ok(records) => {
            log::info!("Loaded {} shipment records from {}", records.len(), path.display());
            state.set_records(records);
        }
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

pub fn open_boundaries_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open country boundaries")
        .add_filter("GeoJSON", &["geojson", "json"])
        .pick_file();

    if let Some(path) = file {
        load_boundaries(state, &path);
    }
}

pub fn load_boundaries(state: &mut AppState, path: &std::path::Path) {
    match loader::load_boundaries(path) {
        Ok(boundaries) => state.set_boundaries(boundaries),
        Err(e) => {
            log::error!("Failed to load boundaries: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
