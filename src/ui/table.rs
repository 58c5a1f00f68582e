use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};
use waste_flow::color::material_color;
use waste_flow::data::aggregate::{PivotTable, Share};
use waste_flow::data::model::ShipmentRecord;

use super::color32;
use crate::state::{AppState, Chart};

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Table tab (central panel)
// ---------------------------------------------------------------------------

pub fn tables(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for chart in Chart::ALL {
            ui.selectable_value(&mut state.chart, chart, chart.title());
        }
    });
    ui.separator();

    let view = &state.view;
    let pivot_height = ui.available_height() * 0.4;
    ui.push_id("pivot", |ui: &mut Ui| match state.chart {
        Chart::TonnesByYear => pivot_table(ui, &view.tonnes_by_year, pivot_height),
        Chart::ValueShareByYear => pivot_table(ui, &view.value_share_by_year, pivot_height),
        Chart::TonnesByQuarter => pivot_table(ui, &view.tonnes_by_quarter, pivot_height),
        Chart::Distribution => share_table(ui, &view.distribution, pivot_height),
    });

    ui.separator();
    ui.label(RichText::new(format!("Shipments ({})", view.filtered.len())).strong());
    ui.push_id("records", |ui: &mut Ui| record_table(ui, &view.filtered));
}

fn pivot_table(ui: &mut Ui, table: &PivotTable, max_height: f32) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(max_height)
        .column(Column::auto().at_least(60.0))
        .columns(Column::auto().at_least(80.0), table.groups.len())
        .header(ROW_HEIGHT + 2.0, |mut header| {
            header.col(|ui| {
                ui.strong(table.time_key.column());
            });
            for group in &table.groups {
                header.col(|ui| {
                    ui.label(RichText::new(group).strong().color(color32(material_color(group))));
                });
            }
        })
        .body(|mut body| {
            for row in &table.rows {
                body.row(ROW_HEIGHT, |mut tr| {
                    tr.col(|ui| {
                        ui.label(&row.key);
                    });
                    for v in &row.values {
                        tr.col(|ui| {
                            ui.label(format!("{v}"));
                        });
                    }
                });
            }
        });
}

fn share_table(ui: &mut Ui, shares: &[Share], max_height: f32) {
    TableBuilder::new(ui)
        .striped(true)
        .max_scroll_height(max_height)
        .column(Column::auto().at_least(160.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::remainder())
        .header(ROW_HEIGHT + 2.0, |mut header| {
            for title in ["Material group", "Tonnes", "%"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for share in shares {
                body.row(ROW_HEIGHT, |mut tr| {
                    tr.col(|ui| {
                        ui.label(RichText::new(&share.group).color(color32(material_color(&share.group))));
                    });
                    tr.col(|ui| {
                        ui.label(format!("{}", share.tonnes));
                    });
                    tr.col(|ui| {
                        ui.label(format!("{:.2}%", share.percent));
                    });
                });
            }
        });
}

fn record_table(ui: &mut Ui, records: &[ShipmentRecord]) {
    const HEADERS: [&str; 8] = [
        "Origin",
        "Destination",
        "Material group",
        "Year",
        "Quarter",
        "Tonnes",
        "Value (AUD)",
        "AHECC",
    ];

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(Column::auto().at_least(70.0), HEADERS.len() - 1)
        .column(Column::remainder())
        .header(ROW_HEIGHT + 2.0, |mut header| {
            for title in HEADERS {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, records.len(), |mut tr| {
                let rec = &records[tr.index()];
                let cells = [
                    rec.origin.name.clone(),
                    rec.destination.name.clone(),
                    rec.material_group.clone(),
                    rec.origin.year.clone(),
                    rec.origin.quarter.clone(),
                    format!("{}", rec.origin.tonnes),
                    format!("{:.0}", rec.destination.value),
                    rec.ahecc_code.clone(),
                ];
                for cell in cells {
                    tr.col(|ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}
