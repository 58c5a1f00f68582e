use std::ops::RangeInclusive;

use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints};
use waste_flow::color::material_color;
use waste_flow::data::aggregate::{PivotTable, Share};

use super::color32;
use crate::state::{AppState, Chart};

// ---------------------------------------------------------------------------
// Chart tab (central panel)
// ---------------------------------------------------------------------------

pub fn charts(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for chart in Chart::ALL {
            ui.selectable_value(&mut state.chart, chart, chart.title());
        }
    });
    ui.separator();

    if state.view.filtered.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No shipments match the current filters");
        });
        return;
    }

    let view = &state.view;
    match state.chart {
        Chart::TonnesByYear => line_chart(ui, &view.tonnes_by_year, "Tonnes"),
        Chart::ValueShareByYear => stacked_bars(ui, &view.value_share_by_year, "Value %"),
        Chart::TonnesByQuarter => stacked_bars(ui, &view.tonnes_by_quarter, "Tonnes"),
        Chart::Distribution => distribution_bars(ui, &view.distribution),
    }
}

/// X-axis labels: the pivot key at integer positions, nothing in between.
fn key_axis(table: &PivotTable) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String + 'static {
    let keys: Vec<String> = table.rows.iter().map(|r| r.key.clone()).collect();
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let i = mark.value.round();
        if (mark.value - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        keys.get(i as usize).cloned().unwrap_or_default()
    }
}

/// One line per material group across the temporal keys.
fn line_chart(ui: &mut Ui, table: &PivotTable, y_label: &str) {
    Plot::new("pivot_lines")
        .legend(Legend::default())
        .x_axis_label(table.time_key.column())
        .y_axis_label(y_label)
        .x_axis_formatter(key_axis(table))
        .show(ui, |plot_ui| {
            for (col, group) in table.groups.iter().enumerate() {
                let points: PlotPoints = table
                    .rows
                    .iter()
                    .enumerate()
                    .map(|(i, row)| [i as f64, row.values[col]])
                    .collect();
                let line = Line::new(points)
                    .name(group)
                    .color(color32(material_color(group)))
                    .width(1.5);
                plot_ui.line(line);
            }
        });
}

/// One stacked bar per temporal key, one segment per material group.
fn stacked_bars(ui: &mut Ui, table: &PivotTable, y_label: &str) {
    Plot::new("pivot_bars")
        .legend(Legend::default())
        .x_axis_label(table.time_key.column())
        .y_axis_label(y_label)
        .x_axis_formatter(key_axis(table))
        .show(ui, |plot_ui| {
            let mut charts: Vec<BarChart> = Vec::with_capacity(table.groups.len());
            for (col, group) in table.groups.iter().enumerate() {
                let bars: Vec<Bar> = table
                    .rows
                    .iter()
                    .enumerate()
                    .map(|(i, row)| Bar::new(i as f64, row.values[col]).width(0.6))
                    .collect();
                let below: Vec<&BarChart> = charts.iter().collect();
                let chart = BarChart::new(bars)
                    .name(group)
                    .color(color32(material_color(group)))
                    .stack_on(&below);
                charts.push(chart);
            }
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

/// Horizontal bars standing in for the distribution pie.
fn distribution_bars(ui: &mut Ui, shares: &[Share]) {
    Plot::new("distribution")
        .legend(Legend::default())
        .x_axis_label("% of tonnes")
        .show_axes([true, false])
        .show(ui, |plot_ui| {
            for (i, share) in shares.iter().enumerate() {
                let bar = Bar::new(i as f64, share.percent)
                    .width(0.7)
                    .name(format!("{}: {:.2}%", share.group, share.percent));
                let chart = BarChart::new(vec![bar])
                    .horizontal()
                    .name(&share.group)
                    .color(color32(material_color(&share.group)));
                plot_ui.bar_chart(chart);
            }
        });
}
