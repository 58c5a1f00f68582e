use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Line, MarkerShape, Plot, PlotPoint, PlotPoints, Points};
use waste_flow::color::material_color;
use waste_flow::data::model::LatLng;
use waste_flow::spatial::bounds;
use waste_flow::spatial::curve::{flow_paths, generate_curve};
use waste_flow::spatial::grouping::{group_by_coordinates, GeoGroups, GroupingMode, MarkerSummary};

use super::{color32, color32_alpha};
use crate::state::AppState;

/// Heat samples are drawn in this many intensity bands.
const HEAT_BANDS: usize = 10;

/// Click radius around a marker, as a fraction of the visible longitude span.
const PICK_RADIUS: f64 = 0.015;

const BOUNDARY_COLOR: Color32 = Color32::from_gray(110);

// ---------------------------------------------------------------------------
// Map tab (central panel)
// ---------------------------------------------------------------------------

pub fn map_view(ui: &mut Ui, state: &mut AppState) {
    controls(ui, state);
    legend(ui, state);
    selection_info(ui, state);
    ui.separator();

    let grouping = state.config.grouping;
    let clicked = {
        let groups = group_by_coordinates(&state.view.filtered, grouping);
        draw_plot(ui, state, &groups)
    };

    if let Some((at, marker)) = clicked {
        log::debug!("map click at {at} (marker: {marker:?})");
        state.click_map(at, marker);
    }
}

fn controls(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.checkbox(&mut state.show_heatmap, "Heatmap");
        ui.checkbox(&mut state.show_flows, "All flow lines");
        ui.separator();
        ui.label("Markers:");
        let before = state.config.grouping;
        ui.selectable_value(&mut state.config.grouping, GroupingMode::Destination, "Destinations");
        ui.selectable_value(&mut state.config.grouping, GroupingMode::Bidirectional, "Origins + destinations");
        if state.config.grouping != before {
            state.selected_marker = None;
        }
    });
}

fn legend(ui: &mut Ui, state: &AppState) {
    if !state.show_heatmap || state.view.heatmap.is_empty() {
        return;
    }
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.label(RichText::new("Export value").strong());
        for entry in &state.view.legend {
            ui.label(RichText::new("■").color(color32_alpha(entry.color)));
            ui.label(RichText::new(&entry.label).small());
        }
    });
}

fn selection_info(ui: &mut Ui, state: &AppState) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        if let Some(country) = &state.clicked_country {
            ui.label(RichText::new(format!("Country: {country}")).strong());
            ui.separator();
        }

        let Some(key) = &state.selected_marker else {
            ui.label(RichText::new("Click a marker to show its shipments").weak());
            return;
        };
        let groups = group_by_coordinates(&state.view.filtered, state.config.grouping);
        let Some(group) = groups.get(key) else {
            return;
        };

        ui.label(RichText::new(&group.name).strong());
        match group.summary() {
            MarkerSummary::Single {
                origin,
                destination,
                tonnes,
                class,
                quarter,
                ahecc,
            } => {
                ui.label(format!("{origin} → {destination}"));
                ui.label(format!("Total tonnes: {tonnes}"));
                ui.label(format!("Class: {class}"));
                ui.label(format!("Quarter: {quarter}"));
                ui.label(format!("AHECC: {ahecc}"));
            }
            MarkerSummary::Aggregate {
                total_tonnes,
                total_cost,
                shipments,
                classes,
            } => {
                ui.label(format!("Total tonnes: {total_tonnes}"));
                ui.label(format!("Total cost: ${total_cost}"));
                ui.label(format!("Shipments: {shipments}"));
                ui.label(format!("Classes: {}", classes.join(", ")))
                    .on_hover_text(classes.join("\n"));
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Plot
// ---------------------------------------------------------------------------

fn to_plot(p: LatLng) -> [f64; 2] {
    [p.lng, p.lat]
}

fn nearest_marker(groups: &GeoGroups<'_>, at: PlotPoint, radius: f64) -> Option<String> {
    groups
        .iter()
        .map(|g| {
            let dx = g.position.lng - at.x;
            let dy = g.position.lat - at.y;
            (g, (dx * dx + dy * dy).sqrt())
        })
        .filter(|(_, d)| *d <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(g, _)| g.key.clone())
}

/// Draw the map and report a click as `(position, picked marker)`.
fn draw_plot(ui: &mut Ui, state: &AppState, groups: &GeoGroups<'_>) -> Option<(LatLng, Option<String>)> {
    let curve = state.config.curve;

    let mut plot = Plot::new("shipment_map")
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .allow_double_click_reset(true);
    if let Some(extent) = bounds(&state.view.filtered) {
        plot = plot
            .include_x(extent.south_west.lng)
            .include_x(extent.north_east.lng)
            .include_y(extent.south_west.lat)
            .include_y(extent.north_east.lat);
    }

    let response = plot.show(ui, |plot_ui| {
        if let Some(boundaries) = &state.boundaries {
            for country in boundaries.countries() {
                for polygon in country.geometry.iter() {
                    let ring: PlotPoints =
                        polygon.exterior().coords().map(|c| [c.x, c.y]).collect();
                    plot_ui.line(Line::new(ring).color(BOUNDARY_COLOR).width(0.5));
                }
            }
        }

        if state.show_heatmap {
            let heatmap = &state.view.heatmap;
            let mut bands: Vec<Vec<[f64; 2]>> = vec![Vec::new(); HEAT_BANDS + 1];
            for sample in &heatmap.samples {
                let band = (heatmap.intensity(sample) * HEAT_BANDS as f64).round() as usize;
                bands[band.min(HEAT_BANDS)].push(to_plot(sample.position));
            }
            for (band, points) in bands.into_iter().enumerate() {
                if points.is_empty() {
                    continue;
                }
                let color = state.view.gradient.color_at(band as f64 / HEAT_BANDS as f64);
                plot_ui.points(
                    Points::new(points)
                        .color(color32_alpha(color))
                        .radius(4.0 + band as f32)
                        .filled(true),
                );
            }
        }

        if state.show_flows {
            for path in flow_paths(&state.view.filtered, &curve) {
                let line: PlotPoints = path.points.iter().map(|p| to_plot(*p)).collect();
                let color = color32(material_color(&path.record.material_group));
                plot_ui.line(Line::new(line).color(color.gamma_multiply(0.5)).width(1.0));
            }
        }

        if let Some(group) = state.selected_marker.as_deref().and_then(|k| groups.get(k)) {
            for rec in &group.members {
                let Some((from, to)) = rec.endpoints() else {
                    continue;
                };
                let line: PlotPoints =
                    generate_curve(from, to, &curve).into_iter().map(to_plot).collect();
                plot_ui.line(
                    Line::new(line)
                        .color(color32(material_color(&rec.material_group)))
                        .width(2.0)
                        .name(&rec.material_group),
                );
            }
        }

        for group in groups {
            let selected = state.selected_marker.as_deref() == Some(group.key.as_str());
            let color = match group.members.first() {
                Some(rec) if group.len() == 1 => color32(material_color(&rec.material_group)),
                _ => Color32::from_rgb(0x3b, 0x82, 0xf6),
            };
            let radius = 3.0 + (group.len() as f32).log2().max(0.0);
            plot_ui.points(
                Points::new(vec![to_plot(group.position)])
                    .shape(if selected { MarkerShape::Diamond } else { MarkerShape::Circle })
                    .color(color)
                    .radius(if selected { radius + 2.0 } else { radius })
                    .filled(true),
            );
        }

        if !plot_ui.response().clicked() {
            return None;
        }
        let at = plot_ui.pointer_coordinate()?;
        let radius = plot_ui.plot_bounds().width() * PICK_RADIUS;
        Some((LatLng::new(at.y, at.x), nearest_marker(groups, at, radius)))
    });

    response.response.on_hover_cursor(egui::CursorIcon::Crosshair);
    response.inner
}
