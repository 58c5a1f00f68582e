use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::data::model::{LatLng, ShipmentRecord};

/// Segments per curve; the path has `CURVE_SEGMENTS + 1` points.
pub const CURVE_SEGMENTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    /// Scale applied to the perpendicular control-point offset.
    pub magnification: f64,
}

impl CurveConfig {
    /// Subtle bow for per-shipment flow lines.
    pub const FLOW: CurveConfig = CurveConfig { magnification: 1.2 };
    /// Pronounced arcs for the zoomed-out grouped map.
    pub const WORLD: CurveConfig = CurveConfig { magnification: 20.5 };
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self::FLOW
    }
}

/// Quadratic Bézier from `start` to `end` bowed to the left of the direction
/// of travel, sampled at 101 evenly spaced `t`.
///
/// The first and last points are exactly `start` and `end`.
pub fn generate_curve(start: LatLng, end: LatLng, config: &CurveConfig) -> Vec<LatLng> {
    let d_lng = end.lng - start.lng;
    let d_lat = end.lat - start.lat;
    let distance = d_lng.hypot(d_lat);
    let angle = d_lat.atan2(d_lng);

    let curvature = (distance * 0.3).clamp(0.5, 2.5) * config.magnification;
    let normal = angle + FRAC_PI_2;
    let control = LatLng::new(
        start.lat + d_lat / 2.0 + curvature * normal.sin(),
        start.lng + d_lng / 2.0 + curvature * normal.cos(),
    );

    (0..=CURVE_SEGMENTS)
        .map(|i| match i {
            0 => start,
            CURVE_SEGMENTS => end,
            _ => {
                let t = i as f64 / CURVE_SEGMENTS as f64;
                let u = 1.0 - t;
                let (a, b, c) = (u * u, 2.0 * u * t, t * t);
                LatLng::new(
                    a * start.lat + b * control.lat + c * end.lat,
                    a * start.lng + b * control.lng + c * end.lng,
                )
            }
        })
        .collect()
}

/// A flow line for one shipment.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowPath<'a> {
    pub record: &'a ShipmentRecord,
    pub points: Vec<LatLng>,
}

/// One curve per record with both endpoints located.
pub fn flow_paths<'a>(records: &'a [ShipmentRecord], config: &CurveConfig) -> Vec<FlowPath<'a>> {
    records
        .iter()
        .filter_map(|record| {
            let (from, to) = record.endpoints()?;
            Some(FlowPath {
                record,
                points: generate_curve(from, to, config),
            })
        })
        .collect()
}
