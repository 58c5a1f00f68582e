use palette::{LinSrgba, Mix, Srgba};
use serde::{Deserialize, Serialize};

use super::grouping::{group_by_coordinates, GeoGroups, GroupingMode};
use crate::data::aggregate::round_to;
use crate::data::model::{LatLng, ShipmentRecord};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// One colour stop of the intensity ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Normalized intensity in `[0, 1]`.
    pub at: f64,
    /// RGBA, 8 bits per channel.
    pub rgba: [u8; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Weight one sample per destination group instead of one per record.
    pub per_group: bool,
    pub stops: Vec<GradientStop>,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            per_group: false,
            stops: DEFAULT_STOPS.to_vec(),
        }
    }
}

const DEFAULT_STOPS: [GradientStop; 6] = [
    GradientStop { at: 0.0, rgba: [0, 0, 255, 0] },
    GradientStop { at: 0.2, rgba: [0, 128, 255, 160] },
    GradientStop { at: 0.4, rgba: [0, 255, 128, 190] },
    GradientStop { at: 0.6, rgba: [255, 255, 0, 210] },
    GradientStop { at: 0.8, rgba: [255, 128, 0, 230] },
    GradientStop { at: 1.0, rgba: [255, 0, 0, 255] },
];

// ---------------------------------------------------------------------------
// Samples
// ---------------------------------------------------------------------------

/// `[lat, lng, weight]`, weight being destination value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatSample {
    pub position: LatLng,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Heatmap {
    pub samples: Vec<HeatSample>,
    pub max_value: f64,
}

impl Heatmap {
    pub fn build(records: &[ShipmentRecord], config: &HeatmapConfig) -> Self {
        if config.per_group {
            Self::per_group(&group_by_coordinates(records, GroupingMode::Destination))
        } else {
            Self::per_record(records)
        }
    }

    /// One sample per record that has a destination coordinate.
    pub fn per_record(records: &[ShipmentRecord]) -> Self {
        Self::from_samples(
            records
                .iter()
                .filter_map(|r| {
                    Some(HeatSample {
                        position: r.destination.coordinates?,
                        weight: r.destination.value,
                    })
                })
                .collect(),
        )
    }

    /// One sample per group, weighted by the group's summed destination value.
    pub fn per_group(groups: &GeoGroups<'_>) -> Self {
        Self::from_samples(
            groups
                .iter()
                .map(|g| HeatSample {
                    position: g.position,
                    weight: g.members.iter().map(|r| r.destination.value).sum(),
                })
                .collect(),
        )
    }

    fn from_samples(samples: Vec<HeatSample>) -> Self {
        let max_value = samples.iter().map(|s| s.weight).fold(0.0, f64::max);
        Self { samples, max_value }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Weight relative to the heaviest sample; `0` when every weight is `0`.
    pub fn intensity(&self, sample: &HeatSample) -> f64 {
        if self.max_value > 0.0 {
            (sample.weight / self.max_value).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// `[lat, lng, intensity]` triples.
    pub fn normalized(&self) -> Vec<[f64; 3]> {
        self.samples
            .iter()
            .map(|s| [s.position.lat, s.position.lng, self.intensity(s)])
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Gradient
// ---------------------------------------------------------------------------

/// Piecewise-linear colour ramp over normalized intensity.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    stops: Vec<GradientStop>,
}

impl Gradient {
    pub fn new(mut stops: Vec<GradientStop>) -> Self {
        stops.sort_by(|a, b| a.at.total_cmp(&b.at));
        if stops.is_empty() {
            stops = DEFAULT_STOPS.to_vec();
        }
        Self { stops }
    }

    pub fn from_config(config: &HeatmapConfig) -> Self {
        Self::new(config.stops.clone())
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    pub fn color_at(&self, intensity: f64) -> Srgba<u8> {
        let t = if intensity.is_finite() { intensity.clamp(0.0, 1.0) } else { 0.0 };
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if t <= first.at {
            return rgba(first.rgba);
        }
        if t >= last.at {
            return rgba(last.rgba);
        }
        for pair in self.stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if t <= hi.at {
                let span = hi.at - lo.at;
                let f = if span > 0.0 { (t - lo.at) / span } else { 1.0 };
                return blend(rgba(lo.rgba), rgba(hi.rgba), f as f32);
            }
        }
        rgba(last.rgba)
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::new(DEFAULT_STOPS.to_vec())
    }
}

fn rgba([r, g, b, a]: [u8; 4]) -> Srgba<u8> {
    Srgba::new(r, g, b, a)
}

fn blend(a: Srgba<u8>, b: Srgba<u8>, factor: f32) -> Srgba<u8> {
    let a: LinSrgba = a.into_format::<f32, f32>().into_linear();
    let b: LinSrgba = b.into_format::<f32, f32>().into_linear();
    let mixed: Srgba<f32> = Srgba::from_linear(a.mix(b, factor));
    mixed.into_format()
}

// ---------------------------------------------------------------------------
// Legend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub grade: f64,
    pub lower: f64,
    /// `None` for the open-ended top bucket.
    pub upper: Option<f64>,
    pub color: Srgba<u8>,
    pub label: String,
}

/// One entry per gradient stop, scaled by `max_value`.
pub fn legend(gradient: &Gradient, max_value: f64) -> Vec<LegendEntry> {
    let stops = gradient.stops();
    stops
        .iter()
        .enumerate()
        .map(|(i, stop)| {
            let lower = stop.at * max_value;
            let upper = stops.get(i + 1).map(|next| next.at * max_value);
            let label = match upper {
                Some(hi) => format!("{} – {}", format_magnitude(lower), format_magnitude(hi)),
                None => format!("{}+", format_magnitude(lower)),
            };
            LegendEntry {
                grade: stop.at,
                lower,
                upper,
                color: rgba(stop.rgba),
                label,
            }
        })
        .collect()
}

/// `1240.0` → `"1.2k"`, `2.5e6` → `"2.5M"`, `3e9` → `"3.0B"`. A value that
/// would round up to `1000.0` of one unit moves to the next (`999.96` → `"1.0k"`).
pub fn format_magnitude(v: f64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e9, "B"), (1e6, "M"), (1e3, "k")];

    let abs = v.abs();
    for (scale, suffix) in UNITS {
        if abs >= scale || round_to(abs / (scale / 1e3), 1) >= 1e3 {
            return format!("{:.1}{suffix}", v / scale);
        }
    }
    format!("{v:.1}")
}
