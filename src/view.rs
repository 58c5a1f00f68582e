use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::aggregate::{self, PivotTable, Share, Summary, TimeKey};
use crate::data::filter::{self, FilterState};
use crate::data::model::ShipmentRecord;
use crate::spatial::curve::CurveConfig;
use crate::spatial::grouping::GroupingMode;
use crate::spatial::heatmap::{legend, Gradient, Heatmap, HeatmapConfig, LegendEntry};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for the derived views. Every field has a default, so a
/// config file only needs the keys it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub curve: CurveConfig,
    pub heatmap: HeatmapConfig,
    pub grouping: GroupingMode,
}

impl ViewConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing view config")
    }
}

// ---------------------------------------------------------------------------
// Dashboard view – everything the charts need for one filter state
// ---------------------------------------------------------------------------

/// Tabular derivations for one filter state. Map groupings borrow the
/// filtered records, so they are built on demand from [`DashboardView::filtered`].
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub filtered: Vec<ShipmentRecord>,
    pub summary: Summary,
    pub tonnes_by_year: PivotTable,
    pub tonnes_by_quarter: PivotTable,
    pub value_share_by_year: PivotTable,
    pub distribution: Vec<Share>,
    pub heatmap: Heatmap,
    pub gradient: Gradient,
    pub legend: Vec<LegendEntry>,
}

impl DashboardView {
    /// Full recomputation from the complete record set.
    pub fn compute(records: &[ShipmentRecord], filters: &FilterState, config: &ViewConfig) -> Self {
        let filtered = filter::apply(records, filters);
        log::debug!("filter kept {} of {} records", filtered.len(), records.len());

        let heatmap = Heatmap::build(&filtered, &config.heatmap);
        let gradient = Gradient::from_config(&config.heatmap);
        let legend = legend(&gradient, heatmap.max_value);

        Self {
            summary: aggregate::summarize(&filtered),
            tonnes_by_year: aggregate::sum_pivot(&filtered, TimeKey::Year),
            tonnes_by_quarter: aggregate::sum_pivot(&filtered, TimeKey::Quarter),
            value_share_by_year: aggregate::percentage_pivot(&filtered, TimeKey::Year),
            distribution: aggregate::distribution(&filtered),
            heatmap,
            gradient,
            legend,
            filtered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_fill_missing_keys() {
        let cfg = ViewConfig::from_json(r#"{"curve": {"magnification": 20.5}}"#).unwrap();
        assert_eq!(cfg.curve, CurveConfig::WORLD);
        assert_eq!(cfg.heatmap, HeatmapConfig::default());
        assert_eq!(cfg.grouping, GroupingMode::Destination);

        let cfg = ViewConfig::from_json(r#"{"grouping": "bidirectional"}"#).unwrap();
        assert_eq!(cfg.grouping, GroupingMode::Bidirectional);
    }

    #[test]
    fn empty_dataset_yields_empty_view() {
        let view = DashboardView::compute(&[], &FilterState::with_all_facets(), &ViewConfig::default());
        assert!(view.filtered.is_empty());
        assert_eq!(view.summary, Summary::default());
        assert!(view.tonnes_by_year.is_empty());
        assert!(view.distribution.is_empty());
        assert!(view.heatmap.is_empty());
        assert_eq!(view.legend.len(), 6);
    }
}
