use waste_flow::data::filter::{distinct_values, Facet, FilterState};
use waste_flow::data::model::{LatLng, ShipmentRecord};
use waste_flow::spatial::country::CountryBoundaries;
use waste_flow::view::{DashboardView, ViewConfig};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Map,
    Charts,
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chart {
    TonnesByYear,
    ValueShareByYear,
    TonnesByQuarter,
    Distribution,
}

impl Chart {
    pub const ALL: [Chart; 4] = [
        Chart::TonnesByYear,
        Chart::ValueShareByYear,
        Chart::TonnesByQuarter,
        Chart::Distribution,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Chart::TonnesByYear => "Exported Waste Categories (tonnes) By Years",
            Chart::ValueShareByYear => "Exported Waste Categories (Value %) By Years",
            Chart::TonnesByQuarter => "Exported Waste (tonnes) By Quarters",
            Chart::Distribution => "Waste Distribution (% of tonnes)",
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Complete dataset; never filtered in place.
    pub records: Vec<ShipmentRecord>,

    /// Options offered per facet, taken from the complete dataset.
    pub options: Vec<(Facet, Vec<String>)>,

    /// Per-facet filter selections.
    pub filters: FilterState,

    pub config: ViewConfig,

    /// Derivations for the current filters (recomputed on every change).
    pub view: DashboardView,

    pub boundaries: Option<CountryBoundaries>,

    /// Coordinate key of the clicked marker; its flow lines are drawn.
    pub selected_marker: Option<String>,

    /// Country under the last map click.
    pub clicked_country: Option<String>,

    pub tab: Tab,
    pub chart: Chart,
    pub show_heatmap: bool,
    /// Draw every filtered shipment's flow line, not just the selected marker's.
    pub show_flows: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: ViewConfig) -> Self {
        let filters = FilterState::with_all_facets();
        let view = DashboardView::compute(&[], &filters, &config);
        Self {
            records: Vec::new(),
            options: Vec::new(),
            filters,
            config,
            view,
            boundaries: None,
            selected_marker: None,
            clicked_country: None,
            tab: Tab::Map,
            chart: Chart::TonnesByYear,
            show_heatmap: true,
            show_flows: false,
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset and reset the filters.
    pub fn set_records(&mut self, records: Vec<ShipmentRecord>) {
        self.options = Facet::ALL
            .into_iter()
            .map(|f| (f, distinct_values(&records, f)))
            .collect();
        self.records = records;
        self.filters = FilterState::with_all_facets();
        self.status_message = None;
        self.refilter();
    }

    pub fn set_boundaries(&mut self, boundaries: CountryBoundaries) {
        self.boundaries = Some(boundaries);
        self.clicked_country = None;
    }

    /// Recompute every derived view after a filter change.
    pub fn refilter(&mut self) {
        self.view = DashboardView::compute(&self.records, &self.filters, &self.config);
        self.selected_marker = None;
    }

    pub fn toggle_filter_value(&mut self, facet: Facet, value: &str) {
        self.filters.toggle(facet, value);
        self.refilter();
    }

    pub fn clear_filter(&mut self, facet: Facet) {
        self.filters.clear(facet);
        self.refilter();
    }

    pub fn clear_all_filters(&mut self) {
        self.filters.clear_all();
        self.refilter();
    }

    /// Handle a click on the map: pick the marker (if any) and look up the
    /// country under the pointer.
    pub fn click_map(&mut self, at: LatLng, marker: Option<String>) {
        self.selected_marker = marker;
        self.clicked_country = self
            .boundaries
            .as_ref()
            .and_then(|b| b.resolve(at))
            .map(|c| c.name.clone());
    }
}
