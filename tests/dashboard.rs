//! End-to-end checks of the derivation pipeline through the public API.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use waste_flow::data::aggregate::{distribution, percentage_pivot, sum_pivot, summarize, TimeKey};
use waste_flow::data::filter::{apply, distinct_values, Facet, FilterState, ALL};
use waste_flow::data::loader::{load_file, parse_json};
use waste_flow::data::model::{LatLng, ShipmentRecord};
use waste_flow::spatial::curve::{generate_curve, CurveConfig, CURVE_SEGMENTS};
use waste_flow::spatial::grouping::{group_by_coordinates, GroupingMode, MarkerSummary};
use waste_flow::view::{DashboardView, ViewConfig};

const FIXTURE: &str = r#"[
  {"origin": {"name": "Victoria", "coordinates": [-37.8, 144.9], "tonnes": 100, "value": 2000, "year": "2020", "quarter": "2020-Q1"},
   "destination": {"name": "China", "coordinates": [39.9, 116.4], "value": 2000},
   "MaterialGroup": "Metals", "AHECC": "72044900", "AdditionalClassificationInformation": "Ferrous scrap"},
  {"origin": {"name": "New South Wales", "coordinates": [-33.8, 151.2], "tonnes": 50, "value": 500, "year": "2021", "quarter": "2021-Q2"},
   "destination": {"name": "India", "coordinates": [28.6, 77.2], "value": 500},
   "MaterialGroup": "Glass", "AHECC": "70010000", "AdditionalClassificationInformation": "Cullet"},
  {"origin": {"name": "Victoria", "coordinates": [-37.8, 144.9], "tonnes": 30, "value": 900, "year": "2020", "quarter": "2020-Q2"},
   "destination": {"name": "India", "coordinates": [28.6, 77.2], "value": 900},
   "MaterialGroup": "Glass", "AHECC": "70010000", "AdditionalClassificationInformation": "Cullet"},
  {"origin": {"name": "Queensland", "coordinates": [-27.4, 153.0], "tonnes": 20, "value": 0, "year": "2022", "quarter": "2022-Q1"},
   "destination": {"name": "Malaysia", "coordinates": null, "value": 0},
   "MaterialGroup": "Plastics", "AHECC": "39159000", "AdditionalClassificationInformation": "Other plastics"}
]"#;

fn fixture() -> Vec<ShipmentRecord> {
    parse_json(FIXTURE).unwrap()
}

fn shipment(state: &str, dest: [f64; 2], tonnes: f64, value: f64) -> ShipmentRecord {
    let text = format!(
        r#"{{"origin": {{"name": "{state}", "coordinates": [-37.8, 144.9], "tonnes": {tonnes}, "value": {value}, "year": "2020", "quarter": "2020-Q1"}},
            "destination": {{"name": "Somewhere", "coordinates": [{}, {}], "value": {value}}},
            "MaterialGroup": "Metals", "AHECC": "1", "AdditionalClassificationInformation": "Scrap"}}"#,
        dest[0], dest[1]
    );
    serde_json::from_str(&text).unwrap()
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

#[test]
fn year_filter_keeps_matching_records_in_order() {
    let records = fixture();
    let mut filters = FilterState::with_all_facets();
    filters.toggle(Facet::OriginYear, "2020");

    let kept = apply(&records, &filters);
    assert_eq!(kept.len(), 2);
    assert!(kept.iter().all(|r| r.origin.year == "2020"));
    assert_eq!(kept[0].material_group, "Metals");
    assert_eq!(kept[1].material_group, "Glass");
}

#[test]
fn filters_combine_across_facets_and_within_a_facet() {
    let records = fixture();
    let filters = FilterState::from_pairs([
        ("destination.name", vec!["India", "China"]),
        ("MaterialGroup", vec!["Glass"]),
    ]);
    let kept = apply(&records, &filters);
    assert_eq!(kept.len(), 2);
    assert!(kept.iter().all(|r| r.destination.name == "India"));
}

#[test]
fn filtering_is_idempotent() {
    let records = fixture();
    let filters = FilterState::from_pairs([("origin.name", vec!["Victoria"])]);
    let once = apply(&records, &filters);
    let twice = apply(&once, &filters);
    assert_eq!(once, twice);
}

#[test]
fn empty_or_all_selection_is_identity() {
    let records = fixture();
    assert_eq!(apply(&records, &FilterState::with_all_facets()), records);

    let mut filters = FilterState::with_all_facets();
    filters.toggle(Facet::MaterialGroup, ALL);
    assert!(filters.is_selected(Facet::MaterialGroup, ALL));
    assert_eq!(apply(&records, &filters), records);
}

#[test]
fn toggling_twice_restores_selection() {
    let mut filters = FilterState::from_pairs([("origin.year", vec!["2021"])]);
    let before = filters.clone();
    filters.toggle(Facet::OriginYear, "2020");
    assert_ne!(filters, before);
    filters.toggle(Facet::OriginYear, "2020");
    assert_eq!(filters, before);

    // a facet the state never mentioned
    filters.toggle(Facet::MaterialGroup, "Glass");
    filters.toggle(Facet::MaterialGroup, "Glass");
    assert_eq!(filters, before);
    assert_eq!(apply(&fixture(), &filters), apply(&fixture(), &before));
}

#[test]
fn concrete_value_replaces_all_sentinel() {
    let mut filters = FilterState::with_all_facets();
    filters.toggle(Facet::OriginName, ALL);
    filters.toggle(Facet::OriginName, "Victoria");
    assert!(!filters.is_selected(Facet::OriginName, ALL));
    assert_eq!(filters.display(Facet::OriginName), "Victoria");
    assert_eq!(apply(&fixture(), &filters).len(), 2);
}

#[test]
fn distinct_values_lead_with_all() {
    let years = distinct_values(&fixture(), Facet::OriginYear);
    assert_eq!(years, vec![ALL, "2020", "2021", "2022"]);
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[test]
fn sum_pivot_conserves_total_tonnes() {
    let records = fixture();
    let table = sum_pivot(&records, TimeKey::Year);
    let total: f64 = records.iter().map(|r| r.origin.tonnes).sum();
    assert!((table.total() - total).abs() < 1e-9);
    assert_eq!(table.value("2020", "Glass"), Some(30.0));
    assert_eq!(table.value("2021", "Metals"), Some(0.0));
}

#[test]
fn percentage_rows_are_bounded_and_sum_to_hundred() {
    let table = percentage_pivot(&fixture(), TimeKey::Year);
    for row in &table.rows {
        assert!(row.values.iter().all(|v| (0.0..=100.0).contains(v)));
        let sum: f64 = row.values.iter().sum();
        if row.key == "2022" {
            // no value exported that year
            assert_eq!(sum, 0.0);
        } else {
            assert!((sum - 100.0).abs() < 0.05, "row {} sums to {sum}", row.key);
        }
    }
    assert_eq!(table.value("2020", "Metals"), Some(68.97));
}

#[test]
fn distribution_shares_sum_to_hundred() {
    let shares = distribution(&fixture());
    let sum: f64 = shares.iter().map(|s| s.percent).sum();
    assert!((sum - 100.0).abs() < 0.05);
    assert_eq!(shares[0].group, "Metals");
}

#[test]
fn cost_per_tonne_is_weighted_average() {
    let mut records = vec![
        shipment("Victoria", [10.0, 20.0], 10.0, 200.0),
        shipment("Tasmania", [10.0, 20.0], 5.0, 100.0),
    ];
    let summary = summarize(&records);
    assert_eq!(summary.record_count, 2);
    assert_eq!(summary.cost_per_tonne, 20.0);

    // tie on tonnes goes to the first state seen
    records.push(shipment("Tasmania", [10.0, 20.0], 5.0, 0.0));
    let summary = summarize(&records);
    assert_eq!(summary.cost_per_tonne, 15.0);
    assert_eq!(summary.leading_state.as_deref(), Some("Victoria"));
}

// ---------------------------------------------------------------------------
// Spatial
// ---------------------------------------------------------------------------

#[test]
fn shared_destination_forms_one_aggregate_marker() {
    let records = vec![
        shipment("Victoria", [10.0, 20.0], 12.5, 100.0),
        shipment("Tasmania", [10.0, 20.0], 7.5, 300.0),
        shipment("Victoria", [11.0, 20.0], 1.0, 5.0),
    ];
    let groups = group_by_coordinates(&records, GroupingMode::Destination);
    assert_eq!(groups.len(), 2);

    let group = groups.get("10,20").unwrap();
    assert_eq!(group.len(), 2);
    match group.summary() {
        MarkerSummary::Aggregate {
            total_tonnes,
            total_cost,
            shipments,
            ..
        } => {
            assert_eq!(total_tonnes, 20.0);
            assert_eq!(total_cost, 400.0);
            assert_eq!(shipments, 2);
        }
        other => panic!("expected aggregate, got {other:?}"),
    }
}

#[test]
fn curve_endpoints_are_exact() {
    let start = LatLng::new(-37.81, 144.96);
    let end = LatLng::new(39.9, 116.41);
    for config in [CurveConfig::FLOW, CurveConfig::WORLD] {
        let points = generate_curve(start, end, &config);
        assert_eq!(points.len(), CURVE_SEGMENTS + 1);
        assert_eq!(points[0], start);
        assert_eq!(points[CURVE_SEGMENTS], end);
    }
}

#[test]
fn dashboard_view_ties_everything_together() {
    let records = fixture();
    let filters = FilterState::from_pairs([("origin.name", vec!["Victoria", "Queensland"])]);
    let view = DashboardView::compute(&records, &filters, &ViewConfig::default());

    assert_eq!(view.filtered.len(), 3);
    assert_eq!(view.summary.leading_state.as_deref(), Some("Victoria"));
    assert_eq!(view.tonnes_by_year.rows.len(), 2);
    // the Queensland shipment has no destination coordinate
    assert_eq!(view.heatmap.samples.len(), 2);
    let max = view
        .heatmap
        .normalized()
        .iter()
        .map(|s| s[2])
        .fold(0.0, f64::max);
    assert_eq!(max, 1.0);
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn parquet_with_numeric_columns_loads() {
    let schema = Arc::new(Schema::new(vec![
        Field::new("origin_name", DataType::Utf8, false),
        Field::new("tonnes", DataType::Float64, false),
        Field::new("year", DataType::Int64, false),
        Field::new("destination_name", DataType::Utf8, false),
        Field::new("destination_lat", DataType::Float64, true),
        Field::new("destination_lng", DataType::Float64, true),
        Field::new("material_group", DataType::Utf8, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["Victoria", "Tasmania"])),
        Arc::new(Float64Array::from(vec![12.5, 3.0])),
        Arc::new(Int64Array::from(vec![2020, 2021])),
        Arc::new(StringArray::from(vec!["China", "India"])),
        Arc::new(Float64Array::from(vec![Some(39.9), None])),
        Arc::new(Float64Array::from(vec![Some(116.4), None])),
        Arc::new(StringArray::from(vec!["Metals", "Glass"])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

    let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
    let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let records = load_file(file.path()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].origin.tonnes, 12.5);
    assert_eq!(records[0].origin.year, "2020");
    assert_eq!(records[0].destination.coordinates, Some(LatLng::new(39.9, 116.4)));
    assert_eq!(records[1].destination.coordinates, None);
    assert_eq!(records[1].material_group, "Glass");
}
