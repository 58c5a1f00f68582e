use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::filter::Facet;
use super::model::ShipmentRecord;

// ---------------------------------------------------------------------------
// Temporal grouping key
// ---------------------------------------------------------------------------

/// Which temporal field a pivot groups rows by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeKey {
    Year,
    Quarter,
}

impl TimeKey {
    pub fn facet(self) -> Facet {
        match self {
            TimeKey::Year => Facet::OriginYear,
            TimeKey::Quarter => Facet::OriginQuarter,
        }
    }

    /// Name of the key column in exported rows.
    pub fn column(self) -> &'static str {
        match self {
            TimeKey::Year => "Year",
            TimeKey::Quarter => "Quarter",
        }
    }
}

// ---------------------------------------------------------------------------
// Pivot table
// ---------------------------------------------------------------------------

/// One temporal key with a value per material group (aligned with
/// [`PivotTable::groups`]).
#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub key: String,
    pub values: Vec<f64>,
}

/// A wide table: rows are temporal keys, columns are material groups.
/// Both axes keep first-occurrence order of the input records.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub time_key: TimeKey,
    pub groups: Vec<String>,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, key: &str) -> Option<&PivotRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    pub fn value(&self, key: &str, group: &str) -> Option<f64> {
        let col = self.groups.iter().position(|g| g == group)?;
        self.row(key).map(|r| r.values[col])
    }

    /// Sum over every cell.
    pub fn total(&self) -> f64 {
        self.rows.iter().flat_map(|r| r.values.iter()).sum()
    }

    /// Row objects as charting libraries expect them:
    /// `[{"Year": "2020", "Glass": 10.0, "Metals": 0.0}, ...]`.
    pub fn to_json(&self) -> JsonValue {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut obj = JsonMap::new();
                obj.insert(self.time_key.column().to_string(), JsonValue::from(row.key.clone()));
                for (group, v) in self.groups.iter().zip(&row.values) {
                    obj.insert(group.clone(), JsonValue::from(*v));
                }
                JsonValue::Object(obj)
            })
            .collect();
        JsonValue::Array(rows)
    }
}

/// Raw (unrounded) sums per (temporal key, material group).
struct Accumulator {
    keys: Vec<String>,
    groups: Vec<String>,
    sums: Vec<Vec<f64>>,
}

impl Accumulator {
    fn collect(records: &[ShipmentRecord], time_key: TimeKey, amount: fn(&ShipmentRecord) -> f64) -> Self {
        let key_of = time_key.facet().accessor();
        let keys = first_occurrence(records, key_of);
        let groups = first_occurrence(records, Facet::MaterialGroup.accessor());

        let key_idx: HashMap<&str, usize> = keys.iter().enumerate().map(|(i, k)| (k.as_str(), i)).collect();
        let group_idx: HashMap<&str, usize> = groups.iter().enumerate().map(|(i, g)| (g.as_str(), i)).collect();

        let mut sums = vec![vec![0.0; groups.len()]; keys.len()];
        for rec in records {
            let r = key_idx[key_of(rec)];
            let c = group_idx[rec.material_group.as_str()];
            sums[r][c] += amount(rec);
        }

        Self { keys, groups, sums }
    }

    fn into_table(self, time_key: TimeKey, cell: impl Fn(&[f64], f64) -> f64) -> PivotTable {
        let rows = self
            .keys
            .into_iter()
            .zip(self.sums)
            .map(|(key, sums)| PivotRow {
                values: sums.iter().map(|&s| cell(&sums, s)).collect(),
                key,
            })
            .collect();
        PivotTable {
            time_key,
            groups: self.groups,
            rows,
        }
    }
}

/// Tonnes per (temporal key, material group), rounded to one decimal.
pub fn sum_pivot(records: &[ShipmentRecord], time_key: TimeKey) -> PivotTable {
    Accumulator::collect(records, time_key, |r| r.origin.tonnes)
        .into_table(time_key, |_, s| round_to(s, 1))
}

/// Share of each material group in the key's total value, as a percentage
/// with two decimals. Keys whose total value is zero are all `0`.
pub fn percentage_pivot(records: &[ShipmentRecord], time_key: TimeKey) -> PivotTable {
    Accumulator::collect(records, time_key, |r| r.origin.value)
        .into_table(time_key, |row, s| percent_of(s, row.iter().sum()))
}

// ---------------------------------------------------------------------------
// Distribution (single snapshot)
// ---------------------------------------------------------------------------

/// One slice of the tonnage distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub group: String,
    pub tonnes: f64,
    pub percent: f64,
}

/// Tonnes per material group as a share of the grand total.
pub fn distribution(records: &[ShipmentRecord]) -> Vec<Share> {
    let groups = first_occurrence(records, Facet::MaterialGroup.accessor());
    let mut sums = vec![0.0; groups.len()];
    {
        let idx: HashMap<&str, usize> = groups.iter().enumerate().map(|(i, g)| (g.as_str(), i)).collect();
        for rec in records {
            sums[idx[rec.material_group.as_str()]] += rec.origin.tonnes;
        }
    }
    let total: f64 = sums.iter().sum();

    groups
        .into_iter()
        .zip(sums)
        .map(|(group, tonnes)| Share {
            group,
            tonnes,
            percent: percent_of(tonnes, total),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Scalar summary
// ---------------------------------------------------------------------------

/// Headline numbers for the summary cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub record_count: usize,
    pub total_tonnes: f64,
    pub total_value: f64,
    /// Weighted average `Σ value / Σ tonnes`.
    pub cost_per_tonne: f64,
    /// State with the most tonnes; `None` when no state exported anything.
    pub leading_state: Option<String>,
    /// Tonnes per state, first-encountered order.
    pub state_totals: Vec<(String, f64)>,
}

pub fn summarize(records: &[ShipmentRecord]) -> Summary {
    let mut total_tonnes = 0.0;
    let mut total_value = 0.0;
    let mut state_totals: Vec<(String, f64)> = Vec::new();
    let mut state_idx: HashMap<&str, usize> = HashMap::new();

    for rec in records {
        total_tonnes += rec.origin.tonnes;
        total_value += rec.origin.value;
        let i = *state_idx.entry(rec.origin.name.as_str()).or_insert_with(|| {
            state_totals.push((rec.origin.name.clone(), 0.0));
            state_totals.len() - 1
        });
        state_totals[i].1 += rec.origin.tonnes;
    }

    // strict `>` keeps the first state on ties
    let mut leading: Option<(&str, f64)> = None;
    for (state, tonnes) in &state_totals {
        if *tonnes > leading.map_or(0.0, |(_, t)| t) {
            leading = Some((state.as_str(), *tonnes));
        }
    }

    let cost_per_tonne = if total_value == 0.0 || total_tonnes == 0.0 {
        0.0
    } else {
        total_value / total_tonnes
    };

    Summary {
        record_count: records.len(),
        total_tonnes,
        total_value,
        cost_per_tonne,
        leading_state: leading.map(|(s, _)| s.to_string()),
        state_totals,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn first_occurrence(records: &[ShipmentRecord], field: fn(&ShipmentRecord) -> &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .map(field)
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Round half away from zero to `places` decimals.
pub fn round_to(v: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (v * scale).round() / scale
}

fn percent_of(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        round_to(part / total * 100.0, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Destination, Origin};

    fn rec(state: &str, year: &str, quarter: &str, group: &str, tonnes: f64, value: f64) -> ShipmentRecord {
        ShipmentRecord {
            origin: Origin {
                name: state.into(),
                coordinates: None,
                tonnes,
                value,
                year: year.into(),
                quarter: quarter.into(),
            },
            destination: Destination {
                name: "China".into(),
                coordinates: None,
                value,
            },
            material_group: group.into(),
            ahecc_code: String::new(),
            classification_info: String::new(),
        }
    }

    #[test]
    fn sum_pivot_fills_missing_cells_with_zero() {
        let records = vec![
            rec("NSW", "2020", "Q1", "Glass", 10.04, 1.0),
            rec("VIC", "2021", "Q2", "Metals", 5.0, 1.0),
            rec("VIC", "2020", "Q3", "Glass", 2.0, 1.0),
        ];
        let table = sum_pivot(&records, TimeKey::Year);

        assert_eq!(table.groups, ["Glass", "Metals"]);
        assert_eq!(table.rows.iter().map(|r| r.key.as_str()).collect::<Vec<_>>(), ["2020", "2021"]);
        assert_eq!(table.value("2020", "Glass"), Some(12.0));
        assert_eq!(table.value("2020", "Metals"), Some(0.0));
        assert_eq!(table.value("2021", "Metals"), Some(5.0));
    }

    #[test]
    fn quarter_pivot_groups_by_quarter() {
        let records = vec![
            rec("NSW", "2020", "Q1", "Glass", 1.0, 1.0),
            rec("NSW", "2021", "Q1", "Glass", 2.0, 1.0),
        ];
        let table = sum_pivot(&records, TimeKey::Quarter);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.value("Q1", "Glass"), Some(3.0));
    }

    #[test]
    fn percentage_pivot_zero_total_is_zero() {
        let records = vec![
            rec("NSW", "2020", "Q1", "Glass", 1.0, 0.0),
            rec("NSW", "2020", "Q1", "Metals", 1.0, 0.0),
            rec("NSW", "2021", "Q1", "Glass", 1.0, 30.0),
            rec("NSW", "2021", "Q1", "Metals", 1.0, 10.0),
        ];
        let table = percentage_pivot(&records, TimeKey::Year);

        let zero = table.row("2020").unwrap();
        assert!(zero.values.iter().all(|v| *v == 0.0));
        assert_eq!(table.value("2021", "Glass"), Some(75.0));
        assert_eq!(table.value("2021", "Metals"), Some(25.0));
    }

    #[test]
    fn distribution_percentages() {
        let records = vec![
            rec("NSW", "2020", "Q1", "Glass", 1.0, 0.0),
            rec("NSW", "2020", "Q1", "Metals", 2.0, 0.0),
        ];
        let dist = distribution(&records);
        assert_eq!(dist[0].group, "Glass");
        assert_eq!(dist[0].percent, 33.33);
        assert_eq!(dist[1].percent, 66.67);

        let zeros = distribution(&[rec("NSW", "2020", "Q1", "Glass", 0.0, 0.0)]);
        assert_eq!(zeros[0].percent, 0.0);
    }

    #[test]
    fn cost_per_tonne_and_leading_state() {
        let records = vec![
            rec("NSW", "2020", "Q1", "Glass", 10.0, 100.0),
            rec("VIC", "2020", "Q1", "Glass", 5.0, 200.0),
        ];
        let s = summarize(&records);
        assert_eq!(s.record_count, 2);
        assert_eq!(s.cost_per_tonne, 20.0);
        assert_eq!(s.leading_state.as_deref(), Some("NSW"));
    }

    #[test]
    fn leading_state_ties_keep_first() {
        let records = vec![
            rec("QLD", "2020", "Q1", "Glass", 4.0, 0.0),
            rec("WA", "2020", "Q1", "Glass", 4.0, 0.0),
        ];
        assert_eq!(summarize(&records).leading_state.as_deref(), Some("QLD"));
    }

    #[test]
    fn empty_input_gives_empty_shapes() {
        assert!(sum_pivot(&[], TimeKey::Year).is_empty());
        assert!(percentage_pivot(&[], TimeKey::Quarter).groups.is_empty());
        assert!(distribution(&[]).is_empty());

        let s = summarize(&[]);
        assert_eq!(s, Summary::default());
    }

    #[test]
    fn json_rows_carry_key_column() {
        let records = vec![rec("NSW", "2020", "Q1", "Glass", 1.25, 0.0)];
        let json = sum_pivot(&records, TimeKey::Year).to_json();
        assert_eq!(json, serde_json::json!([{"Year": "2020", "Glass": 1.3}]));
    }
}
