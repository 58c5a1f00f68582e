use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::ShipmentRecord;

/// Sentinel selection meaning "no constraint on this facet".
pub const ALL: &str = "All";

// ---------------------------------------------------------------------------
// Facet – a filterable dimension of a record
// ---------------------------------------------------------------------------

/// The filterable dimensions. Each facet has a stable string key matching the
/// dataset's dotted field path and a typed accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Facet {
    #[serde(rename = "destination.name")]
    DestinationName,
    #[serde(rename = "origin.year")]
    OriginYear,
    #[serde(rename = "origin.quarter")]
    OriginQuarter,
    #[serde(rename = "materialGroup")]
    MaterialGroup,
    #[serde(rename = "origin.name")]
    OriginName,
    #[serde(rename = "aheccCode")]
    AheccCode,
}

type Accessor = fn(&ShipmentRecord) -> &str;

impl Facet {
    /// Every facet, in the order the filter bar shows them.
    pub const ALL: [Facet; 6] = [
        Facet::DestinationName,
        Facet::OriginYear,
        Facet::OriginQuarter,
        Facet::MaterialGroup,
        Facet::OriginName,
        Facet::AheccCode,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Facet::DestinationName => "destination.name",
            Facet::OriginYear => "origin.year",
            Facet::OriginQuarter => "origin.quarter",
            Facet::MaterialGroup => "materialGroup",
            Facet::OriginName => "origin.name",
            Facet::AheccCode => "aheccCode",
        }
    }

    /// Resolve a string key. The published dataset spells the material facet
    /// `MaterialGroup`, so that spelling is accepted too.
    pub fn from_key(key: &str) -> Option<Facet> {
        match key {
            "MaterialGroup" => Some(Facet::MaterialGroup),
            "AHECC" => Some(Facet::AheccCode),
            _ => Facet::ALL.into_iter().find(|f| f.key() == key),
        }
    }

    /// Short human label for the filter bar.
    pub fn label(self) -> &'static str {
        match self {
            Facet::DestinationName => "Destination",
            Facet::OriginYear => "Year",
            Facet::OriginQuarter => "Quarter",
            Facet::MaterialGroup => "Class",
            Facet::OriginName => "State",
            Facet::AheccCode => "AHECC",
        }
    }

    pub fn accessor(self) -> Accessor {
        match self {
            Facet::DestinationName => destination_name,
            Facet::OriginYear => origin_year,
            Facet::OriginQuarter => origin_quarter,
            Facet::MaterialGroup => material_group,
            Facet::OriginName => origin_name,
            Facet::AheccCode => ahecc_code,
        }
    }

    pub fn value_of(self, record: &ShipmentRecord) -> &str {
        (self.accessor())(record)
    }
}

fn destination_name(r: &ShipmentRecord) -> &str {
    &r.destination.name
}

fn origin_year(r: &ShipmentRecord) -> &str {
    &r.origin.year
}

fn origin_quarter(r: &ShipmentRecord) -> &str {
    &r.origin.quarter
}

fn material_group(r: &ShipmentRecord) -> &str {
    &r.material_group
}

fn origin_name(r: &ShipmentRecord) -> &str {
    &r.origin.name
}

fn ahecc_code(r: &ShipmentRecord) -> &str {
    &r.ahecc_code
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// FilterState – selected values per facet
// ---------------------------------------------------------------------------

/// Per-facet selection state. A facet that is absent, empty, or holds the
/// [`ALL`] sentinel does not constrain the result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterState {
    selections: BTreeMap<Facet, BTreeSet<String>>,
}

/// An absent facet and an empty selection are the same state.
impl PartialEq for FilterState {
    fn eq(&self, other: &Self) -> bool {
        Facet::ALL
            .into_iter()
            .all(|facet| self.picked(facet) == other.picked(facet))
    }
}

impl Eq for FilterState {}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// One empty selection per facet, the dashboard's initial state.
    pub fn with_all_facets() -> Self {
        Self {
            selections: Facet::ALL
                .into_iter()
                .map(|f| (f, BTreeSet::new()))
                .collect(),
        }
    }

    /// Build from string keys, skipping unknown ones.
    pub fn from_pairs<'a, I, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: IntoIterator<Item = &'a str>,
    {
        let mut state = Self::new();
        for (key, values) in pairs {
            let Some(facet) = Facet::from_key(key) else {
                log::debug!("ignoring unknown facet key {key:?}");
                continue;
            };
            let selected = state.selections.entry(facet).or_default();
            selected.extend(values.into_iter().map(str::to_string));
        }
        state
    }

    /// Non-empty selection for a facet.
    fn picked(&self, facet: Facet) -> Option<&BTreeSet<String>> {
        self.selections.get(&facet).filter(|set| !set.is_empty())
    }

    pub fn selection(&self, facet: Facet) -> Option<&BTreeSet<String>> {
        self.selections.get(&facet)
    }

    pub fn is_selected(&self, facet: Facet, value: &str) -> bool {
        self.selections
            .get(&facet)
            .is_some_and(|s| s.contains(value))
    }

    /// Whether this facet actually narrows the record set.
    pub fn is_constrained(&self, facet: Facet) -> bool {
        self.selections
            .get(&facet)
            .is_some_and(|s| !s.is_empty() && !s.contains(ALL))
    }

    /// Toggle one value in a facet.
    ///
    /// `"All"` flips between `{All}` and nothing; any concrete value first
    /// drops the sentinel and is then added or removed.
    pub fn toggle(&mut self, facet: Facet, value: &str) {
        let selected = self.selections.entry(facet).or_default();
        if value == ALL {
            let was_all = selected.contains(ALL);
            selected.clear();
            if !was_all {
                selected.insert(ALL.to_string());
            }
            return;
        }
        selected.remove(ALL);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    /// Toggle by string key; returns `false` (and changes nothing) when the
    /// key is not a known facet.
    pub fn toggle_key(&mut self, key: &str, value: &str) -> bool {
        match Facet::from_key(key) {
            Some(facet) => {
                self.toggle(facet, value);
                true
            }
            None => {
                log::debug!("ignoring toggle on unknown facet key {key:?}");
                false
            }
        }
    }

    /// Reset a facet to "no selection".
    pub fn clear(&mut self, facet: Facet) {
        self.selections.insert(facet, BTreeSet::new());
    }

    pub fn clear_all(&mut self) {
        for facet in Facet::ALL {
            self.clear(facet);
        }
    }

    /// Whether a record passes every facet.
    pub fn matches(&self, record: &ShipmentRecord) -> bool {
        self.selections.iter().all(|(facet, selected)| {
            selected.is_empty() || selected.contains(ALL) || selected.contains(facet.value_of(record))
        })
    }

    /// Selected values joined for display, or `"No selection"`.
    pub fn display(&self, facet: Facet) -> String {
        match self.selections.get(&facet) {
            Some(s) if !s.is_empty() => s.iter().map(String::as_str).collect::<Vec<_>>().join(" | "),
            _ => "No selection".to_string(),
        }
    }

    /// Button caption: `"3 Year(s)"` when something is picked, else the label.
    pub fn caption(&self, facet: Facet) -> String {
        match self.selections.get(&facet).map(BTreeSet::len) {
            Some(n) if n > 0 => format!("{n} {}(s)", facet.label()),
            _ => facet.label().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Records passing all active facets, in input order.
pub fn apply(records: &[ShipmentRecord], filters: &FilterState) -> Vec<ShipmentRecord> {
    records
        .iter()
        .filter(|r| filters.matches(r))
        .cloned()
        .collect()
}

/// Sorted distinct values of a facet, prefixed with [`ALL`].
pub fn distinct_values(records: &[ShipmentRecord], facet: Facet) -> Vec<String> {
    let unique: BTreeSet<&str> = records.iter().map(|r| facet.value_of(r)).collect();
    let mut values: Vec<&str> = unique.into_iter().collect();
    values.sort_by(|a, b| natural_cmp(a, b));

    std::iter::once(ALL)
        .chain(values)
        .map(str::to_string)
        .collect()
}

/// Numbers first in numeric order, then text in lexicographic order.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
