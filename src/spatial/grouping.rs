use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::aggregate::round_to;
use crate::data::model::{LatLng, ShipmentRecord};

/// Which endpoints contribute markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// One marker per destination coordinate.
    #[default]
    Destination,
    /// Origins and destinations both become markers; a record joins the group
    /// at each of its endpoints.
    Bidirectional,
}

// ---------------------------------------------------------------------------
// GeoGroup – records sharing one coordinate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GeoGroup<'a> {
    pub key: String,
    pub position: LatLng,
    /// Name of whichever endpoint created the group.
    pub name: String,
    pub members: Vec<&'a ShipmentRecord>,
}

/// Popup content for a marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MarkerSummary {
    Single {
        origin: String,
        destination: String,
        tonnes: f64,
        class: String,
        quarter: String,
        ahecc: String,
    },
    Aggregate {
        total_tonnes: f64,
        total_cost: f64,
        shipments: usize,
        classes: Vec<String>,
    },
}

impl<'a> GeoGroup<'a> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Σ `origin.tonnes`, one decimal.
    pub fn total_tonnes(&self) -> f64 {
        round_to(self.members.iter().map(|r| r.origin.tonnes).sum(), 1)
    }

    /// Σ `destination.value`, one decimal.
    pub fn total_cost(&self) -> f64 {
        round_to(self.members.iter().map(|r| r.destination.value).sum(), 1)
    }

    /// Distinct classification texts, first-seen order.
    pub fn classes(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for rec in &self.members {
            if !out.contains(&rec.classification_info) {
                out.push(rec.classification_info.clone());
            }
        }
        out
    }

    pub fn summary(&self) -> MarkerSummary {
        match self.members.as_slice() {
            [only] => MarkerSummary::Single {
                origin: only.origin.name.clone(),
                destination: only.destination.name.clone(),
                tonnes: only.origin.tonnes,
                class: only.classification_info.clone(),
                quarter: only.origin.quarter.clone(),
                ahecc: only.ahecc_code.clone(),
            },
            _ => MarkerSummary::Aggregate {
                total_tonnes: self.total_tonnes(),
                total_cost: self.total_cost(),
                shipments: self.len(),
                classes: self.classes(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// GeoGroups – ordered, keyed collection
// ---------------------------------------------------------------------------

/// Groups in first-insertion order with lookup by coordinate key.
#[derive(Debug, Clone, Default)]
pub struct GeoGroups<'a> {
    groups: Vec<GeoGroup<'a>>,
    index: HashMap<String, usize>,
}

impl<'a> GeoGroups<'a> {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&GeoGroup<'a>> {
        self.index.get(key).map(|&i| &self.groups[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeoGroup<'a>> {
        self.groups.iter()
    }

    fn push(&mut self, position: LatLng, name: &str, record: &'a ShipmentRecord) {
        let key = position.key();
        let i = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                self.groups.push(GeoGroup {
                    key: key.clone(),
                    position,
                    name: name.to_string(),
                    members: Vec::new(),
                });
                self.index.insert(key, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[i].members.push(record);
    }
}

impl<'a, 'g> IntoIterator for &'g GeoGroups<'a> {
    type Item = &'g GeoGroup<'a>;
    type IntoIter = std::slice::Iter<'g, GeoGroup<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Group records by coordinate key. Records missing a coordinate the mode
/// needs are skipped: the destination in `Destination` mode, either endpoint
/// in `Bidirectional` mode.
pub fn group_by_coordinates(records: &[ShipmentRecord], mode: GroupingMode) -> GeoGroups<'_> {
    let mut groups = GeoGroups::default();
    for rec in records {
        match mode {
            GroupingMode::Destination => {
                if let Some(pos) = rec.destination.coordinates {
                    groups.push(pos, &rec.destination.name, rec);
                }
            }
            GroupingMode::Bidirectional => {
                if let Some((from, to)) = rec.endpoints() {
                    groups.push(from, &rec.origin.name, rec);
                    groups.push(to, &rec.destination.name, rec);
                }
            }
        }
    }
    log::debug!("grouped {} records into {} markers ({mode:?})", records.len(), groups.len());
    groups
}
