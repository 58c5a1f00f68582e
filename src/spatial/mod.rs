//! Map-side derivations over a filtered record set.
//!
//! ```text
//!  filtered records
//!     │
//!     ├──► grouping  coordinate key → GeoGroup (markers, popups)
//!     ├──► heatmap   [lat, lng, value] samples, gradient, legend
//!     └──► curve     origin → destination Bézier flow lines
//!
//!  single point ──► country  point-in-polygon lookup
//! ```

pub mod country;
pub mod curve;
pub mod grouping;
pub mod heatmap;

use crate::data::model::{LatLng, ShipmentRecord};

/// Axis-aligned extent of a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}

/// Extent of every origin and destination coordinate, for fitting the map.
pub fn bounds(records: &[ShipmentRecord]) -> Option<Bounds> {
    records
        .iter()
        .flat_map(|r| [r.origin.coordinates, r.destination.coordinates])
        .flatten()
        .fold(None, |acc: Option<Bounds>, p| {
            Some(match acc {
                None => Bounds {
                    south_west: p,
                    north_east: p,
                },
                Some(b) => Bounds {
                    south_west: LatLng::new(b.south_west.lat.min(p.lat), b.south_west.lng.min(p.lng)),
                    north_east: LatLng::new(b.north_east.lat.max(p.lat), b.north_east.lng.max(p.lng)),
                },
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Destination, Origin};

    #[test]
    fn bounds_cover_both_endpoints() {
        let rec = ShipmentRecord {
            origin: Origin {
                name: "TAS".into(),
                coordinates: Some(LatLng::new(-42.0, 147.0)),
                tonnes: 0.0,
                value: 0.0,
                year: String::new(),
                quarter: String::new(),
            },
            destination: Destination {
                name: "Vietnam".into(),
                coordinates: Some(LatLng::new(16.0, 108.0)),
                value: 0.0,
            },
            material_group: String::new(),
            ahecc_code: String::new(),
            classification_info: String::new(),
        };
        let b = bounds(&[rec]).unwrap();
        assert_eq!(b.south_west, LatLng::new(-42.0, 108.0));
        assert_eq!(b.north_east, LatLng::new(16.0, 147.0));
        assert_eq!(b.center(), LatLng::new(-13.0, 127.5));
        assert!(bounds(&[]).is_none());
    }
}
