use geo::{Contains, Geometry, MultiPolygon, Point};
use geojson::GeoJson;
use thiserror::Error;

use crate::data::model::LatLng;

/// Feature properties tried, in order, for a country's display name.
const NAME_PROPERTIES: [&str; 3] = ["ADMIN", "name", "NAME"];

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,
}

/// One country outline. Single polygons are stored as one-part multipolygons.
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

impl Country {
    pub fn contains(&self, at: LatLng) -> bool {
        self.geometry.contains(&Point::new(at.lng, at.lat))
    }
}

/// Fixed set of boundaries for on-demand lookups. Each call scans every
/// country, so resolve single points, not whole datasets.
#[derive(Debug, Clone, Default)]
pub struct CountryBoundaries {
    countries: Vec<Country>,
}

impl CountryBoundaries {
    pub fn new(countries: Vec<Country>) -> Self {
        Self { countries }
    }

    /// Parse a FeatureCollection. Features with no geometry, or with
    /// geometry other than `Polygon`/`MultiPolygon`, are skipped.
    pub fn from_geojson_str(text: &str) -> Result<Self, BoundaryError> {
        let GeoJson::FeatureCollection(fc) = text.parse::<GeoJson>()? else {
            return Err(BoundaryError::NotFeatureCollection);
        };

        let mut countries = Vec::with_capacity(fc.features.len());
        for feature in fc.features {
            let name = NAME_PROPERTIES
                .iter()
                .find_map(|key| feature.property(key).and_then(|v| v.as_str()))
                .unwrap_or("")
                .to_string();

            let Some(gj) = feature.geometry else {
                log::debug!("boundary {name:?} has no geometry, skipping");
                continue;
            };
            let geometry = match Geometry::<f64>::try_from(gj.value)? {
                Geometry::Polygon(p) => MultiPolygon(vec![p]),
                Geometry::MultiPolygon(m) => m,
                _ => {
                    log::debug!("boundary {name:?} is not a polygon, skipping");
                    continue;
                }
            };
            countries.push(Country { name, geometry });
        }

        log::info!("loaded {} country boundaries", countries.len());
        Ok(Self { countries })
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// First country whose outline contains the point.
    pub fn resolve(&self, at: LatLng) -> Option<&Country> {
        self.countries.iter().find(|c| c.contains(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARIES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"ADMIN": "Squareland"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"name": "Islands"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[20, 20], [22, 20], [22, 22], [20, 22], [20, 20]]],
                        [[[30, -5], [32, -5], [32, -3], [30, -3], [30, -5]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": {"ADMIN": "Capital"},
                "geometry": {"type": "Point", "coordinates": [5, 5]}
            }
        ]
    }"#;

    #[test]
    fn resolves_polygon_and_multipolygon() {
        let b = CountryBoundaries::from_geojson_str(BOUNDARIES).unwrap();
        assert_eq!(b.len(), 2);

        // LatLng is (lat, lng); GeoJSON is (lng, lat)
        assert_eq!(b.resolve(LatLng::new(5.0, 5.0)).unwrap().name, "Squareland");
        assert_eq!(b.resolve(LatLng::new(-4.0, 31.0)).unwrap().name, "Islands");
        assert!(b.resolve(LatLng::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn rejects_non_collections() {
        let point = r#"{"type": "Point", "coordinates": [1, 2]}"#;
        assert!(matches!(
            CountryBoundaries::from_geojson_str(point),
            Err(BoundaryError::NotFeatureCollection)
        ));
        assert!(matches!(
            CountryBoundaries::from_geojson_str("{not json"),
            Err(BoundaryError::GeoJson(_))
        ));
    }
}
