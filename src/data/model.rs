use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

// ---------------------------------------------------------------------------
// LatLng – a `[latitude, longitude]` pair
// ---------------------------------------------------------------------------

/// A geographic coordinate. Serialized as `[lat, lng]` to match the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build from a `[lat, lng]` pair, rejecting non-finite components.
    pub fn from_pair(lat: f64, lng: f64) -> Option<Self> {
        (lat.is_finite() && lng.is_finite()).then_some(Self { lat, lng })
    }

    /// Canonical grouping key: components joined with `,`.
    ///
    /// Uses the shortest round-trip rendering, so `10.0` becomes `"10"` and
    /// two records at the same coordinate always share a key. `-0.0` renders
    /// as `"0"`.
    pub fn key(&self) -> String {
        format!("{},{}", self.lat + 0.0, self.lng + 0.0)
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(p: LatLng) -> Self {
        [p.lat, p.lng]
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.4}, {:.4}]", self.lat, self.lng)
    }
}

// ---------------------------------------------------------------------------
// Origin / Destination
// ---------------------------------------------------------------------------

/// The exporting side of a shipment (an Australian state).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_coordinates")]
    pub coordinates: Option<LatLng>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub tonnes: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub value: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub quarter: String,
}

/// The importing country of a shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_coordinates")]
    pub coordinates: Option<LatLng>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub value: f64,
}

// ---------------------------------------------------------------------------
// ShipmentRecord – one trade flow in one period
// ---------------------------------------------------------------------------

/// A single export flow. Field names on the wire follow the published dataset
/// (`MaterialGroup`, `AHECC`, `AdditionalClassificationInformation`); the
/// camel-case spellings are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub origin: Origin,
    pub destination: Destination,
    #[serde(
        rename = "MaterialGroup",
        alias = "materialGroup",
        default,
        deserialize_with = "lenient_string"
    )]
    pub material_group: String,
    #[serde(
        rename = "AHECC",
        alias = "aheccCode",
        default,
        deserialize_with = "lenient_string"
    )]
    pub ahecc_code: String,
    #[serde(
        rename = "AdditionalClassificationInformation",
        alias = "classificationInfo",
        default,
        deserialize_with = "lenient_string"
    )]
    pub classification_info: String,
}

impl ShipmentRecord {
    /// Both endpoints, when the record can be drawn on the map.
    pub fn endpoints(&self) -> Option<(LatLng, LatLng)> {
        Some((self.origin.coordinates?, self.destination.coordinates?))
    }
}

// ---------------------------------------------------------------------------
// Coercion helpers
// ---------------------------------------------------------------------------

/// Interpret free text as a non-negative amount. Anything unparseable,
/// non-finite or negative becomes `0.0`.
pub fn coerce_amount(text: &str) -> f64 {
    sanitize_amount(text.trim().parse::<f64>().unwrap_or(0.0))
}

/// Clamp an already-numeric amount into the valid domain.
pub fn sanitize_amount(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// Parse a `(lat, lng)` pair given as text.
pub fn coerce_coordinates(lat: &str, lng: &str) -> Option<LatLng> {
    let lat = lat.trim().parse::<f64>().ok()?;
    let lng = lng.trim().parse::<f64>().ok()?;
    LatLng::from_pair(lat, lng)
}

fn json_amount(val: &JsonValue) -> f64 {
    match val {
        JsonValue::Number(n) => sanitize_amount(n.as_f64().unwrap_or(0.0)),
        JsonValue::String(s) => coerce_amount(s),
        _ => 0.0,
    }
}

fn json_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_coordinates(val: &JsonValue) -> Option<LatLng> {
    let pair = val.as_array()?;
    if pair.len() != 2 {
        return None;
    }
    let component = |v: &JsonValue| match v {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    LatLng::from_pair(component(&pair[0])?, component(&pair[1])?)
}

fn lenient_amount<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(json_amount(&JsonValue::deserialize(d)?))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(json_text(&JsonValue::deserialize(d)?))
}

fn lenient_coordinates<'de, D: Deserializer<'de>>(d: D) -> Result<Option<LatLng>, D::Error> {
    Ok(json_coordinates(&JsonValue::deserialize(d)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_numbers_become_zero() {
        let rec: ShipmentRecord = serde_json::from_str(
            r#"{
                "origin": {"name": "NSW", "coordinates": [-33.8, 151.2],
                           "tonnes": "n/a", "value": -4, "year": 2020, "quarter": "Q1"},
                "destination": {"name": "China", "coordinates": [35, 103], "value": "12.5"},
                "MaterialGroup": "Glass", "AHECC": 70010010,
                "AdditionalClassificationInformation": "Cullet"
            }"#,
        )
        .unwrap();

        assert_eq!(rec.origin.tonnes, 0.0);
        assert_eq!(rec.origin.value, 0.0);
        assert_eq!(rec.destination.value, 12.5);
        assert_eq!(rec.origin.year, "2020");
        assert_eq!(rec.ahecc_code, "70010010");
        assert_eq!(rec.destination.coordinates, Some(LatLng::new(35.0, 103.0)));
    }

    #[test]
    fn missing_or_broken_coordinates_are_none() {
        let rec: ShipmentRecord = serde_json::from_str(
            r#"{
                "origin": {"name": "VIC", "coordinates": null},
                "destination": {"name": "India", "coordinates": [1.0]},
                "materialGroup": "Metals"
            }"#,
        )
        .unwrap();

        assert!(rec.origin.coordinates.is_none());
        assert!(rec.destination.coordinates.is_none());
        assert!(rec.endpoints().is_none());
        assert_eq!(rec.material_group, "Metals");
    }

    #[test]
    fn coordinate_key_uses_shortest_rendering() {
        assert_eq!(LatLng::new(10.0, 20.0).key(), "10,20");
        assert_eq!(LatLng::new(-33.5, 151.25).key(), "-33.5,151.25");
        assert_eq!(LatLng::new(-0.0, 20.0).key(), LatLng::new(0.0, 20.0).key());
        assert_eq!(LatLng::new(10.0, -0.0).key(), "10,0");
    }

    #[test]
    fn coerce_amount_rejects_garbage() {
        assert_eq!(coerce_amount(" 3.5 "), 3.5);
        assert_eq!(coerce_amount("abc"), 0.0);
        assert_eq!(coerce_amount("NaN"), 0.0);
        assert_eq!(coerce_amount("-1"), 0.0);
    }
}
