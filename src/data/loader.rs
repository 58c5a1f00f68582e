use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{coerce_amount, coerce_coordinates, Destination, Origin, ShipmentRecord};
use crate::spatial::country::CountryBoundaries;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load shipment records from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – array of nested records, as published
///   (`origin`, `destination`, `MaterialGroup`, `AHECC`, ...)
/// * `.csv`     – flat table, see [`FlatRecord`]
/// * `.parquet` – flat table with the same column names
pub fn load_file(path: &Path) -> Result<Vec<ShipmentRecord>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "json" => load_json(path),
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    let unlocated = records.iter().filter(|r| r.endpoints().is_none()).count();
    if unlocated > 0 {
        log::warn!("{unlocated} of {} records lack coordinates and will not be mapped", records.len());
    }
    Ok(records)
}

/// Load country outlines from a GeoJSON FeatureCollection.
pub fn load_boundaries(path: &Path) -> Result<CountryBoundaries> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading boundaries {}", path.display()))?;
    CountryBoundaries::from_geojson_str(&text).context("parsing country boundaries")
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<Vec<ShipmentRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

/// Parse the published records array. Numeric fields are coerced leniently by
/// the model's deserializers, so only structural problems fail.
pub fn parse_json(text: &str) -> Result<Vec<ShipmentRecord>> {
    serde_json::from_str(text).context("parsing shipment JSON")
}

// ---------------------------------------------------------------------------
// Flat (CSV / Parquet) rows
// ---------------------------------------------------------------------------

/// One row of the flat layout. Every cell is read as text and coerced.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FlatRecord {
    pub origin_name: String,
    pub origin_lat: String,
    pub origin_lng: String,
    pub tonnes: String,
    pub origin_value: String,
    pub year: String,
    pub quarter: String,
    pub destination_name: String,
    pub destination_lat: String,
    pub destination_lng: String,
    pub destination_value: String,
    pub material_group: String,
    pub ahecc: String,
    pub classification: String,
}

impl FlatRecord {
    fn set(&mut self, column: &str, value: String) {
        let slot = match column {
            "origin_name" => &mut self.origin_name,
            "origin_lat" => &mut self.origin_lat,
            "origin_lng" => &mut self.origin_lng,
            "tonnes" => &mut self.tonnes,
            "origin_value" => &mut self.origin_value,
            "year" => &mut self.year,
            "quarter" => &mut self.quarter,
            "destination_name" => &mut self.destination_name,
            "destination_lat" => &mut self.destination_lat,
            "destination_lng" => &mut self.destination_lng,
            "destination_value" => &mut self.destination_value,
            "material_group" => &mut self.material_group,
            "ahecc" => &mut self.ahecc,
            "classification" => &mut self.classification,
            _ => return,
        };
        *slot = value;
    }
}

impl From<FlatRecord> for ShipmentRecord {
    fn from(f: FlatRecord) -> Self {
        ShipmentRecord {
            origin: Origin {
                coordinates: coerce_coordinates(&f.origin_lat, &f.origin_lng),
                tonnes: coerce_amount(&f.tonnes),
                value: coerce_amount(&f.origin_value),
                name: f.origin_name,
                year: f.year,
                quarter: f.quarter,
            },
            destination: Destination {
                coordinates: coerce_coordinates(&f.destination_lat, &f.destination_lng),
                value: coerce_amount(&f.destination_value),
                name: f.destination_name,
            },
            material_group: f.material_group,
            ahecc_code: f.ahecc,
            classification_info: f.classification,
        }
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<ShipmentRecord>> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

/// Parse flat CSV rows from any reader. Unknown columns are ignored.
pub fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<ShipmentRecord>> {
    let headers = reader.headers().context("reading CSV headers")?.clone();
    for required in ["origin_name", "destination_name", "material_group"] {
        if !headers.iter().any(|h| h == required) {
            bail!("CSV missing '{required}' column");
        }
    }

    reader
        .deserialize::<FlatRecord>()
        .enumerate()
        .map(|(i, row)| {
            row.map(ShipmentRecord::from)
                .with_context(|| format!("CSV row {}", i + 1))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Parquet layout: the flat column names; each column may be Utf8 or
/// numeric, cells are converted to text and coerced like CSV.
fn load_parquet(path: &Path) -> Result<Vec<ShipmentRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        for required in ["origin_name", "destination_name", "material_group"] {
            if schema.index_of(required).is_err() {
                bail!("Parquet file missing '{required}' column");
            }
        }

        let columns: Vec<(String, &Arc<dyn Array>)> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name().clone(), batch.column(i)))
            .collect();

        for row in 0..batch.num_rows() {
            let mut flat = FlatRecord::default();
            for (name, col) in &columns {
                flat.set(name, cell_text(col, row));
            }
            records.push(ShipmentRecord::from(flat));
        }
    }

    Ok(records)
}

/// Render one Arrow cell as text. Nulls and unsupported types become `""`,
/// which the coercion step turns into `0` / missing coordinates.
fn cell_text(col: &Arc<dyn Array>, row: usize) -> String {
    if col.is_null(row) {
        return String::new();
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| s.value(row).to_string())
            .unwrap_or_default(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row).to_string())
            .unwrap_or_default(),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row).to_string())
            .unwrap_or_default(),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row).to_string())
            .unwrap_or_default(),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row).to_string())
            .unwrap_or_default(),
        other => {
            log::debug!("unsupported parquet column type {other:?}");
            String::new()
        }
    }
}
