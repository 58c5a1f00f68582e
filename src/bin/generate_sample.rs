//! Writes a deterministic synthetic shipment dataset as JSON and Parquet.
//!
//! Usage: `generate_sample [OUTPUT_DIR]` (defaults to the current directory).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use waste_flow::data::model::{Destination, LatLng, Origin, ShipmentRecord};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const STATES: [(&str, f64, f64); 6] = [
    ("New South Wales", -33.87, 151.21),
    ("Victoria", -37.81, 144.96),
    ("Queensland", -27.47, 153.03),
    ("Western Australia", -31.95, 115.86),
    ("South Australia", -34.93, 138.60),
    ("Tasmania", -42.88, 147.33),
];

const DESTINATIONS: [(&str, f64, f64); 8] = [
    ("Indonesia", -6.21, 106.85),
    ("Malaysia", 3.14, 101.69),
    ("Viet Nam", 21.03, 105.85),
    ("India", 28.61, 77.21),
    ("Korea, Republic of", 37.57, 126.98),
    ("China", 39.90, 116.41),
    ("Thailand", 13.76, 100.50),
    ("Bangladesh", 23.81, 90.41),
];

/// (material group, AHECC code, classification, AUD per tonne)
const MATERIALS: [(&str, &str, &str, f64); 6] = [
    ("Metals", "72044900", "Ferrous waste and scrap", 420.0),
    ("Paper & cardboard", "47071000", "Unbleached kraft paper", 210.0),
    ("Plastics", "39159000", "Other plastics", 330.0),
    ("Glass", "70010000", "Cullet and other waste glass", 90.0),
    ("Tyres", "40040000", "Waste of rubber", 150.0),
    ("Textiles", "63090000", "Worn clothing", 510.0),
];

const YEARS: [i64; 4] = [2020, 2021, 2022, 2023];

fn generate(rng: &mut SimpleRng, count: usize) -> Vec<ShipmentRecord> {
    (0..count)
        .map(|_| {
            let (state, s_lat, s_lng) = *rng.pick(&STATES);
            let (country, d_lat, d_lng) = *rng.pick(&DESTINATIONS);
            let (group, ahecc, class, unit_price) = *rng.pick(&MATERIALS);
            let year = *rng.pick(&YEARS);
            let quarter = 1 + rng.next_u64() % 4;

            let tonnes = (5.0 + rng.next_f64() * 995.0).round();
            let value = (tonnes * unit_price * (0.8 + rng.next_f64() * 0.4)).round();
            // A few destinations without a geocode, as in real exports.
            let located = rng.next_f64() > 0.03;

            ShipmentRecord {
                origin: Origin {
                    name: state.to_string(),
                    coordinates: Some(LatLng::new(s_lat, s_lng)),
                    tonnes,
                    value,
                    year: year.to_string(),
                    quarter: format!("{year}-Q{quarter}"),
                },
                destination: Destination {
                    name: country.to_string(),
                    coordinates: located.then_some(LatLng::new(d_lat, d_lng)),
                    value,
                },
                material_group: group.to_string(),
                ahecc_code: ahecc.to_string(),
                classification_info: class.to_string(),
            }
        })
        .collect()
}

/// Flatten into the column layout the Parquet loader reads.
fn to_batch(records: &[ShipmentRecord]) -> Result<RecordBatch> {
    fn text(records: &[ShipmentRecord], f: impl Fn(&ShipmentRecord) -> &str) -> ArrayRef {
        Arc::new(StringArray::from(records.iter().map(f).collect::<Vec<_>>()))
    }
    fn num(records: &[ShipmentRecord], f: impl Fn(&ShipmentRecord) -> Option<f64>) -> ArrayRef {
        Arc::new(Float64Array::from(records.iter().map(f).collect::<Vec<_>>()))
    }

    let years: Vec<Option<i64>> = records.iter().map(|r| r.origin.year.parse().ok()).collect();

    let columns: Vec<(&str, DataType, bool, ArrayRef)> = vec![
        ("origin_name", DataType::Utf8, false, text(records, |r| r.origin.name.as_str())),
        ("origin_lat", DataType::Float64, true, num(records, |r| r.origin.coordinates.map(|c| c.lat))),
        ("origin_lng", DataType::Float64, true, num(records, |r| r.origin.coordinates.map(|c| c.lng))),
        ("tonnes", DataType::Float64, false, num(records, |r| Some(r.origin.tonnes))),
        ("origin_value", DataType::Float64, false, num(records, |r| Some(r.origin.value))),
        ("year", DataType::Int64, true, Arc::new(Int64Array::from(years))),
        ("quarter", DataType::Utf8, false, text(records, |r| r.origin.quarter.as_str())),
        ("destination_name", DataType::Utf8, false, text(records, |r| r.destination.name.as_str())),
        ("destination_lat", DataType::Float64, true, num(records, |r| r.destination.coordinates.map(|c| c.lat))),
        ("destination_lng", DataType::Float64, true, num(records, |r| r.destination.coordinates.map(|c| c.lng))),
        ("destination_value", DataType::Float64, false, num(records, |r| Some(r.destination.value))),
        ("material_group", DataType::Utf8, false, text(records, |r| r.material_group.as_str())),
        ("ahecc", DataType::Utf8, false, text(records, |r| r.ahecc_code.as_str())),
        ("classification", DataType::Utf8, false, text(records, |r| r.classification_info.as_str())),
    ];

    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, ty, nullable, _)| Field::new(*name, ty.clone(), *nullable))
            .collect::<Vec<_>>(),
    ));
    let arrays = columns.into_iter().map(|(_, _, _, a)| a).collect();

    RecordBatch::try_new(schema, arrays).context("building record batch")
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args_os().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let records = generate(&mut rng, 2_000);

    // JSON, nested layout
    let json_path = out_dir.join("sample_shipments.json");
    let file = std::fs::File::create(&json_path)
        .with_context(|| format!("creating {}", json_path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &records).context("writing JSON")?;
    log::info!("Wrote {} shipments to {}", records.len(), json_path.display());

    // Parquet, flat layout
    let batch = to_batch(&records)?;
    let parquet_path = out_dir.join("sample_shipments.parquet");
    let file = std::fs::File::create(&parquet_path)
        .with_context(|| format!("creating {}", parquet_path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    log::info!("Wrote {} rows to {}", batch.num_rows(), parquet_path.display());

    println!("{}", pretty_format_batches(&[batch.slice(0, 5)]).context("formatting preview")?);
    println!(
        "Wrote {} shipments to {} and {}",
        records.len(),
        json_path.display(),
        parquet_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_carries_the_flat_loader_columns() {
        let records = generate(&mut SimpleRng::new(7), 10);
        let batch = to_batch(&records).unwrap();
        assert_eq!(batch.num_rows(), 10);
        for column in ["origin_name", "destination_name", "material_group", "year", "tonnes"] {
            assert!(batch.schema().index_of(column).is_ok(), "missing {column}");
        }
    }
}
