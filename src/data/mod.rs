//! Data layer: record model, loading, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  .json / .csv / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Vec<ShipmentRecord>
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterState (per-facet picks) → filtered records
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate  │  pivots, distribution, summary metrics
//!   └───────────┘
//! ```
pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
