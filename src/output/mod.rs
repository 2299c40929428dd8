//! Output of solved transport fields
//!
//! ```text
//! output/
//! ├── mod.rs
//! └── export/             ← Data export
//!     ├── mod.rs          ← Exporter trait
//!     └── csv.rs
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pnm_rs::output::{CsvConfig, CsvExporter, Exporter};
//!
//! let exporter = CsvExporter::new(CsvConfig::high_precision());
//! exporter.export_nodes(&algorithm.scenario(), algorithm.result().unwrap(), "pores.csv")?;
//! ```

pub mod export;

pub use export::{export_conduits_csv, export_nodes_csv, CsvConfig, CsvError, CsvExporter, CsvMetadata, Exporter};
