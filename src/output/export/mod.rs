//! Export module for solved transport fields.
//!
//! # Architecture
//!
//! This module defines the [`Exporter`] trait that abstracts the export format.
//! Each format is an independent implementation in its own sub-module, so a
//! new format is a new file implementing the trait.
//!
//! # Available formats
//!
//! | Format  | Module          |
//! |---------|-----------------|
//! | CSV     | [`csv`]         |
//!
//! # Usage example
//!
//! ```rust,ignore
//! use pnm_rs::output::export::{CsvExporter, Exporter};
//!
//! let exporter = CsvExporter::default();
//! exporter.export_nodes(&scenario, &result, "pores.csv")?;
//! exporter.export_conduits(&scenario, &result, "throats.csv")?;
//! ```

pub mod csv;

pub use csv::{export_conduits_csv, export_nodes_csv, CsvConfig, CsvError, CsvExporter, CsvMetadata};

use crate::solver::{Scenario, SolveResult};

/// Abstraction trait for all export formats.
///
/// # Associated type `Error`
///
/// Each format manages its own errors via the associated type, so callers
/// can react to the precise failure without boxing.
pub trait Exporter {
    /// Error type specific to this export format.
    type Error: std::error::Error;

    /// Exports one row per pore: id, coordinates, solved value, net rate.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the path is invalid or the directory does not exist
    /// - `result` does not match the scenario's network
    fn export_nodes(&self, scenario: &Scenario<'_>, result: &SolveResult, path: &str) -> Result<(), Self::Error>;

    /// Exports one row per conduit: id, endpoints, conductance, rate.
    fn export_conduits(&self, scenario: &Scenario<'_>, result: &SolveResult, path: &str) -> Result<(), Self::Error>;
}
