//! CSV export of solved transport fields
//!
//! Two tables are written, both readable by pandas, spreadsheets or MATLAB:
//!
//! - **node table**: `pore,x,y,z,value,net_rate`
//! - **conduit table**: `throat,pore1,pore2,conductance,rate`
//!
//! Coordinates are left empty when the topology has none. Rates follow the
//! sign conventions of [`postprocess`](crate::postprocess): positive means
//! outflow of the pore (node table) or transport from `pore1` to `pore2`
//! (conduit table).
//!
//! # Example
//!
//! ```rust,ignore
//! use pnm_rs::output::export::{CsvConfig, CsvExporter, CsvMetadata, Exporter};
//!
//! let config = CsvConfig::default()
//!     .precision(10)
//!     .with_metadata(CsvMetadata::from_result("diffusion", &result));
//! let exporter = CsvExporter::new(config);
//!
//! exporter.export_nodes(&scenario, &result, "pores.csv")?;
//! exporter.export_conduits(&scenario, &result, "throats.csv")?;
//! ```
//!
//! **Output** (`pores.csv`):
//! ```csv
//! # Pore Network Transport Data
//! # Generated: 2026-02-11T15:30:00Z
//! # Transport: diffusion
//! # Solver: Direct LDL
//! # Iterations: 1
//! # Converged: true
//! #
//! pore,x,y,z,value,net_rate
//! 0,0.500000,0.500000,0.500000,1.000000,0.250000
//! ...
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};

use nalgebra::DVector;
use thiserror::Error;

use crate::network::Topology;
use crate::physics::Conductances;
use crate::postprocess;
use crate::solver::{Scenario, SolveResult};

use super::Exporter;

// =============================================================================
// Errors
// =============================================================================

/// CSV export failures
#[derive(Error, Debug)]
pub enum CsvError {
    /// File creation or write failure
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Nothing to write
    #[error("empty data: {0} has no entries")]
    EmptyData(&'static str),

    /// Column length does not match the topology
    #[error("{column}: expected {expected} entries, got {actual}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    /// NaN or infinite value in a column
    #[error("invalid data: non-finite value in {column} at row {row}")]
    NonFinite { column: &'static str, row: usize },
}

// =============================================================================
// Configuration Structures
// =============================================================================

/// Configuration for CSV export
///
/// # Example
///
/// ```rust,ignore
/// let config = CsvConfig {
///     delimiter: ';',
///     precision: 10,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Column delimiter (default: ',')
    pub delimiter: char,

    /// Decimal separator (default: '.')
    pub decimal_separator: char,

    /// Number of decimal places for floating-point values (default: 6)
    pub precision: usize,

    /// Include metadata header comments (default: false)
    pub include_metadata: bool,

    /// Metadata to include in header
    pub metadata: Option<CsvMetadata>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            decimal_separator: '.',
            precision: 6,
            include_metadata: false,
            metadata: None,
        }
    }
}

impl CsvConfig {
    /// Semicolon delimiter and comma decimal separator
    pub fn european() -> Self {
        Self {
            delimiter: ';',
            decimal_separator: ',',
            ..Default::default()
        }
    }

    /// 12 decimal places
    pub fn high_precision() -> Self {
        Self {
            precision: 12,
            ..Default::default()
        }
    }

    /// Builder pattern: set delimiter
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builder pattern: set precision
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Builder pattern: enable metadata
    pub fn with_metadata(mut self, metadata: CsvMetadata) -> Self {
        self.include_metadata = true;
        self.metadata = Some(metadata);
        self
    }
}

/// Metadata for CSV header comments
///
/// Only fields that are set are written.
#[derive(Debug, Clone, Default)]
pub struct CsvMetadata {
    /// Transport kind or quantity name (e.g. "diffusion")
    pub transport: Option<String>,

    /// Linear solver name
    pub solver_name: Option<String>,

    /// Picard iterations performed
    pub iterations: Option<usize>,

    /// Final residual
    pub residual: Option<f64>,

    /// Convergence flag
    pub converged: Option<bool>,

    /// Additional custom parameters
    pub custom: Vec<(String, String)>,
}

impl CsvMetadata {
    /// Collect metadata from a solve result
    pub fn from_result(transport: &str, result: &SolveResult) -> Self {
        Self {
            transport: Some(transport.to_string()),
            solver_name: result.get_metadata("solver").cloned(),
            iterations: Some(result.iterations),
            residual: Some(result.residual),
            converged: Some(result.converged),
            custom: Vec::new(),
        }
    }

    /// Add custom parameter
    pub fn add_custom(&mut self, key: &str, value: &str) {
        self.custom.push((key.to_string(), value.to_string()));
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn write_metadata_header<W: Write>(out: &mut W, metadata: &CsvMetadata) -> Result<(), CsvError> {
    writeln!(out, "# Pore Network Transport Data")?;
    writeln!(out, "# Generated: {}", chrono::Utc::now().to_rfc3339())?;

    if let Some(transport) = &metadata.transport {
        writeln!(out, "# Transport: {}", transport)?;
    }
    if let Some(solver) = &metadata.solver_name {
        writeln!(out, "# Solver: {}", solver)?;
    }
    if let Some(iterations) = metadata.iterations {
        writeln!(out, "# Iterations: {}", iterations)?;
    }
    if let Some(residual) = metadata.residual {
        writeln!(out, "# Residual: {:e}", residual)?;
    }
    if let Some(converged) = metadata.converged {
        writeln!(out, "# Converged: {}", converged)?;
    }
    for (key, value) in &metadata.custom {
        writeln!(out, "# {}: {}", key, value)?;
    }

    writeln!(out, "#")?;
    Ok(())
}

/// Format number with configured precision and decimal separator
fn format_number(value: f64, config: &CsvConfig) -> String {
    let formatted = format!("{:.prec$}", value, prec = config.precision);
    if config.decimal_separator != '.' {
        formatted.replace('.', &config.decimal_separator.to_string())
    } else {
        formatted
    }
}

fn check_column(column: &'static str, values: &DVector<f64>, expected: usize) -> Result<(), CsvError> {
    if values.len() != expected {
        return Err(CsvError::LengthMismatch { column, expected, actual: values.len() });
    }
    match values.iter().position(|value| !value.is_finite()) {
        Some(row) => Err(CsvError::NonFinite { column, row }),
        None => Ok(()),
    }
}

fn open(path: &str, config: &CsvConfig) -> Result<BufWriter<File>, CsvError> {
    let mut out = BufWriter::new(File::create(path)?);
    if config.include_metadata {
        if let Some(metadata) = &config.metadata {
            write_metadata_header(&mut out, metadata)?;
        }
    }
    Ok(out)
}

// =============================================================================
// Export Functions
// =============================================================================

/// Write the node table
///
/// # Errors
///
/// - empty topology
/// - `solution` or `net_rates` not sized to the node count, or non-finite
/// - file creation/write errors
pub fn export_nodes_csv(
    topology: &Topology,
    solution: &DVector<f64>,
    net_rates: &DVector<f64>,
    output_path: &str,
    configuration: Option<&CsvConfig>,
) -> Result<(), CsvError> {
    // ============================= Validation =============================

    if topology.node_count() == 0 {
        return Err(CsvError::EmptyData("node table"));
    }
    check_column("value", solution, topology.node_count())?;
    check_column("net_rate", net_rates, topology.node_count())?;

    let binding = CsvConfig::default();
    let config = configuration.unwrap_or(&binding);
    let d = config.delimiter;

    // ============================= Write ==================================

    let mut out = open(output_path, config)?;
    writeln!(out, "pore{d}x{d}y{d}z{d}value{d}net_rate")?;

    for pore in 0..topology.node_count() {
        write!(out, "{}", pore)?;
        match topology.coordinates() {
            Some(coordinates) => {
                for component in coordinates[pore] {
                    write!(out, "{}{}", d, format_number(component, config))?;
                }
            }
            None => write!(out, "{d}{d}{d}")?,
        }
        writeln!(
            out,
            "{}{}{}{}",
            d,
            format_number(solution[pore], config),
            d,
            format_number(net_rates[pore], config)
        )?;
    }

    out.flush()?;
    Ok(())
}

/// Write the conduit table
pub fn export_conduits_csv(
    topology: &Topology,
    conductances: &Conductances,
    rates: &DVector<f64>,
    output_path: &str,
    configuration: Option<&CsvConfig>,
) -> Result<(), CsvError> {
    if topology.conduit_count() == 0 {
        return Err(CsvError::EmptyData("conduit table"));
    }
    check_column("conductance", conductances.values(), topology.conduit_count())?;
    check_column("rate", rates, topology.conduit_count())?;

    let binding = CsvConfig::default();
    let config = configuration.unwrap_or(&binding);
    let d = config.delimiter;

    let mut out = open(output_path, config)?;
    writeln!(out, "throat{d}pore1{d}pore2{d}conductance{d}rate")?;

    for (throat, &[a, b]) in topology.conduits().iter().enumerate() {
        writeln!(
            out,
            "{throat}{d}{a}{d}{b}{d}{}{d}{}",
            format_number(conductances.get(throat), config),
            format_number(rates[throat], config)
        )?;
    }

    out.flush()?;
    Ok(())
}

// =============================================================================
// Exporter
// =============================================================================

/// CSV implementation of [`Exporter`]
#[derive(Debug, Clone, Default)]
pub struct CsvExporter {
    config: CsvConfig,
}

impl CsvExporter {
    pub fn new(config: CsvConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CsvConfig {
        &self.config
    }
}

impl Exporter for CsvExporter {
    type Error = CsvError;

    fn export_nodes(&self, scenario: &Scenario<'_>, result: &SolveResult, path: &str) -> Result<(), CsvError> {
        check_column("value", &result.solution, scenario.node_count())?;
        let net_rates = postprocess::node_rates(scenario.topology, scenario.conductances, &result.solution);
        export_nodes_csv(scenario.topology, &result.solution, &net_rates, path, Some(&self.config))
    }

    fn export_conduits(&self, scenario: &Scenario<'_>, result: &SolveResult, path: &str) -> Result<(), CsvError> {
        check_column("value", &result.solution, scenario.node_count())?;
        let rates = postprocess::conduit_rates(scenario.topology, scenario.conductances, &result.solution);
        export_conduits_csv(scenario.topology, scenario.conductances, &rates, path, Some(&self.config))
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{solve_scenario, SolverConfiguration};
    use std::fs;
    use tempfile::NamedTempFile;

    fn solved_chain(topology: &Topology, conductances: &Conductances) -> SolveResult {
        let mut scenario = Scenario::new(topology, conductances);
        scenario.boundary_conditions.set_dirichlet(&[0], 1.0).unwrap();
        scenario.boundary_conditions.set_dirichlet(&[4], 0.0).unwrap();
        solve_scenario(&scenario, &SolverConfiguration::default()).unwrap()
    }

    fn data_lines(content: &str) -> Vec<&str> {
        content.lines().filter(|line| !line.starts_with('#')).collect()
    }

    #[test]
    fn test_export_nodes() {
        let topology = Topology::chain(5, 1.0);
        let conductances = Conductances::uniform(&topology, 1.0).unwrap();
        let result = solved_chain(&topology, &conductances);
        let scenario = Scenario::new(&topology, &conductances);

        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        CsvExporter::default().export_nodes(&scenario, &result, path).unwrap();

        let content = fs::read_to_string(path).unwrap();
        let lines = data_lines(&content);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "pore,x,y,z,value,net_rate");
        assert_eq!(lines[1], "0,0.500000,0.500000,0.500000,1.000000,0.250000");
        assert!(lines[3].starts_with("2,2.500000,0.500000,0.500000,0.500000,"));
    }

    #[test]
    fn test_export_conduits() {
        let topology = Topology::chain(5, 1.0);
        let conductances = Conductances::uniform(&topology, 1.0).unwrap();
        let result = solved_chain(&topology, &conductances);
        let scenario = Scenario::new(&topology, &conductances);

        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        let exporter = CsvExporter::new(CsvConfig::default().precision(2));
        exporter.export_conduits(&scenario, &result, path).unwrap();

        let content = fs::read_to_string(path).unwrap();
        let lines = data_lines(&content);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "throat,pore1,pore2,conductance,rate");
        assert_eq!(lines[4], "3,3,4,1.00,0.25");
    }

    #[test]
    fn test_nodes_without_coordinates() {
        let topology = Topology::new(2, vec![[0, 1]]).unwrap();
        let solution = DVector::from_vec(vec![1.0, 0.0]);
        let rates = DVector::from_vec(vec![1.0, -1.0]);

        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        export_nodes_csv(&topology, &solution, &rates, path, Some(&CsvConfig::default().precision(1))).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(data_lines(&content)[2], "1,,,,0.0,-1.0");
    }

    #[test]
    fn test_metadata_header() {
        let topology = Topology::chain(5, 1.0);
        let conductances = Conductances::uniform(&topology, 1.0).unwrap();
        let result = solved_chain(&topology, &conductances);
        let scenario = Scenario::new(&topology, &conductances);

        let mut metadata = CsvMetadata::from_result("diffusion", &result);
        metadata.add_custom("Network", "chain");
        let exporter = CsvExporter::new(CsvConfig::default().with_metadata(metadata));

        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        exporter.export_nodes(&scenario, &result, path).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert!(content.starts_with("# Pore Network Transport Data"));
        assert!(content.contains("# Generated: "));
        assert!(content.contains("# Transport: diffusion"));
        assert!(content.contains("# Converged: true"));
        assert!(content.contains("# Network: chain"));
    }

    #[test]
    fn test_european_format() {
        let topology = Topology::new(2, vec![[0, 1]]).unwrap();
        let solution = DVector::from_vec(vec![0.5, 0.0]);
        let rates = DVector::from_vec(vec![0.5, -0.5]);

        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        export_nodes_csv(&topology, &solution, &rates, path, Some(&CsvConfig::european().precision(1))).unwrap();

        let content = fs::read_to_string(path).unwrap();
        let lines = data_lines(&content);
        assert_eq!(lines[0], "pore;x;y;z;value;net_rate");
        assert_eq!(lines[1], "0;;;;0,5;0,5");
    }

    #[test]
    fn test_rejects_non_finite() {
        let topology = Topology::new(2, vec![[0, 1]]).unwrap();
        let solution = DVector::from_vec(vec![f64::NAN, 0.0]);
        let rates = DVector::zeros(2);

        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        assert!(matches!(
            export_nodes_csv(&topology, &solution, &rates, path, None),
            Err(CsvError::NonFinite { column: "value", row: 0 })
        ));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let topology = Topology::new(3, vec![[0, 1], [1, 2]]).unwrap();
        let conductances = Conductances::uniform(&topology, 1.0).unwrap();
        let rates = DVector::zeros(1);

        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        assert!(matches!(
            export_conduits_csv(&topology, &conductances, &rates, path, None),
            Err(CsvError::LengthMismatch { column: "rate", expected: 2, actual: 1 })
        ));
    }
}
