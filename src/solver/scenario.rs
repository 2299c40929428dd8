//! Transport scenario definition
//!
//! A scenario combines a network and its conductances with boundary
//! conditions and source terms.

use crate::error::ConfigurationError;
use crate::network::Topology;
use crate::physics::Conductances;
use crate::solver::{BoundaryConditions, SourceTerms};

/// Transport scenario
///
/// Defines a specific case to solve:
/// - Network topology and conductances (borrowed, shared read-only)
/// - Boundary conditions and source terms (owned)
///
/// # Design
///
/// The same scenario can be solved with different linear methods. This is the
/// "WHAT to solve" (not "HOW to solve"). Several scenarios may borrow the same
/// topology and conductances, which is what batch solving relies on.
///
/// # Examples
///
/// ```rust
/// use pnm_rs::network::Topology;
/// use pnm_rs::physics::Conductances;
/// use pnm_rs::solver::Scenario;
///
/// let topology = Topology::chain(5, 1.0);
/// let conductances = Conductances::uniform(&topology, 1.0).unwrap();
///
/// let mut scenario = Scenario::new(&topology, &conductances);
/// scenario.boundary_conditions.set_dirichlet(&[0], 1.0).unwrap();
/// scenario.boundary_conditions.set_dirichlet(&[4], 0.0).unwrap();
///
/// assert!(scenario.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct Scenario<'a> {
    /// Network adjacency
    pub topology: &'a Topology,

    /// Conductance of every conduit
    pub conductances: &'a Conductances,

    /// Constraints
    pub boundary_conditions: BoundaryConditions,

    /// Node sinks/sources
    pub sources: SourceTerms,
}

impl<'a> Scenario<'a> {
    /// Create a scenario without boundary conditions or sources
    pub fn new(topology: &'a Topology, conductances: &'a Conductances) -> Self {
        Self {
            topology,
            conductances,
            boundary_conditions: BoundaryConditions::new(topology.node_count()),
            sources: SourceTerms::new(topology.node_count()),
        }
    }

    pub fn with_boundary_conditions(mut self, boundary_conditions: BoundaryConditions) -> Self {
        self.boundary_conditions = boundary_conditions;
        self
    }

    pub fn with_sources(mut self, sources: SourceTerms) -> Self {
        self.sources = sources;
        self
    }

    /// Check that every registry matches the topology
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let nodes = self.topology.node_count();
        let conduits = self.topology.conduit_count();

        if self.conductances.len() != conduits {
            return Err(ConfigurationError::SizeMismatch {
                name: "throat.conductance".to_string(),
                expected: conduits,
                actual: self.conductances.len(),
            });
        }
        if self.boundary_conditions.node_count() != nodes {
            return Err(ConfigurationError::SizeMismatch {
                name: "boundary conditions".to_string(),
                expected: nodes,
                actual: self.boundary_conditions.node_count(),
            });
        }
        if self.sources.node_count() != nodes {
            return Err(ConfigurationError::SizeMismatch {
                name: "source terms".to_string(),
                expected: nodes,
                actual: self.sources.node_count(),
            });
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.topology.node_count()
    }

    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }
}

impl std::fmt::Debug for Scenario<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("nodes", &self.topology.node_count())
            .field("conduits", &self.topology.conduit_count())
            .field("boundary conditions", &self.boundary_conditions.len())
            .field("sources", &self.sources)
            .finish()
    }
}

// ================================================================================================
// Tests
// ================================================================================================
