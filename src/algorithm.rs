//! Transport algorithm facade
//!
//! [`TransportAlgorithm`] is the caller-facing object: it owns the conductance
//! table, the boundary condition and source registries and the solver
//! configuration, runs the solve and answers post-processing queries.
//!
//! # Example
//!
//! ```rust
//! use pnm_rs::prelude::*;
//!
//! // 0 -- 1 -- 2 -- 3 -- 4, unit conductances
//! let topology = Topology::chain(5, 1.0);
//! let conductances = Conductances::uniform(&topology, 1.0).unwrap();
//!
//! let mut diffusion = TransportAlgorithm::new(TransportKind::Diffusion, &topology, conductances).unwrap();
//! diffusion.set_dirichlet(&[0], 1.0).unwrap();
//! diffusion.set_dirichlet(&[4], 0.0).unwrap();
//!
//! let result = diffusion.run().unwrap();
//! assert!((result.solution[1] - 0.75).abs() < 1e-12);
//! assert!((diffusion.rate(&[0]).unwrap() - 0.25).abs() < 1e-12);
//! ```

use std::sync::Arc;

use log::info;
use nalgebra::DVector;

use crate::error::{ConfigurationError, TransportError, TransportResult};
use crate::network::{DomainExtent, PropertyTable, Topology};
use crate::physics::{ConductanceModel, Conductances, SourceModel, TransportKind};
use crate::postprocess;
use crate::solver::{solve_scenario, BoundaryConditions, Scenario, SolveResult, SolverConfiguration, SourceTerms};

/// Steady-state transport on one network
#[derive(Debug, Clone)]
pub struct TransportAlgorithm<'a> {
    kind: TransportKind,
    topology: &'a Topology,
    conductances: Conductances,
    boundary_conditions: BoundaryConditions,
    sources: SourceTerms,
    configuration: SolverConfiguration,
    result: Option<SolveResult>,
}

impl<'a> TransportAlgorithm<'a> {
    // ======================================= Creation ============================================

    /// Create from precomputed conductances
    ///
    /// # Errors
    ///
    /// Fails when the conductance table does not match the topology.
    pub fn new(kind: TransportKind, topology: &'a Topology, conductances: Conductances) -> TransportResult<Self> {
        if conductances.len() != topology.conduit_count() {
            return Err(ConfigurationError::SizeMismatch {
                name: "throat.conductance".to_string(),
                expected: topology.conduit_count(),
                actual: conductances.len(),
            }
            .into());
        }

        Ok(Self {
            kind,
            topology,
            conductances,
            boundary_conditions: BoundaryConditions::new(topology.node_count()),
            sources: SourceTerms::new(topology.node_count()),
            configuration: SolverConfiguration::default(),
            result: None,
        })
    }

    /// Create by evaluating a conductance model
    ///
    /// Missing properties are handled with the configuration's
    /// [`MissingPropertyPolicy`](crate::physics::MissingPropertyPolicy).
    pub fn with_model(
        kind: TransportKind,
        topology: &'a Topology,
        properties: &PropertyTable,
        model: &dyn ConductanceModel,
        configuration: SolverConfiguration,
    ) -> TransportResult<Self> {
        configuration.validate()?;
        let conductances = Conductances::compute(model, topology, properties, configuration.missing_property)?;
        let mut algorithm = Self::new(kind, topology, conductances)?;
        algorithm.configuration = configuration;
        Ok(algorithm)
    }

    /// Create with the default conductance model of `kind`
    pub fn with_default_model(
        kind: TransportKind,
        topology: &'a Topology,
        properties: &PropertyTable,
        configuration: SolverConfiguration,
    ) -> TransportResult<Self> {
        let model = kind.default_model()?;
        Self::with_model(kind, topology, properties, model.as_ref(), configuration)
    }

    /// Replace the solver configuration
    pub fn configure(&mut self, configuration: SolverConfiguration) -> Result<(), ConfigurationError> {
        configuration.validate()?;
        self.configuration = configuration;
        self.result = None;
        Ok(())
    }

    // ===================================== Registration ==========================================

    /// Fix the value on a set of nodes
    pub fn set_dirichlet(&mut self, nodes: &[usize], value: f64) -> Result<(), ConfigurationError> {
        self.boundary_conditions.set_dirichlet(nodes, value)?;
        self.result = None;
        Ok(())
    }

    /// Fix one value per node
    pub fn set_dirichlet_values(&mut self, nodes: &[usize], values: &[f64]) -> Result<(), ConfigurationError> {
        self.boundary_conditions.set_dirichlet_values(nodes, values)?;
        self.result = None;
        Ok(())
    }

    /// Inject `flux` at each node
    pub fn set_neumann(&mut self, nodes: &[usize], flux: f64) -> Result<(), ConfigurationError> {
        self.boundary_conditions.set_neumann(nodes, flux)?;
        self.result = None;
        Ok(())
    }

    /// Inject `total_flux` split equally over a group of nodes
    pub fn set_neumann_group(&mut self, nodes: &[usize], total_flux: f64) -> Result<usize, ConfigurationError> {
        let group = self.boundary_conditions.set_neumann_group(nodes, total_flux)?;
        self.result = None;
        Ok(group)
    }

    /// Remove the boundary conditions of a set of nodes
    pub fn remove_boundary_conditions(&mut self, nodes: &[usize]) {
        for &node in nodes {
            self.boundary_conditions.remove(node);
        }
        self.result = None;
    }

    /// Attach a source model to a set of nodes
    pub fn add_source<M>(&mut self, nodes: &[usize], model: M) -> Result<(), ConfigurationError>
    where
        M: SourceModel + 'static,
    {
        self.add_shared_source(nodes, Arc::new(model))
    }

    /// Attach a shared source model to a set of nodes
    pub fn add_shared_source(&mut self, nodes: &[usize], model: Arc<dyn SourceModel>) -> Result<(), ConfigurationError> {
        self.sources.add_shared(nodes, model)?;
        self.result = None;
        Ok(())
    }

    /// Remove every source term from a set of nodes
    pub fn remove_sources(&mut self, nodes: &[usize]) {
        for &node in nodes {
            self.sources.remove(node);
        }
        self.result = None;
    }

    // ======================================= Solving =============================================

    /// Scenario describing the current registrations
    pub fn scenario(&self) -> Scenario<'_> {
        Scenario::new(self.topology, &self.conductances)
            .with_boundary_conditions(self.boundary_conditions.clone())
            .with_sources(self.sources.clone())
    }

    /// Solve and keep the result for post-processing
    pub fn run(&mut self) -> TransportResult<SolveResult> {
        let result = solve_scenario(&self.scenario(), &self.configuration)?;
        info!(
            "{} solve: {} pore(s), {} iteration(s), converged = {}",
            self.kind.quantity(),
            self.topology.node_count(),
            result.iterations,
            result.converged
        );
        self.result = Some(result.clone());
        Ok(result)
    }

    // ======================================== Access =============================================

    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    pub fn topology(&self) -> &Topology {
        self.topology
    }

    pub fn conductances(&self) -> &Conductances {
        &self.conductances
    }

    pub fn boundary_conditions(&self) -> &BoundaryConditions {
        &self.boundary_conditions
    }

    pub fn sources(&self) -> &SourceTerms {
        &self.sources
    }

    pub fn configuration(&self) -> &SolverConfiguration {
        &self.configuration
    }

    /// Last result, `None` before `run()` or after a registration change
    pub fn result(&self) -> Option<&SolveResult> {
        self.result.as_ref()
    }

    /// Last solution
    pub fn solution(&self) -> TransportResult<&DVector<f64>> {
        self.result
            .as_ref()
            .map(|result| &result.solution)
            .ok_or(TransportError::NotSolved)
    }

    // ==================================== Post-processing ========================================

    /// Net outflow of a node set
    pub fn rate(&self, nodes: &[usize]) -> TransportResult<f64> {
        let solution = self.solution()?;
        Ok(postprocess::net_rate(self.topology, &self.conductances, solution, nodes)?)
    }

    /// Rate through every conduit
    pub fn conduit_rates(&self) -> TransportResult<DVector<f64>> {
        Ok(postprocess::conduit_rates(self.topology, &self.conductances, self.solution()?))
    }

    /// Net outflow of every node
    pub fn node_rates(&self) -> TransportResult<DVector<f64>> {
        Ok(postprocess::node_rates(self.topology, &self.conductances, self.solution()?))
    }

    /// Effective coefficient between two Dirichlet faces
    ///
    /// Length and cross-section come from
    /// [`Topology::bounding_extent`](crate::network::Topology::bounding_extent).
    pub fn effective_coefficient(&self, face_a: &[usize], face_b: &[usize]) -> TransportResult<f64> {
        let extent = self.topology.bounding_extent(face_a, face_b)?;
        self.effective_coefficient_with_extent(face_a, face_b, &extent)
    }

    /// Effective coefficient with an explicit domain extent
    pub fn effective_coefficient_with_extent(
        &self,
        face_a: &[usize],
        face_b: &[usize],
        extent: &DomainExtent,
    ) -> TransportResult<f64> {
        let potential_a = postprocess::face_potential(&self.boundary_conditions, face_a)?;
        let potential_b = postprocess::face_potential(&self.boundary_conditions, face_b)?;
        let rate = self.rate(face_a)?;
        Ok(postprocess::effective_coefficient(rate, extent, potential_a - potential_b)?)
    }

    /// Absolute permeability of a Stokes flow solve
    ///
    /// `viscosity` must be the one used to compute the hydraulic conductances.
    pub fn effective_permeability(&self, face_a: &[usize], face_b: &[usize], viscosity: f64) -> TransportResult<f64> {
        let coefficient = self.effective_coefficient(face_a, face_b)?;
        Ok(postprocess::effective_permeability(coefficient, viscosity))
    }
}

// =================================================================================================
// Tests
// =================================================================================================
