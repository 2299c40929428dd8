//! Linear system assembly
//!
//! Builds the conservation equations `A·x = b` of a [`Scenario`]:
//!
//! ```text
//! conduit (i, j), conductance g:   A[i,i] += g   A[j,j] += g   A[i,j] -= g   A[j,i] -= g
//! source at i, rate ≈ a1·x + a0:   A[i,i] -= a1  b[i] += a0
//! Neumann flux q at i:             b[i] += q
//! Dirichlet value v at d:          row d becomes A[d,d] = 1, b[d] = v
//! ```
//!
//! Dirichlet nodes are eliminated symmetrically: a free node `k` coupled to a
//! Dirichlet node `d` keeps `g` on its diagonal and moves `g·v` to `b[k]`, so the
//! `(k, d)` and `(d, k)` entries never enter the matrix and `A` stays symmetric.
//!
//! Source terms only touch diagonals, so the Picard loop assembles the base
//! system once and applies each new linearization on a copy.

use std::collections::BTreeMap;

use log::debug;
use nalgebra::DVector;
use sprs::{CsMat, TriMat};

use crate::error::{TransportError, TransportResult};
use crate::physics::Linearization;
use crate::solver::Scenario;

// =================================================================================================
// Linear system
// =================================================================================================

/// Assembled sparse system `A·x = b`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    /// Symmetric matrix in CSR storage
    pub matrix: CsMat<f64>,
    /// Right-hand side
    pub rhs: DVector<f64>,
}

impl LinearSystem {
    /// Number of unknowns
    pub fn size(&self) -> usize {
        self.rhs.len()
    }

    /// Stored entries
    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    /// `A·x`
    pub fn mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        let mut y = DVector::zeros(self.size());
        for (row, entries) in self.matrix.outer_iterator().enumerate() {
            y[row] = entries.iter().map(|(col, &value)| value * x[col]).sum();
        }
        y
    }

    /// Diagonal of `A`
    pub fn diagonal(&self) -> DVector<f64> {
        DVector::from_iterator(
            self.size(),
            (0..self.size()).map(|i| self.matrix.get(i, i).copied().unwrap_or(0.0)),
        )
    }

    /// Max-norm residual `max |A·x − b|`
    pub fn residual(&self, x: &DVector<f64>) -> f64 {
        (self.mul_vec(x) - &self.rhs).amax()
    }

    /// Copy of the system with source linearizations applied on the diagonal
    pub fn with_sources(&self, linearizations: &BTreeMap<usize, Linearization>) -> Self {
        let mut system = self.clone();
        for (&node, lin) in linearizations {
            match system.matrix.get_mut(node, node) {
                Some(diagonal) => *diagonal -= lin.a1,
                None => system.matrix.insert(node, node, -lin.a1),
            }
            system.rhs[node] += lin.a0;
        }
        system
    }
}

// =================================================================================================
// Assembler
// =================================================================================================

/// Builds [`LinearSystem`]s from scenarios
pub struct Assembler;

impl Assembler {
    /// Reject scenarios where some connected component has no Dirichlet node
    ///
    /// Connectivity counts only conduits with `g > 0`, so a node whose
    /// conduits are all open circuits forms its own component.
    pub fn check_constrained(scenario: &Scenario<'_>) -> TransportResult<()> {
        let (labels, count) = scenario
            .topology
            .connected_components(|conduit| scenario.conductances.is_active(conduit));

        let mut sizes = vec![0usize; count];
        for &label in &labels {
            sizes[label] += 1;
        }

        let mut constrained = vec![false; count];
        for (node, _) in scenario.boundary_conditions.dirichlet() {
            constrained[labels[node]] = true;
        }

        // labels are numbered in order of first node, the first hit is the smallest node
        match labels.iter().enumerate().find(|&(_, label)| !constrained[*label]) {
            Some((node, label)) => Err(TransportError::Underconstrained {
                node,
                component_size: sizes[*label],
            }),
            None => Ok(()),
        }
    }

    /// Assemble conduit, Dirichlet and Neumann contributions
    ///
    /// # Errors
    ///
    /// - [`TransportError::Configuration`] if the scenario registries do not
    ///   match the topology
    /// - [`TransportError::Underconstrained`] if a component has no Dirichlet node
    pub fn assemble_base(scenario: &Scenario<'_>) -> TransportResult<LinearSystem> {
        scenario.validate()?;
        Self::check_constrained(scenario)?;

        let n = scenario.node_count();
        let bcs = &scenario.boundary_conditions;

        let mut diagonal = vec![0.0; n];
        let mut rhs = DVector::zeros(n);
        let mut triplets = TriMat::with_capacity((n, n), n + 2 * scenario.topology.conduit_count());

        for (conduit, &[i, j]) in scenario.topology.conduits().iter().enumerate() {
            let g = scenario.conductances.get(conduit);
            if g == 0.0 {
                continue;
            }
            match (bcs.dirichlet_value(i), bcs.dirichlet_value(j)) {
                (None, None) => {
                    diagonal[i] += g;
                    diagonal[j] += g;
                    triplets.add_triplet(i, j, -g);
                    triplets.add_triplet(j, i, -g);
                }
                (None, Some(value)) => {
                    diagonal[i] += g;
                    rhs[i] += g * value;
                }
                (Some(value), None) => {
                    diagonal[j] += g;
                    rhs[j] += g * value;
                }
                (Some(_), Some(_)) => {}
            }
        }

        for (node, value) in bcs.dirichlet() {
            diagonal[node] = 1.0;
            rhs[node] = value;
        }
        for (node, flux) in bcs.fluxes() {
            rhs[node] += flux;
        }

        // explicit diagonal on every row, even when zero
        for (node, &value) in diagonal.iter().enumerate() {
            triplets.add_triplet(node, node, value);
        }

        let matrix: CsMat<f64> = triplets.to_csr();
        debug!(
            "assembled {}x{} system, {} non-zero(s), {} Dirichlet node(s)",
            n,
            n,
            matrix.nnz(),
            bcs.dirichlet().count()
        );

        Ok(LinearSystem { matrix, rhs })
    }

    /// Assemble the full system with sources linearized at `x_prev`
    pub fn assemble(scenario: &Scenario<'_>, x_prev: &DVector<f64>) -> TransportResult<LinearSystem> {
        let base = Self::assemble_base(scenario)?;
        if scenario.sources.is_empty() {
            return Ok(base);
        }
        let linearizations = scenario.sources.linearize(x_prev, &scenario.boundary_conditions);
        Ok(base.with_sources(&linearizations))
    }
}

// =================================================================================================
// Tests
// =================================================================================================
