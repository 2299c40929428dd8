//! Source term registry
//!
//! Source models are attached to nodes and shared through `Arc`, so one model
//! instance can serve many nodes and many scenarios of a batch. A node may carry
//! several terms; their linearizations are summed. Terms on Dirichlet nodes are
//! ignored at assembly.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use nalgebra::DVector;

use crate::error::ConfigurationError;
use crate::physics::{Linearization, SourceModel};
use crate::solver::BoundaryConditions;

/// Per-node source terms
#[derive(Clone, Default)]
pub struct SourceTerms {
    node_count: usize,
    terms: Vec<(usize, Arc<dyn SourceModel>)>,
}

impl SourceTerms {
    pub fn new(node_count: usize) -> Self {
        Self { node_count, terms: Vec::new() }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Attach a model to every listed node
    pub fn add<M>(&mut self, nodes: &[usize], model: M) -> Result<(), ConfigurationError>
    where
        M: SourceModel + 'static,
    {
        self.add_shared(nodes, Arc::new(model))
    }

    /// Attach an already shared model to every listed node
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::InvalidNode`] if a node is out of range; nothing is
    /// registered in that case.
    pub fn add_shared(&mut self, nodes: &[usize], model: Arc<dyn SourceModel>) -> Result<(), ConfigurationError> {
        if let Some(&node) = nodes.iter().find(|&&node| node >= self.node_count) {
            return Err(ConfigurationError::InvalidNode { node, node_count: self.node_count });
        }
        self.terms.extend(nodes.iter().map(|&node| (node, Arc::clone(&model))));
        Ok(())
    }

    /// Remove every term attached to a node, returning how many were removed
    pub fn remove(&mut self, node: usize) -> usize {
        let before = self.terms.len();
        self.terms.retain(|(target, _)| *target != node);
        before - self.terms.len()
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }

    /// Number of registered (node, model) pairs
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether every registered model is affine
    pub fn is_linear(&self) -> bool {
        self.terms.iter().all(|(_, model)| model.is_linear())
    }

    /// Summed tangent of every active source node at `x`
    ///
    /// Nodes carrying a Dirichlet condition are skipped.
    pub fn linearize(&self, x: &DVector<f64>, boundary_conditions: &BoundaryConditions) -> BTreeMap<usize, Linearization> {
        let mut linearizations: BTreeMap<usize, Linearization> = BTreeMap::new();
        for (node, model) in &self.terms {
            if boundary_conditions.is_dirichlet(*node) {
                continue;
            }
            *linearizations.entry(*node).or_default() += model.linearize(x[*node]);
        }
        linearizations
    }

    /// Total source rate at every node for a given field
    pub fn rates(&self, x: &DVector<f64>, boundary_conditions: &BoundaryConditions) -> DVector<f64> {
        let mut rates = DVector::zeros(self.node_count);
        for (node, model) in &self.terms {
            if !boundary_conditions.is_dirichlet(*node) {
                rates[*node] += model.rate(x[*node]);
            }
        }
        rates
    }
}

impl fmt::Debug for SourceTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceTerms")
            .field("node_count", &self.node_count)
            .field(
                "terms",
                &self.terms.iter().map(|(node, model)| (*node, model.name())).collect::<Vec<_>>(),
            )
            .finish()
    }
}

// =================================================================================================
// Tests
// =================================================================================================
