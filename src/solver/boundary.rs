//! Boundary condition registry
//!
//! # Design Philosophy
//!
//! Boundary conditions are keyed by node id. A node carries at most one of:
//!
//! - `Dirichlet(value)`: the unknown is fixed at the node
//! - `Neumann(flux)`: a flux is injected at the node (positive = into the network)
//! - `NeumannGroup(id)`: the node shares the total flux of a group equally
//!   with the other members
//!
//! Registration enforces exclusivity up front so the assembler never sees a
//! conflicting configuration. Multi-node calls are atomic: either every node
//! is registered or none is.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

// =================================================================================================
// Boundary condition entries
// =================================================================================================

/// Constraint attached to one node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryCondition {
    /// Fixed value
    Dirichlet(f64),
    /// Fixed injected flux
    Neumann(f64),
    /// Member of a Neumann group (index into the group list)
    NeumannGroup(usize),
}

impl BoundaryCondition {
    /// Kind name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            BoundaryCondition::Dirichlet(_) => "Dirichlet",
            BoundaryCondition::Neumann(_) => "Neumann",
            BoundaryCondition::NeumannGroup(_) => "Neumann group",
        }
    }
}

/// Set of nodes sharing a total injected flux
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeumannGroup {
    /// Member nodes
    pub nodes: Vec<usize>,
    /// Flux injected over the whole group
    pub total_flux: f64,
}

impl NeumannGroup {
    /// Flux received by each member
    pub fn flux_per_node(&self) -> f64 {
        if self.nodes.is_empty() {
            0.0
        } else {
            self.total_flux / self.nodes.len() as f64
        }
    }
}

// =================================================================================================
// Registry
// =================================================================================================

/// Per-node boundary condition bookkeeping
///
/// # Examples
///
/// ```rust
/// use pnm_rs::solver::{BoundaryCondition, BoundaryConditions};
///
/// let mut bcs = BoundaryConditions::new(5);
/// bcs.set_dirichlet(&[0], 1.0).unwrap();
/// bcs.set_dirichlet(&[4], 0.0).unwrap();
///
/// // same kind: the value is replaced
/// bcs.set_dirichlet(&[0], 2.0).unwrap();
/// assert_eq!(bcs.get(0), Some(BoundaryCondition::Dirichlet(2.0)));
///
/// // different kind: rejected
/// assert!(bcs.set_neumann(&[0], 1.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryConditions {
    node_count: usize,
    conditions: BTreeMap<usize, BoundaryCondition>,
    groups: Vec<NeumannGroup>,
}

impl BoundaryConditions {
    /// Create an empty registry for `node_count` nodes
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            conditions: BTreeMap::new(),
            groups: Vec::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    // ==================================== Registration ===========================================

    /// Fix the same value on every listed node
    pub fn set_dirichlet(&mut self, nodes: &[usize], value: f64) -> Result<(), ConfigurationError> {
        self.set_dirichlet_values(nodes, &vec![value; nodes.len()])
    }

    /// Fix one value per listed node
    ///
    /// # Errors
    ///
    /// - size mismatch between `nodes` and `values`
    /// - invalid or repeated node id, non-finite value
    /// - a listed node already carries a Neumann condition or belongs to a group
    pub fn set_dirichlet_values(&mut self, nodes: &[usize], values: &[f64]) -> Result<(), ConfigurationError> {
        if nodes.len() != values.len() {
            return Err(ConfigurationError::SizeMismatch {
                name: "Dirichlet values".to_string(),
                expected: nodes.len(),
                actual: values.len(),
            });
        }
        self.check_registration(nodes, values, "Dirichlet")?;

        for (&node, &value) in nodes.iter().zip(values) {
            self.conditions.insert(node, BoundaryCondition::Dirichlet(value));
        }
        Ok(())
    }

    /// Inject the same flux at every listed node
    ///
    /// Each node receives the full `flux`; use
    /// [`set_neumann_group`](Self::set_neumann_group) to split a total.
    pub fn set_neumann(&mut self, nodes: &[usize], flux: f64) -> Result<(), ConfigurationError> {
        self.check_registration(nodes, &vec![flux; nodes.len()], "Neumann")?;

        for &node in nodes {
            self.conditions.insert(node, BoundaryCondition::Neumann(flux));
        }
        Ok(())
    }

    /// Inject `total_flux` over a group, split equally among its members
    ///
    /// Returns the group id. Group members cannot be re-registered until
    /// removed with [`remove`](Self::remove).
    pub fn set_neumann_group(&mut self, nodes: &[usize], total_flux: f64) -> Result<usize, ConfigurationError> {
        if nodes.is_empty() {
            return Err(ConfigurationError::EmptyGroup);
        }
        self.check_registration(nodes, &[total_flux], "Neumann group")?;

        let group = self.groups.len();
        self.groups.push(NeumannGroup { nodes: nodes.to_vec(), total_flux });
        for &node in nodes {
            self.conditions.insert(node, BoundaryCondition::NeumannGroup(group));
        }
        Ok(group)
    }

    fn check_registration(
        &self,
        nodes: &[usize],
        values: &[f64],
        requested: &'static str,
    ) -> Result<(), ConfigurationError> {
        let mut seen = HashSet::with_capacity(nodes.len());
        for &node in nodes {
            if node >= self.node_count {
                return Err(ConfigurationError::InvalidNode { node, node_count: self.node_count });
            }
            if !seen.insert(node) {
                return Err(ConfigurationError::DuplicateNode { node });
            }
            if let Some(existing) = self.conditions.get(&node) {
                let replaceable = existing.kind() == requested && !matches!(existing, BoundaryCondition::NeumannGroup(_));
                if !replaceable {
                    return Err(self.conflict(node, requested));
                }
            }
        }

        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(ConfigurationError::InvalidValue {
                name: format!("{} value", requested),
                index,
                value: values[index],
            });
        }
        Ok(())
    }

    fn conflict(&self, node: usize, requested: &'static str) -> ConfigurationError {
        ConfigurationError::ConflictingBoundaryCondition {
            node,
            existing: self.conditions.get(&node).map(BoundaryCondition::kind).unwrap_or("no"),
            requested,
        }
    }

    /// Remove the condition on a node
    ///
    /// A group member leaves its group; the group total is then split among the
    /// remaining members.
    pub fn remove(&mut self, node: usize) -> Option<BoundaryCondition> {
        let removed = self.conditions.remove(&node)?;
        if let BoundaryCondition::NeumannGroup(group) = removed {
            if let Some(group) = self.groups.get_mut(group) {
                group.nodes.retain(|&member| member != node);
            }
        }
        Some(removed)
    }

    /// Remove every condition
    pub fn clear(&mut self) {
        self.conditions.clear();
        self.groups.clear();
    }

    // ======================================= Queries =============================================

    pub fn get(&self, node: usize) -> Option<BoundaryCondition> {
        self.conditions.get(&node).copied()
    }

    /// Dirichlet value of a node, if any
    pub fn dirichlet_value(&self, node: usize) -> Option<f64> {
        match self.conditions.get(&node) {
            Some(BoundaryCondition::Dirichlet(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn is_dirichlet(&self, node: usize) -> bool {
        self.dirichlet_value(node).is_some()
    }

    /// Dirichlet nodes and values, in ascending node order
    pub fn dirichlet(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.conditions.iter().filter_map(|(&node, condition)| match condition {
            BoundaryCondition::Dirichlet(value) => Some((node, *value)),
            _ => None,
        })
    }

    pub fn has_dirichlet(&self) -> bool {
        self.dirichlet().next().is_some()
    }

    /// Injected flux at a node, including its share of a group total
    pub fn flux(&self, node: usize) -> Option<f64> {
        match self.conditions.get(&node)? {
            BoundaryCondition::Dirichlet(_) => None,
            BoundaryCondition::Neumann(flux) => Some(*flux),
            BoundaryCondition::NeumannGroup(group) => self.groups.get(*group).map(NeumannGroup::flux_per_node),
        }
    }

    /// Every node with an injected flux, in ascending node order
    pub fn fluxes(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.conditions.keys().filter_map(|&node| self.flux(node).map(|flux| (node, flux)))
    }

    pub fn groups(&self) -> &[NeumannGroup] {
        &self.groups
    }

    /// Number of constrained nodes
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Scale every Dirichlet value and flux by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        let mut scaled = self.clone();
        for condition in scaled.conditions.values_mut() {
            match condition {
                BoundaryCondition::Dirichlet(value) | BoundaryCondition::Neumann(value) => *value *= factor,
                BoundaryCondition::NeumannGroup(_) => {}
            }
        }
        for group in &mut scaled.groups {
            group.total_flux *= factor;
        }
        scaled
    }
}

// =================================================================================================
// Tests
// =================================================================================================
