//! Error types
//!
//! All fallible operations of the crate return [`TransportResult`]. The error
//! taxonomy follows the life cycle of a solve:
//!
//! - [`ConfigurationError`]: raised while the problem is being described
//!   (topology, property tables, boundary conditions, solver parameters).
//! - [`PropertyError`]: a conductance model could not find an input it needs.
//! - [`TransportError::Underconstrained`]: raised when the linear system is
//!   assembled and some connected component has no Dirichlet node.
//! - [`TransportError::Convergence`]: Picard iteration ran out of iterations
//!   (only raised in strict mode, see [`PicardSettings`](crate::solver::PicardSettings)).
//! - [`TransportError::IterativeSolver`] / [`TransportError::Linalg`]: the
//!   linear solver itself failed.
//!
//! Every variant carries the node or conduit id needed to locate the fault.

use nalgebra::DVector;
use thiserror::Error;

use crate::network::{PoreProperty, ThroatProperty};

/// Result alias used throughout the crate
pub type TransportResult<T> = Result<T, TransportError>;

/// Top-level error type
#[derive(Error, Debug)]
pub enum TransportError {
    /// Invalid problem description, detected before assembly
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A conductance model is missing an input
    #[error("property error: {0}")]
    Property(#[from] PropertyError),

    /// A connected component has no Dirichlet node, the system is singular
    #[error(
        "underconstrained system: component of {component_size} node(s) containing node {node} \
         has no Dirichlet condition"
    )]
    Underconstrained {
        /// Representative node of the unconstrained component
        node: usize,
        /// Number of nodes in the component
        component_size: usize,
    },

    /// Picard iteration exceeded its iteration budget
    #[error("Picard iteration did not converge after {iterations} iteration(s), residual {residual:e}")]
    Convergence {
        /// Iterations performed
        iterations: usize,
        /// Last max-norm update
        residual: f64,
        /// Last iterate
        solution: DVector<f64>,
    },

    /// The iterative linear solver did not reach its tolerance
    #[error("{method} stopped after {iterations} iteration(s) with relative residual {residual:e}")]
    IterativeSolver {
        /// Solver name
        method: &'static str,
        /// Iterations performed
        iterations: usize,
        /// Relative residual reached
        residual: f64,
    },

    /// Sparse factorization failure
    #[error("linear algebra error: {0}")]
    Linalg(#[from] sprs::errors::LinalgError),

    /// The solver produced NaN or infinite values
    #[error("non-finite value in solution at node {node}")]
    NonFinite {
        /// First offending node
        node: usize,
    },

    /// Post-processing requested before `run()`
    #[error("no solution available, call run() first")]
    NotSolved,
}

/// Problem description errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Node id outside `[0, node_count)`
    #[error("node {node} out of range 0..{node_count}")]
    InvalidNode {
        /// Offending node id
        node: usize,
        /// Number of nodes in the topology
        node_count: usize,
    },

    /// Conduit references a node outside the topology
    #[error("conduit {conduit} references node {node} out of range 0..{node_count}")]
    InvalidConduitEndpoint {
        /// Offending conduit
        conduit: usize,
        /// Referenced node
        node: usize,
        /// Number of nodes in the topology
        node_count: usize,
    },

    /// Conduit connects a node to itself
    #[error("conduit {conduit} connects node {node} to itself")]
    SelfLoop {
        /// Offending conduit
        conduit: usize,
        /// Repeated node
        node: usize,
    },

    /// Two different boundary condition kinds on one node
    #[error("node {node} already carries a {existing} condition, cannot add {requested}")]
    ConflictingBoundaryCondition {
        /// Node id
        node: usize,
        /// Kind already registered
        existing: &'static str,
        /// Kind being registered
        requested: &'static str,
    },

    /// Neumann group without nodes
    #[error("Neumann group must contain at least one node")]
    EmptyGroup,

    /// Node listed twice in one registration call
    #[error("node {node} listed more than once")]
    DuplicateNode {
        /// Node id
        node: usize,
    },

    /// Array length does not match the topology
    #[error("{name}: expected {expected} entries, got {actual}")]
    SizeMismatch {
        /// What was being registered
        name: String,
        /// Expected length
        expected: usize,
        /// Provided length
        actual: usize,
    },

    /// Non-finite or out-of-domain value
    #[error("{name}[{index}] = {value} is not a valid value")]
    InvalidValue {
        /// What was being registered
        name: String,
        /// Index of the offending entry
        index: usize,
        /// Offending value
        value: f64,
    },

    /// Coordinates needed but not provided
    #[error("topology has no pore coordinates")]
    MissingCoordinates,

    /// Effective coefficient cannot be derived from the given faces
    #[error("invalid domain extent: {0}")]
    InvalidExtent(String),

    /// Face used for an effective coefficient carries no Dirichlet node
    #[error("face containing node {node} has no Dirichlet condition")]
    FaceNotConstrained {
        /// First node of the face
        node: usize,
    },

    /// Solver parameters out of range
    #[error("invalid solver parameter: {0}")]
    InvalidSolverParameter(String),

    /// Transport kind has no built-in conductance model
    #[error("no default conductance model for {kind} transport, supply one explicitly")]
    NoDefaultModel {
        /// Transport kind name
        kind: String,
    },
}

/// Missing inputs of a conductance model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropertyError {
    /// Pore property unset for a given pore
    #[error("conduit {conduit}: pore property {property} is not set for pore {pore}")]
    MissingPore {
        /// Conduit being evaluated
        conduit: usize,
        /// Pore whose value is missing
        pore: usize,
        /// Field
        property: PoreProperty,
    },

    /// Throat property unset for a given conduit
    #[error("conduit {conduit}: throat property {property} is not set")]
    MissingThroat {
        /// Conduit being evaluated
        conduit: usize,
        /// Field
        property: ThroatProperty,
    },
}

impl PropertyError {
    /// Conduit whose evaluation failed
    pub fn conduit(&self) -> usize {
        match self {
            PropertyError::MissingPore { conduit, .. } => *conduit,
            PropertyError::MissingThroat { conduit, .. } => *conduit,
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================
