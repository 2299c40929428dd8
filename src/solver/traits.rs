//! Numerical solver traits and types
//!
//! # Design Philosophy
//!
//! - Central enum `SolverType` selects the linear solution method
//! - `PicardSettings` drives the outer fixed-point loop used for source terms
//! - `SolverConfiguration` bundles both with the missing-property policy
//! - `SolveResult` carries the solution plus free-form metadata
//!
//! # Stability Guarantee
//!
//! - `Solver` and `LinearSolver` traits: stable interfaces
//! - `SolverType` enum: EXTENSIBLE (new variants can be added)
//! - Core structures: STABLE (fields won't be removed)

use std::collections::HashMap;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, TransportError, TransportResult};
use crate::physics::MissingPropertyPolicy;
use crate::solver::assembler::LinearSystem;
use crate::solver::methods::{ConjugateGradientSolver, DirectSolver};
use crate::solver::Scenario;

// =================================================================================================
// Central Solver Type Enumeration
// =================================================================================================

/// Linear solution method
///
/// # Examples
///
/// ```rust
/// use pnm_rs::solver::SolverType;
///
/// // Sparse LDLᵀ factorization
/// let direct = SolverType::Direct;
///
/// // Jacobi-preconditioned conjugate gradient
/// let cg = SolverType::ConjugateGradient {
///     tolerance: 1e-10,
///     max_iterations: 1000,
/// };
///
/// assert!(cg.validate().is_ok());
/// assert_eq!(direct.name(), "Direct");
/// ```
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SolverType {
    /// Sparse LDLᵀ with reverse Cuthill-McKee ordering
    #[default]
    Direct,

    /// Jacobi-preconditioned conjugate gradient
    ///
    /// # Parameters
    /// - `tolerance`: relative residual `‖b − Ax‖ / ‖b‖` to reach
    /// - `max_iterations`: safety limit
    ConjugateGradient {
        tolerance: f64,
        max_iterations: usize,
    },
}

impl SolverType {
    /// Get name identifier
    pub fn name(&self) -> &'static str {
        match self {
            SolverType::Direct => "Direct",
            SolverType::ConjugateGradient { .. } => "ConjugateGradient",
        }
    }

    /// Validate that parameters are meaningful
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self {
            SolverType::Direct => Ok(()),
            SolverType::ConjugateGradient { tolerance, max_iterations } => {
                if !(tolerance.is_finite() && *tolerance > 0.0) {
                    return Err(ConfigurationError::InvalidSolverParameter(format!(
                        "CG tolerance must be positive, got {}",
                        tolerance
                    )));
                }
                if *max_iterations == 0 {
                    return Err(ConfigurationError::InvalidSolverParameter(
                        "CG maximum iterations must be greater than 0".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Instantiate the linear solver
    pub fn build(&self) -> Box<dyn LinearSolver> {
        match self {
            SolverType::Direct => Box::new(DirectSolver::new()),
            SolverType::ConjugateGradient { tolerance, max_iterations } => {
                Box::new(ConjugateGradientSolver::new(*tolerance, *max_iterations))
            }
        }
    }
}

// =================================================================================================
// Picard settings
// =================================================================================================

/// Outer fixed-point iteration settings
///
/// The loop stops when `max |x_new − x_old| < tolerance`. Each update is
/// relaxed as `x ← ω·x_new + (1 − ω)·x_old` with `ω = relaxation`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PicardSettings {
    /// Max-norm update below which the loop stops
    pub tolerance: f64,

    /// Iteration budget
    pub max_iterations: usize,

    /// Relaxation factor `ω ∈ (0, 1]`
    pub relaxation: f64,

    /// Turn a non-converged loop into [`TransportError::Convergence`]
    pub strict: bool,
}

impl Default for PicardSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 200,
            relaxation: 1.0,
            strict: false,
        }
    }
}

impl PicardSettings {
    /// Validate that parameters are meaningful
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigurationError::InvalidSolverParameter(format!(
                "Picard tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(ConfigurationError::InvalidSolverParameter(
                "Picard maximum iterations must be greater than 0".to_string(),
            ));
        }
        if !(self.relaxation > 0.0 && self.relaxation <= 1.0) {
            return Err(ConfigurationError::InvalidSolverParameter(format!(
                "relaxation factor must be in (0, 1], got {}",
                self.relaxation
            )));
        }
        Ok(())
    }
}

// =================================================================================================
// Solver configuration
// =================================================================================================

/// Configuration for a transport solve
///
/// # Examples
///
/// ```rust
/// use pnm_rs::physics::MissingPropertyPolicy;
/// use pnm_rs::solver::SolverConfiguration;
///
/// let config = SolverConfiguration::conjugate_gradient(1e-12, 5000)
///     .with_picard(1e-10, 50)
///     .with_relaxation(0.7)
///     .strict()
///     .with_missing_property_policy(MissingPropertyPolicy::Abort);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfiguration {
    /// Linear solution method and its parameters
    pub solver_type: SolverType,

    /// Outer loop settings (used only when source terms are present)
    pub picard: PicardSettings,

    /// Handling of conduits with missing properties
    pub missing_property: MissingPropertyPolicy,
}

impl SolverConfiguration {
    /// Create a new configuration with a given solver type
    pub fn new(solver_type: SolverType) -> Self {
        Self {
            solver_type,
            ..Self::default()
        }
    }

    /// Create a direct solver configuration
    pub fn direct() -> Self {
        Self::new(SolverType::Direct)
    }

    /// Create a conjugate gradient configuration
    pub fn conjugate_gradient(tolerance: f64, max_iterations: usize) -> Self {
        Self::new(SolverType::ConjugateGradient { tolerance, max_iterations })
    }

    /// Set the Picard tolerance and iteration budget
    pub fn with_picard(mut self, tolerance: f64, max_iterations: usize) -> Self {
        self.picard.tolerance = tolerance;
        self.picard.max_iterations = max_iterations;
        self
    }

    /// Set the Picard relaxation factor
    pub fn with_relaxation(mut self, relaxation: f64) -> Self {
        self.picard.relaxation = relaxation;
        self
    }

    /// Fail with a convergence error instead of returning a non-converged result
    pub fn strict(mut self) -> Self {
        self.picard.strict = true;
        self
    }

    pub fn with_missing_property_policy(mut self, policy: MissingPropertyPolicy) -> Self {
        self.missing_property = policy;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.solver_type.validate()?;
        self.picard.validate()
    }
}

// =================================================================================================
// Solve result
// =================================================================================================

/// Outcome of a transport solve
#[derive(Clone, Debug)]
pub struct SolveResult {
    /// One value per node
    pub solution: DVector<f64>,

    /// Whether the outer loop met its tolerance (always true without sources)
    pub converged: bool,

    /// Linear solves performed
    pub iterations: usize,

    /// Last Picard update, or the linear residual `max |Ax − b|` without sources
    pub residual: f64,

    /// Free-form diagnostics
    pub metadata: HashMap<String, String>,
}

impl SolveResult {
    pub fn new(solution: DVector<f64>, converged: bool, iterations: usize, residual: f64) -> Self {
        Self {
            solution,
            converged,
            iterations,
            residual,
            metadata: HashMap::new(),
        }
    }

    /// Add metadata entry
    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    /// Get metadata entry
    pub fn get_metadata(&self, key: &str) -> Option<&String> {
        self.metadata.get(key)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.solution.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solution.is_empty()
    }

    /// Turn a non-converged result into [`TransportError::Convergence`]
    pub fn into_converged(self) -> TransportResult<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(TransportError::Convergence {
                iterations: self.iterations,
                residual: self.residual,
                solution: self.solution,
            })
        }
    }
}

// =================================================================================================
// Solver Traits
// =================================================================================================

/// Trait for linear solution methods
///
/// Solves `A·x = b` for an assembled [`LinearSystem`]. Implementations are
/// stateless and can be shared across threads.
pub trait LinearSolver: Send + Sync {
    /// Solve the system, optionally starting from an initial guess
    fn solve(&self, system: &LinearSystem, initial_guess: Option<&DVector<f64>>) -> TransportResult<DVector<f64>>;

    /// Name of the method (used to display and logging)
    fn name(&self) -> &'static str;
}

/// Trait for transport solvers
///
/// Takes WHAT to solve (the [`Scenario`]) and HOW to solve it (the
/// [`SolverConfiguration`]) and returns the steady-state field.
pub trait Solver {
    fn solve(&self, scenario: &Scenario<'_>, config: &SolverConfiguration) -> TransportResult<SolveResult>;

    fn name(&self) -> &'static str;
}

// =================================================================================================
// Tests
// =================================================================================================
