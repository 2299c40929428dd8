//! Numerical solvers
//!
//! This module turns a described transport problem into a steady-state field.
//!
//! # Core Concepts
//!
//! ## The Architecture (WHAT vs HOW)
//!
//! The solver architecture separates concerns into three layers:
//!
//! 1. **Scenario** (`Scenario`) - WHAT to solve
//!    - Network topology and conductances (borrowed)
//!    - Boundary conditions (`BoundaryConditions`)
//!    - Source terms (`SourceTerms`)
//!
//! 2. **Configuration** (`SolverConfiguration`) - HOW to solve
//!    - Linear method (`SolverType`: direct or conjugate gradient)
//!    - Picard loop settings for nonlinear sources
//!    - Missing-property policy
//!
//! 3. **Solver** (`Solver` / `LinearSolver` traits) - The numerical method
//!    - `Assembler` builds the sparse symmetric system
//!    - a `LinearSolver` solves it
//!    - `PicardSolver` re-linearizes sources until convergence
//!
//! # Module Organization
//!
//! - **`traits`**: `Solver`, `LinearSolver`, `SolverType`, `SolverConfiguration`,
//!   `PicardSettings`, `SolveResult`
//! - **`boundary`**: `BoundaryConditions` registry
//! - **`sources`**: `SourceTerms` registry
//! - **`scenario`**: `Scenario`
//! - **`assembler`**: `Assembler` and `LinearSystem`
//! - **`methods`**: `DirectSolver`, `ConjugateGradientSolver`
//! - **`picard`**: `PicardSolver`, `solve_scenario`, `solve_batch`
//!
//! # Quick Start Example
//!
//! ```rust
//! use pnm_rs::network::Topology;
//! use pnm_rs::physics::Conductances;
//! use pnm_rs::solver::{solve_scenario, Scenario, SolverConfiguration};
//!
//! // 1. Create scenario (WHAT to solve)
//! let topology = Topology::chain(5, 1.0);
//! let conductances = Conductances::uniform(&topology, 1.0).unwrap();
//! let mut scenario = Scenario::new(&topology, &conductances);
//! scenario.boundary_conditions.set_dirichlet(&[0], 1.0).unwrap();
//! scenario.boundary_conditions.set_dirichlet(&[4], 0.0).unwrap();
//!
//! // 2. Create configuration (HOW to solve)
//! let config = SolverConfiguration::conjugate_gradient(1e-12, 100);
//!
//! // 3. Solve
//! let result = solve_scenario(&scenario, &config).unwrap();
//! assert!((result.solution[2] - 0.5).abs() < 1e-9);
//! ```
//!
//! # Workflow Diagram
//!
//! ```text
//! ┌──────────────────────┐
//! │ Topology +           │  (network, borrowed)
//! │ Conductances         │
//! └──────────┬───────────┘
//!            │
//!            ├─────────────────┐
//!            │                 │
//! ┌──────────▼──────────┐ ┌────▼──────────────┐
//! │ BoundaryConditions  │ │ Scenario          │ ← WHAT to solve
//! │ SourceTerms         │ │                   │
//! └─────────────────────┘ └────────┬──────────┘
//!                                  │
//!                       ┌──────────▼───────────┐
//!                       │ SolverConfiguration  │ ← HOW to solve
//!                       └──────────┬───────────┘
//!                                  │
//!                       ┌──────────▼───────────┐
//!                       │ Assembler → A·x = b  │
//!                       │ LinearSolver (Picard)│ ← The method
//!                       └──────────┬───────────┘
//!                                  │
//!                       ┌──────────▼───────────┐
//!                       │ SolveResult          │ ← The solution
//!                       └──────────────────────┘
//! ```
//!
//! # Error Handling
//!
//! All entry points return [`TransportResult`](crate::error::TransportResult):
//!
//! ```rust,ignore
//! match solve_scenario(&scenario, &config) {
//!     Ok(result) if !result.converged => log::warn!("residual {:e}", result.residual),
//!     Ok(result) => println!("solved in {} iteration(s)", result.iterations),
//!     Err(TransportError::Underconstrained { node, .. }) => eprintln!("fix a value near node {}", node),
//!     Err(e) => eprintln!("solver failed: {}", e),
//! }
//! ```
//!
//! Common errors:
//! - Invalid configuration (non-positive tolerance, relaxation outside (0, 1])
//! - Underconstrained network (a component without Dirichlet node)
//! - Linear solver failure (zero pivot, CG iteration budget)

// =================================================================================================
// Module Declarations
// =================================================================================================
mod assembler;
mod boundary;
mod methods;
mod picard;
mod scenario;
mod sources;
mod traits;

// =================================================================================================
// Parallel Execution Threshold
// =================================================================================================
//
// Deciding *when* to hand work off to Rayon is a numerical-execution concern,
// not a physics concern, so it lives here rather than in physics/.
//
// The threshold is stored in an AtomicUsize so that it can be changed at
// runtime (useful in benchmarks and tests) without a mutex. Relaxed ordering
// is sufficient: the value is a performance hint, not a synchronisation point.
// =================================================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of conduits above which conductance tables are computed in
/// parallel.
const DEFAULT_PARALLEL_THRESHOLD: usize = 999;

/// Runtime-configurable parallel-execution threshold.
///
/// Read via [`parallel_threshold()`], written via [`set_parallel_threshold()`].
static PARALLEL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Return the current parallel-execution threshold.
///
/// [`Conductances::compute`](crate::physics::Conductances::compute) evaluates
/// sequentially when the network has at most this many conduits, and switches
/// to Rayon above it, but only when the crate is compiled with the `parallel`
/// feature.
///
/// # Example
///
/// ```rust
/// use pnm_rs::solver::parallel_threshold;
///
/// assert!(parallel_threshold() > 0);
/// ```
pub fn parallel_threshold() -> usize {
    PARALLEL_THRESHOLD.load(Ordering::Relaxed)
}

/// Set the parallel-execution threshold to a new value.
///
/// # Panics
///
/// Panics when `threshold == 0`.
///
/// # Example
///
/// ```rust
/// use pnm_rs::solver::{parallel_threshold, set_parallel_threshold};
///
/// let previous = parallel_threshold();
/// set_parallel_threshold(2048);
/// assert_eq!(parallel_threshold(), 2048);
///
/// // Restore so other tests are not affected.
/// set_parallel_threshold(previous);
/// ```
pub fn set_parallel_threshold(threshold: usize) {
    assert!(threshold > 0, "parallel threshold must be at least 1");
    PARALLEL_THRESHOLD.store(threshold, Ordering::Relaxed);
}

/// RAII guard that saves the current threshold on construction and restores
/// it on drop.
///
/// Only compiled in test builds.
///
/// ```rust,ignore
/// let _guard = crate::solver::ThresholdGuard::save(50);
/// // threshold is now 50 …
/// // … and is automatically restored when _guard is dropped.
/// ```
#[cfg(test)]
pub(crate) struct ThresholdGuard {
    previous: usize,
    _lock: std::sync::MutexGuard<'static, ()>,
}

/// Serializes tests that change the threshold.
#[cfg(test)]
static THRESHOLD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
impl ThresholdGuard {
    /// Set the threshold to `new_value` and return a guard that will
    /// restore the previous value on drop.
    pub(crate) fn save(new_value: usize) -> Self {
        let lock = THRESHOLD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = parallel_threshold();
        set_parallel_threshold(new_value);
        Self { previous, _lock: lock }
    }
}

#[cfg(test)]
impl Drop for ThresholdGuard {
    fn drop(&mut self) {
        // Bypass the public setter so that restoring never panics.
        PARALLEL_THRESHOLD.store(self.previous, Ordering::Relaxed);
    }
}

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use traits::{LinearSolver, PicardSettings, SolveResult, Solver, SolverConfiguration, SolverType};

pub use assembler::{Assembler, LinearSystem};
pub use boundary::{BoundaryCondition, BoundaryConditions, NeumannGroup};
pub use scenario::Scenario;
pub use sources::SourceTerms;

pub use methods::{ConjugateGradientSolver, DirectSolver};
pub use picard::{solve_batch, solve_scenario, PicardSolver};

// =================================================================================================
// Helper Functions
// =================================================================================================

use nalgebra::DVector;

use crate::error::{TransportError, TransportResult};

/// Validate a solution vector for numerical issues
///
/// NaN or infinite values indicate a singular or badly scaled system; the
/// first offending node is reported.
///
/// ```rust,ignore
/// validate_solution(&x)?;
/// ```
pub(crate) fn validate_solution(x: &DVector<f64>) -> TransportResult<()> {
    match x.iter().position(|value| !value.is_finite()) {
        Some(node) => Err(TransportError::NonFinite { node }),
        None => Ok(()),
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold_value() {
        assert_eq!(DEFAULT_PARALLEL_THRESHOLD, 999);
    }

    #[test]
    fn test_get_and_set_threshold() {
        let _guard = ThresholdGuard::save(500);
        assert_eq!(parallel_threshold(), 500);
    }

    #[test]
    #[should_panic(expected = "parallel threshold must be at least 1")]
    fn test_zero_threshold_panics() {
        set_parallel_threshold(0);
    }

    #[test]
    fn test_threshold_guard_restores_previous_value() {
        let guard = ThresholdGuard::save(42);
        let previous = guard.previous;
        assert_eq!(parallel_threshold(), 42);
        drop(guard);

        let _guard = ThresholdGuard::save(previous);
        assert_eq!(parallel_threshold(), previous);
    }

    #[test]
    fn test_validate_solution() {
        assert!(validate_solution(&DVector::from_vec(vec![0.0, 1.0])).is_ok());
        assert!(matches!(
            validate_solution(&DVector::from_vec(vec![0.0, f64::NAN, f64::INFINITY])),
            Err(TransportError::NonFinite { node: 1 })
        ));
    }
}
