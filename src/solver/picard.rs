//! Steady-state transport driver
//!
//! Without source terms a scenario is a single linear solve. With source
//! terms, the rates are linearized at the latest iterate and the system is
//! solved again until the update falls below the Picard tolerance:
//!
//! ```text
//! x⁰ = 0
//! repeat k = 1, 2, ...
//!     linearize sources at xᵏ⁻¹, solve A(xᵏ⁻¹)·x* = b(xᵏ⁻¹)
//!     xᵏ = ω·x* + (1 − ω)·xᵏ⁻¹
//! until max |xᵏ − xᵏ⁻¹| < tolerance
//! ```
//!
//! Affine sources are exact after one linearization and skip the loop.

use log::{debug, trace, warn};
use nalgebra::DVector;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{TransportError, TransportResult};
use crate::solver::{Assembler, LinearSolver, Scenario, SolveResult, Solver, SolverConfiguration};

/// Picard fixed-point driver around a linear method
///
/// # Example
///
/// ```rust
/// use pnm_rs::network::Topology;
/// use pnm_rs::physics::Conductances;
/// use pnm_rs::solver::{PicardSolver, Scenario, Solver, SolverConfiguration};
///
/// let topology = Topology::chain(5, 1.0);
/// let conductances = Conductances::uniform(&topology, 1.0).unwrap();
/// let mut scenario = Scenario::new(&topology, &conductances);
/// scenario.boundary_conditions.set_dirichlet(&[0], 1.0).unwrap();
/// scenario.boundary_conditions.set_dirichlet(&[4], 0.0).unwrap();
///
/// let result = PicardSolver::new().solve(&scenario, &SolverConfiguration::default()).unwrap();
/// assert!((result.solution[1] - 0.75).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PicardSolver;

impl PicardSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for PicardSolver {
    fn solve(&self, scenario: &Scenario<'_>, config: &SolverConfiguration) -> TransportResult<SolveResult> {
        // ====== Step 1: Validation ======

        config.validate()?;
        scenario.validate()?;

        // ====== Step 2: Base system ======

        let linear = config.solver_type.build();
        let base = Assembler::assemble_base(scenario)?;

        // ====== Step 3: Solve ======

        let mut result = if scenario.sources.is_empty() {
            let solution = linear.solve(&base, None)?;
            let residual = base.residual(&solution);
            SolveResult::new(solution, true, 1, residual)
        } else if scenario.sources.is_linear() {
            let zero = DVector::zeros(scenario.node_count());
            let system = base.with_sources(&scenario.sources.linearize(&zero, &scenario.boundary_conditions));
            let solution = linear.solve(&system, None)?;
            let residual = system.residual(&solution);
            SolveResult::new(solution, true, 1, residual)
        } else {
            iterate(scenario, config, linear.as_ref(), &base)?
        };

        // ====== Step 4: Build Result ======

        result.add_metadata("solver", linear.name());
        result.add_metadata("iterations", &result.iterations.to_string());
        result.add_metadata("residual", &format!("{:e}", result.residual));
        result.add_metadata("converged", &result.converged.to_string());

        debug!(
            "{} + {}: {} iteration(s), residual {:e}",
            self.name(),
            linear.name(),
            result.iterations,
            result.residual
        );
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "Picard"
    }
}

/// Outer fixed-point loop for nonlinear sources
fn iterate(
    scenario: &Scenario<'_>,
    config: &SolverConfiguration,
    linear: &dyn LinearSolver,
    base: &crate::solver::LinearSystem,
) -> TransportResult<SolveResult> {
    let settings = &config.picard;
    let omega = settings.relaxation;

    let mut x = DVector::zeros(scenario.node_count());
    let mut delta = f64::INFINITY;

    for iteration in 1..=settings.max_iterations {
        let linearizations = scenario.sources.linearize(&x, &scenario.boundary_conditions);
        let system = base.with_sources(&linearizations);

        let mut next = linear.solve(&system, Some(&x))?;
        if omega < 1.0 {
            next = &next * omega + &x * (1.0 - omega);
        }

        delta = (&next - &x).amax();
        x = next;
        trace!("Picard iter {}: max update = {:.6e}", iteration, delta);

        if delta < settings.tolerance {
            return Ok(SolveResult::new(x, true, iteration, delta));
        }
    }

    if settings.strict {
        return Err(TransportError::Convergence {
            iterations: settings.max_iterations,
            residual: delta,
            solution: x,
        });
    }

    warn!(
        "Picard iteration did not converge after {} iteration(s), last update {:e}",
        settings.max_iterations, delta
    );
    Ok(SolveResult::new(x, false, settings.max_iterations, delta))
}

// =================================================================================================
// Entry points
// =================================================================================================

/// Solve one scenario
///
/// Pure function of its inputs: identical inputs give identical results.
pub fn solve_scenario(scenario: &Scenario<'_>, config: &SolverConfiguration) -> TransportResult<SolveResult> {
    PicardSolver::new().solve(scenario, config)
}

/// Solve independent scenarios, results ordered like the input
///
/// Runs on the rayon thread pool with the `parallel` feature, sequentially
/// otherwise. A failing scenario does not affect the others.
pub fn solve_batch(scenarios: &[Scenario<'_>], config: &SolverConfiguration) -> Vec<TransportResult<SolveResult>> {
    #[cfg(feature = "parallel")]
    {
        scenarios.par_iter().map(|scenario| solve_scenario(scenario, config)).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        scenarios.iter().map(|scenario| solve_scenario(scenario, config)).collect()
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConstantRate, LinearKinetics, PowerLaw};
    use crate::network::Topology;
    use crate::physics::Conductances;
    use approx::assert_relative_eq;

    fn setup(n: usize) -> (Topology, Conductances) {
        let topology = Topology::chain(n, 1.0);
        let conductances = Conductances::uniform(&topology, 1.0).unwrap();
        (topology, conductances)
    }

    #[test]
    fn test_linear_problem_single_solve() {
        let (topology, conductances) = setup(5);
        let mut scenario = Scenario::new(&topology, &conductances);
        scenario.boundary_conditions.set_dirichlet(&[0], 1.0).unwrap();
        scenario.boundary_conditions.set_dirichlet(&[4], 0.0).unwrap();

        let result = solve_scenario(&scenario, &SolverConfiguration::default()).unwrap();
        assert!(result.converged);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.get_metadata("solver").map(String::as_str), Some("Direct LDL"));
    }

    #[test]
    fn test_affine_source_single_solve() {
        let (topology, conductances) = setup(2);
        let mut scenario = Scenario::new(&topology, &conductances);
        scenario.boundary_conditions.set_dirichlet(&[0], 1.0).unwrap();
        scenario.sources.add(&[1], LinearKinetics::new(-1.0, 0.0)).unwrap();

        // (x1 - 1) + x1 = 0
        let result = solve_scenario(&scenario, &SolverConfiguration::default()).unwrap();
        assert_eq!(result.iterations, 1);
        assert_relative_eq!(result.solution[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_nonlinear_source_converges() {
        let (topology, conductances) = setup(2);
        let mut scenario = Scenario::new(&topology, &conductances);
        scenario.boundary_conditions.set_dirichlet(&[0], 1.0).unwrap();
        scenario.sources.add(&[1], PowerLaw::standard(-1.0, 2.0)).unwrap();

        // 1 - x = x²  ⇒  x = (√5 − 1)/2
        let result = solve_scenario(&scenario, &SolverConfiguration::default()).unwrap();
        assert!(result.converged);
        assert!(result.iterations > 1);
        assert_relative_eq!(result.solution[1], (5f64.sqrt() - 1.0) / 2.0, epsilon = 1e-8);
    }

    #[test]
    fn test_relaxation_reaches_same_fixed_point() {
        let (topology, conductances) = setup(2);
        let mut scenario = Scenario::new(&topology, &conductances);
        scenario.boundary_conditions.set_dirichlet(&[0], 1.0).unwrap();
        scenario.sources.add(&[1], PowerLaw::standard(-1.0, 2.0)).unwrap();

        let config = SolverConfiguration::default().with_picard(1e-10, 500).with_relaxation(0.5);
        let result = solve_scenario(&scenario, &config).unwrap();
        assert!(result.converged);
        assert_relative_eq!(result.solution[1], (5f64.sqrt() - 1.0) / 2.0, epsilon = 1e-8);
    }

    #[test]
    fn test_budget_exhausted_non_strict() {
        let (topology, conductances) = setup(2);
        let mut scenario = Scenario::new(&topology, &conductances);
        scenario.boundary_conditions.set_dirichlet(&[0], 1.0).unwrap();
        scenario.sources.add(&[1], PowerLaw::standard(-1.0, 2.0)).unwrap();

        let config = SolverConfiguration::default().with_picard(1e-14, 1);
        let result = solve_scenario(&scenario, &config).unwrap();
        assert!(!result.converged);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.get_metadata("converged").map(String::as_str), Some("false"));
    }

    #[test]
    fn test_budget_exhausted_strict() {
        let (topology, conductances) = setup(2);
        let mut scenario = Scenario::new(&topology, &conductances);
        scenario.boundary_conditions.set_dirichlet(&[0], 1.0).unwrap();
        scenario.sources.add(&[1], PowerLaw::standard(-1.0, 2.0)).unwrap();

        let config = SolverConfiguration::default().with_picard(1e-14, 2).strict();
        match solve_scenario(&scenario, &config) {
            Err(TransportError::Convergence { iterations, solution, .. }) => {
                assert_eq!(iterations, 2);
                assert_eq!(solution.len(), 2);
            }
            other => panic!("expected convergence error, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_preserves_order() {
        let (topology, conductances) = setup(3);
        let scenarios: Vec<Scenario> = (0..8)
            .map(|k| {
                let mut scenario = Scenario::new(&topology, &conductances);
                scenario.boundary_conditions.set_dirichlet(&[0], k as f64).unwrap();
                scenario.boundary_conditions.set_dirichlet(&[2], 0.0).unwrap();
                scenario
            })
            .collect();

        let results = solve_batch(&scenarios, &SolverConfiguration::default());
        for (k, result) in results.into_iter().enumerate() {
            assert_relative_eq!(result.unwrap().solution[1], k as f64 / 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_batch_isolates_failures() {
        let (topology, conductances) = setup(3);
        let mut good = Scenario::new(&topology, &conductances);
        good.boundary_conditions.set_dirichlet(&[0], 1.0).unwrap();
        let mut bad = Scenario::new(&topology, &conductances);
        bad.sources.add(&[1], ConstantRate::new(1.0)).unwrap();

        let results = solve_batch(&[good, bad], &SolverConfiguration::default());
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(TransportError::Underconstrained { .. })));
    }
}
