//! Linear solvers, Picard iteration, batch solving and configuration files

use approx::assert_relative_eq;
use nalgebra::DVector;

use pnm_rs::prelude::*;
use pnm_rs::solver::{Assembler, ConjugateGradientSolver, DirectSolver, LinearSolver};

mod common;
use common::{assert_vectors_close, chain_scenario, QuadraticSink, UnflaggedLinearSink};

fn heterogeneous_lattice(shape: [usize; 3]) -> (Cubic, Topology, Conductances) {
    let lattice = Cubic::new(shape, 1.0).unwrap();
    let topology = lattice.topology();
    let values: Vec<f64> = (0..topology.conduit_count()).map(|c| 1.0 + ((c * 31) % 11) as f64 / 3.0).collect();
    let conductances = Conductances::from_values(&topology, values).unwrap();
    (lattice, topology, conductances)
}

// =================================================================================================
// Linear solvers
// =================================================================================================

#[test]
fn test_direct_and_cg_agree_on_cubic_lattice() {
    let (lattice, topology, conductances) = heterogeneous_lattice([8, 6, 5]);
    let mut scenario = Scenario::new(&topology, &conductances);
    scenario.boundary_conditions.set_dirichlet(&lattice.face(Face::YMin), 2.0).unwrap();
    scenario.boundary_conditions.set_dirichlet(&lattice.face(Face::YMax), -1.0).unwrap();
    scenario.boundary_conditions.set_neumann(&[lattice.index(4, 3, 2)], 0.5).unwrap();

    let direct = solve_scenario(&scenario, &SolverConfiguration::direct()).unwrap();
    let cg = solve_scenario(&scenario, &SolverConfiguration::conjugate_gradient(1e-13, 5_000)).unwrap();

    assert_eq!(direct.get_metadata("solver").map(String::as_str), Some("Direct LDL"));
    assert_eq!(cg.get_metadata("solver").map(String::as_str), Some("Conjugate Gradient"));
    assert_vectors_close(&direct.solution, &cg.solution, 1e-9, "direct vs CG");
}

#[test]
fn test_linear_solvers_on_assembled_system() {
    let (lattice, topology, conductances) = heterogeneous_lattice([5, 5, 5]);
    let mut scenario = Scenario::new(&topology, &conductances);
    scenario.boundary_conditions.set_dirichlet(&lattice.face(Face::ZMin), 1.0).unwrap();
    scenario.boundary_conditions.set_dirichlet(&lattice.face(Face::ZMax), 0.0).unwrap();

    let system = Assembler::assemble_base(&scenario).unwrap();
    assert_eq!(system.size(), topology.node_count());

    for solver in [
        Box::new(DirectSolver::new()) as Box<dyn LinearSolver>,
        Box::new(ConjugateGradientSolver::new(1e-12, 1_000)),
    ] {
        let x = solver.solve(&system, None).unwrap();
        assert!(system.residual(&x) < 1e-9, "{} residual {}", solver.name(), system.residual(&x));
    }
}

#[test]
fn test_cg_iteration_budget_reported() {
    let (lattice, topology, conductances) = heterogeneous_lattice([10, 10, 4]);
    let mut scenario = Scenario::new(&topology, &conductances);
    scenario.boundary_conditions.set_dirichlet(&lattice.face(Face::XMin), 1.0).unwrap();
    scenario.boundary_conditions.set_dirichlet(&lattice.face(Face::XMax), 0.0).unwrap();

    let config = SolverConfiguration::conjugate_gradient(1e-14, 2);
    match solve_scenario(&scenario, &config) {
        Err(TransportError::IterativeSolver { method, iterations, .. }) => {
            assert_eq!(method, "Conjugate Gradient");
            assert_eq!(iterations, 2);
        }
        other => panic!("expected iterative solver error, got {:?}", other.map(|r| r.iterations)),
    }
}

// =================================================================================================
// Sources and Picard iteration
// =================================================================================================

/// Chain with both ends fixed and a first-order sink `-k·x` on interior nodes
///
/// The discrete solution is `x_i = (A·sinh(θ(n-1-i)) + B·sinh(θ·i)) / sinh(θ(n-1))`
/// with `cosh θ = 1 + k/(2g)`.
fn analytical_sink_profile(n: usize, g: f64, k: f64, inlet: f64, outlet: f64) -> DVector<f64> {
    let theta = (1.0 + k / (2.0 * g)).acosh();
    let span = (theta * (n - 1) as f64).sinh();
    DVector::from_iterator(
        n,
        (0..n).map(|i| {
            (inlet * (theta * (n - 1 - i) as f64).sinh() + outlet * (theta * i as f64).sinh()) / span
        }),
    )
}

#[test]
fn test_linear_sink_single_solve() {
    let n = 11;
    let topology = Topology::chain(n, 1.0);
    let conductances = Conductances::uniform(&topology, 2.0).unwrap();
    let mut scenario = chain_scenario(&topology, &conductances, 1.0, 0.2);
    let interior: Vec<usize> = (1..n - 1).collect();
    scenario.sources.add(&interior, LinearKinetics::new(-0.5, 0.0)).unwrap();

    let result = solve_scenario(&scenario, &SolverConfiguration::default()).unwrap();
    assert_eq!(result.iterations, 1);
    assert_vectors_close(
        &result.solution,
        &analytical_sink_profile(n, 2.0, 0.5, 1.0, 0.2),
        1e-12,
        "linear sink",
    );
}

#[test]
fn test_picard_converges_to_linear_sink_solution() {
    let n = 11;
    let topology = Topology::chain(n, 1.0);
    let conductances = Conductances::uniform(&topology, 2.0).unwrap();
    let mut scenario = chain_scenario(&topology, &conductances, 1.0, 0.2);
    let interior: Vec<usize> = (1..n - 1).collect();
    scenario.sources.add(&interior, UnflaggedLinearSink::new(0.5)).unwrap();

    let config = SolverConfiguration::default().with_picard(1e-10, 50);
    let result = solve_scenario(&scenario, &config).unwrap();

    assert!(result.converged);
    // exact after the first solve, confirmed by the second
    assert_eq!(result.iterations, 2);
    assert_vectors_close(
        &result.solution,
        &analytical_sink_profile(n, 2.0, 0.5, 1.0, 0.2),
        1e-12,
        "Picard linear sink",
    );
}

#[test]
fn test_picard_relaxation_still_converges() {
    let topology = Topology::chain(6, 1.0);
    let conductances = Conductances::uniform(&topology, 1.0).unwrap();
    let mut scenario = chain_scenario(&topology, &conductances, 1.0, 0.0);
    scenario.sources.add(&[2, 3], QuadraticSink::new(4.0)).unwrap();

    let plain = solve_scenario(&scenario, &SolverConfiguration::default().with_picard(1e-11, 100)).unwrap();
    let relaxed = solve_scenario(
        &scenario,
        &SolverConfiguration::default().with_picard(1e-11, 500).with_relaxation(0.5),
    )
    .unwrap();

    assert!(plain.converged && relaxed.converged);
    assert!(relaxed.iterations > plain.iterations);
    assert_vectors_close(&plain.solution, &relaxed.solution, 1e-9, "relaxed Picard");

    // balance at a source node: net outflow equals the source rate
    let rates = pnm_rs::postprocess::node_rates(&topology, &conductances, &plain.solution);
    let x2 = plain.solution[2];
    assert_relative_eq!(rates[2], -4.0 * x2 * x2, epsilon = 1e-9);
}

#[test]
fn test_strict_picard_raises_convergence_error() {
    let topology = Topology::chain(4, 1.0);
    let conductances = Conductances::uniform(&topology, 1.0).unwrap();
    let mut scenario = chain_scenario(&topology, &conductances, 1.0, 0.0);
    scenario.sources.add(&[1, 2], PowerLaw::standard(-3.0, 2.0)).unwrap();

    let config = SolverConfiguration::default().with_picard(1e-12, 1).strict();
    match solve_scenario(&scenario, &config) {
        Err(TransportError::Convergence { iterations, residual, solution }) => {
            assert_eq!(iterations, 1);
            assert!(residual > 1e-12);
            assert_eq!(solution.len(), 4);
        }
        other => panic!("expected convergence error, got {:?}", other.map(|r| r.converged)),
    }

    // without strict mode the last iterate is returned, flagged as not converged
    let lenient = SolverConfiguration::default().with_picard(1e-12, 1);
    let result = solve_scenario(&scenario, &lenient).unwrap();
    assert!(!result.converged);
    assert!(result.clone().into_converged().is_err());
}

// =================================================================================================
// Batch solving
// =================================================================================================

#[test]
fn test_batch_results_in_scenario_order() {
    let topology = Topology::chain(5, 1.0);
    let conductances = Conductances::uniform(&topology, 1.0).unwrap();

    let scenarios: Vec<Scenario<'_>> = (0..16)
        .map(|i| chain_scenario(&topology, &conductances, i as f64, 0.0))
        .collect();
    let results = solve_batch(&scenarios, &SolverConfiguration::default());

    assert_eq!(results.len(), scenarios.len());
    for (i, result) in results.iter().enumerate() {
        let solution = &result.as_ref().unwrap().solution;
        assert_relative_eq!(solution[2], i as f64 / 2.0, epsilon = 1e-12);
    }
}

// =================================================================================================
// Configuration files
// =================================================================================================

#[test]
fn test_configuration_json_round_trip() {
    let config = SolverConfiguration::conjugate_gradient(1e-9, 250)
        .with_picard(1e-7, 40)
        .with_relaxation(0.7)
        .strict()
        .with_missing_property_policy(MissingPropertyPolicy::Abort);

    let json = serde_json::to_string_pretty(&config).unwrap();
    let restored: SolverConfiguration = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, config);
}

#[test]
fn test_configuration_from_partial_json() {
    let json = r#"{
        "solver_type": { "method": "conjugate_gradient", "tolerance": 1e-8, "max_iterations": 300 },
        "picard": { "relaxation": 0.5 }
    }"#;
    let config: SolverConfiguration = serde_json::from_str(json).unwrap();

    assert_eq!(config.solver_type, SolverType::ConjugateGradient { tolerance: 1e-8, max_iterations: 300 });
    assert_eq!(config.picard.relaxation, 0.5);
    assert_eq!(config.picard.max_iterations, PicardSettings::default().max_iterations);
    assert_eq!(config.missing_property, MissingPropertyPolicy::OpenCircuit);
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_configuration_rejected_before_solve() {
    let topology = Topology::chain(3, 1.0);
    let conductances = Conductances::uniform(&topology, 1.0).unwrap();
    let scenario = chain_scenario(&topology, &conductances, 1.0, 0.0);

    let config = SolverConfiguration::conjugate_gradient(-1.0, 10);
    assert!(matches!(
        solve_scenario(&scenario, &config),
        Err(TransportError::Configuration(ConfigurationError::InvalidSolverParameter(_)))
    ));
}
