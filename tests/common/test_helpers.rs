//! Helper functions for integration tests

use nalgebra::DVector;

use pnm_rs::network::{PoreProperty, PropertyTable, Segment, ThroatProperty, Topology};
use pnm_rs::physics::Conductances;
use pnm_rs::solver::Scenario;

/// Assert that two vectors are close (within tolerance)
pub fn assert_vectors_close(actual: &DVector<f64>, expected: &DVector<f64>, tolerance: f64, message: &str) {
    assert_eq!(actual.len(), expected.len(), "{}: Dimension mismatch", message);

    for (i, (&v1, &v2)) in actual.iter().zip(expected.iter()).enumerate() {
        let diff = (v1 - v2).abs();
        assert!(
            diff < tolerance,
            "{}: Element {} differs by {} (tolerance {})",
            message, i, diff, tolerance
        );
    }
}

/// Chain scenario with `x[0] = inlet` and `x[n-1] = outlet`
pub fn chain_scenario<'a>(
    topology: &'a Topology,
    conductances: &'a Conductances,
    inlet: f64,
    outlet: f64,
) -> Scenario<'a> {
    let last = topology.node_count() - 1;
    let mut scenario = Scenario::new(topology, conductances);
    scenario.boundary_conditions.set_dirichlet(&[0], inlet).unwrap();
    scenario.boundary_conditions.set_dirichlet(&[last], outlet).unwrap();
    scenario
}

/// Square loop 0 -- 1 -- 3 -- 2 -- 0
///
/// Conduits: `[0, 1]`, `[1, 3]`, `[0, 2]`, `[2, 3]`.
pub fn square_topology() -> Topology {
    Topology::new(4, vec![[0, 1], [1, 3], [0, 2], [2, 3]]).unwrap()
}

/// Properties giving a unit diffusive conductance on every conduit
///
/// Pore segments have zero length, the throat has unit length, area and
/// diffusivity.
pub fn diffusion_properties(topology: &Topology) -> PropertyTable {
    let mut properties = PropertyTable::new(topology);
    properties.fill_pore(PoreProperty::Area, 1.0).unwrap();
    properties.fill_pore(PoreProperty::Diffusivity, 1.0).unwrap();
    properties.fill_throat(ThroatProperty::Area, 1.0).unwrap();
    properties.fill_throat(ThroatProperty::Diffusivity, 1.0).unwrap();
    properties.fill_throat(ThroatProperty::ConduitLength(Segment::Pore1), 0.0).unwrap();
    properties.fill_throat(ThroatProperty::ConduitLength(Segment::Throat), 1.0).unwrap();
    properties.fill_throat(ThroatProperty::ConduitLength(Segment::Pore2), 0.0).unwrap();
    properties
}

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}
