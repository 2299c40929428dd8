//! Conductance models, missing-property handling and result export

use std::fs;

use approx::assert_relative_eq;
use tempfile::TempDir;

use pnm_rs::output::{CsvConfig, CsvExporter, CsvMetadata, Exporter};
use pnm_rs::prelude::*;

mod common;
use common::{diffusion_properties, square_topology, ConstantConductance, FieldConductance};

// =================================================================================================
// Missing properties
// =================================================================================================

fn square_with_missing_diffusivity() -> (Topology, PropertyTable) {
    let topology = square_topology();
    let mut properties = diffusion_properties(&topology);
    properties
        .set_throat_partial(ThroatProperty::Diffusivity, vec![Some(1.0), Some(1.0), None, Some(1.0)])
        .unwrap();
    (topology, properties)
}

#[test]
fn test_missing_property_open_circuit() {
    let (topology, properties) = square_with_missing_diffusivity();

    let mut algorithm = TransportAlgorithm::with_default_model(
        TransportKind::Diffusion,
        &topology,
        &properties,
        SolverConfiguration::default(),
    )
    .unwrap();
    assert_eq!(algorithm.conductances().open_circuit(), &[2]);
    assert_eq!(algorithm.conductances().get(2), 0.0);

    algorithm.set_dirichlet(&[0], 1.0).unwrap();
    algorithm.set_dirichlet(&[3], 0.0).unwrap();
    algorithm.run().unwrap();

    // only the 0 -- 1 -- 3 path carries transport
    assert_relative_eq!(algorithm.rate(&[0]).unwrap(), 0.5, epsilon = 1e-12);
    let rates = algorithm.conduit_rates().unwrap();
    assert_eq!(rates[2], 0.0);
    assert_relative_eq!(rates[3], 0.0, epsilon = 1e-12);
}

#[test]
fn test_missing_property_abort() {
    let (topology, properties) = square_with_missing_diffusivity();
    let config = SolverConfiguration::default().with_missing_property_policy(MissingPropertyPolicy::Abort);

    let outcome = TransportAlgorithm::with_default_model(TransportKind::Diffusion, &topology, &properties, config);
    match outcome {
        Err(TransportError::Property(error)) => {
            assert_eq!(error.conduit(), 2);
            assert_eq!(
                error,
                PropertyError::MissingThroat { conduit: 2, property: ThroatProperty::Diffusivity }
            );
        }
        Err(other) => panic!("expected property error, got {}", other),
        Ok(_) => panic!("expected property error"),
    }
}

#[test]
fn test_unset_shape_factor_opens_conduit() {
    let topology = square_topology();
    let mut properties = diffusion_properties(&topology);
    properties
        .set_throat_partial(
            ThroatProperty::ShapeFactor(Segment::Throat),
            vec![Some(1.0), None, Some(1.0), Some(1.0)],
        )
        .unwrap();

    let mut algorithm = TransportAlgorithm::with_default_model(
        TransportKind::Diffusion,
        &topology,
        &properties,
        SolverConfiguration::default(),
    )
    .unwrap();
    assert_eq!(algorithm.conductances().open_circuit(), &[1]);

    algorithm.set_dirichlet(&[0], 1.0).unwrap();
    algorithm.set_dirichlet(&[3], 0.0).unwrap();
    algorithm.run().unwrap();

    // only the 0 -- 2 -- 3 path carries transport
    assert_relative_eq!(algorithm.rate(&[0]).unwrap(), 0.5, epsilon = 1e-12);

    let config = SolverConfiguration::default().with_missing_property_policy(MissingPropertyPolicy::Abort);
    assert!(matches!(
        TransportAlgorithm::with_default_model(TransportKind::Diffusion, &topology, &properties, config),
        Err(TransportError::Property(PropertyError::MissingThroat {
            conduit: 1,
            property: ThroatProperty::ShapeFactor(Segment::Throat)
        }))
    ));
}

#[test]
fn test_missing_pore_property_names_pore() {
    let topology = square_topology();
    let mut properties = diffusion_properties(&topology);
    properties.remove_pore(PoreProperty::Area);

    let config = SolverConfiguration::default().with_missing_property_policy(MissingPropertyPolicy::Abort);
    let outcome = TransportAlgorithm::with_default_model(TransportKind::Diffusion, &topology, &properties, config);
    assert!(matches!(
        outcome,
        Err(TransportError::Property(PropertyError::MissingPore { conduit: 0, pore: 0, property: PoreProperty::Area }))
    ));
}

#[test]
fn test_custom_model_from_field() {
    let topology = Topology::chain(4, 1.0);
    let mut properties = PropertyTable::new(&topology);
    properties.set_throat(FieldConductance::FIELD, vec![1.0, 2.0, 4.0]).unwrap();

    let mut algorithm = TransportAlgorithm::with_model(
        TransportKind::Custom("tracer"),
        &topology,
        &properties,
        &FieldConductance,
        SolverConfiguration::default(),
    )
    .unwrap();
    algorithm.set_dirichlet(&[0], 7.0).unwrap();
    algorithm.set_dirichlet(&[3], 0.0).unwrap();
    algorithm.run().unwrap();

    // series resistance 1 + 1/2 + 1/4
    assert_relative_eq!(algorithm.rate(&[0]).unwrap(), 4.0, epsilon = 1e-12);
}

#[test]
fn test_custom_kind_has_no_default_model() {
    let topology = Topology::chain(3, 1.0);
    let properties = PropertyTable::new(&topology);
    assert!(matches!(
        TransportAlgorithm::with_default_model(
            TransportKind::Custom("tracer"),
            &topology,
            &properties,
            SolverConfiguration::default(),
        ),
        Err(TransportError::Configuration(ConfigurationError::NoDefaultModel { .. }))
    ));
}

#[test]
fn test_negative_model_output_rejected() {
    let topology = Topology::chain(3, 1.0);
    let properties = PropertyTable::new(&topology);

    let outcome = TransportAlgorithm::with_model(
        TransportKind::Electrical,
        &topology,
        &properties,
        &ConstantConductance::new(-1.0),
        SolverConfiguration::default(),
    );
    assert!(matches!(
        outcome,
        Err(TransportError::Configuration(ConfigurationError::InvalidValue { .. }))
    ));
}

// =================================================================================================
// Default models
// =================================================================================================

#[test]
fn test_thermal_and_electrical_defaults() {
    let topology = Topology::chain(2, 1.0);
    let mut properties = PropertyTable::new(&topology);
    properties.fill_pore(PoreProperty::Area, 2.0).unwrap();
    properties.fill_throat(ThroatProperty::Area, 2.0).unwrap();
    properties.fill_pore(PoreProperty::ThermalConductivity, 0.5).unwrap();
    properties.fill_throat(ThroatProperty::ThermalConductivity, 0.5).unwrap();
    properties.fill_pore(PoreProperty::ElectricalConductivity, 3.0).unwrap();
    properties.fill_throat(ThroatProperty::ElectricalConductivity, 3.0).unwrap();
    for segment in Segment::ALL {
        properties.fill_throat(ThroatProperty::ConduitLength(segment), 1.0).unwrap();
    }

    let thermal = TransportAlgorithm::with_default_model(
        TransportKind::Thermal,
        &topology,
        &properties,
        SolverConfiguration::default(),
    )
    .unwrap();
    // three equal segments k·A/L = 1
    assert_relative_eq!(thermal.conductances().get(0), 1.0 / 3.0, epsilon = 1e-12);

    let electrical = TransportAlgorithm::with_default_model(
        TransportKind::Electrical,
        &topology,
        &properties,
        SolverConfiguration::default(),
    )
    .unwrap();
    assert_relative_eq!(electrical.conductances().get(0), 2.0, epsilon = 1e-12);
}

#[test]
fn test_shape_factors_scale_segments() {
    let topology = Topology::chain(2, 1.0);
    let mut properties = diffusion_properties(&topology);
    properties.fill_throat(ThroatProperty::ShapeFactor(Segment::Throat), 0.25).unwrap();

    let model = SeriesResistors::diffusive();
    let g = model.conductance(0, &topology, &properties).unwrap();
    assert_relative_eq!(g, 0.25, epsilon = 1e-12);
}

// =================================================================================================
// Export
// =================================================================================================

#[test]
fn test_export_solved_lattice() {
    let lattice = Cubic::new([3, 2, 2], 1e-3).unwrap();
    let topology = lattice.topology();
    let conductances = Conductances::uniform(&topology, 1e-9).unwrap();

    let mut algorithm = TransportAlgorithm::new(TransportKind::Diffusion, &topology, conductances).unwrap();
    let inlet = lattice.face(Face::XMin);
    let outlet = lattice.face(Face::XMax);
    algorithm.set_dirichlet(&inlet, 1.0).unwrap();
    algorithm.set_dirichlet(&outlet, 0.0).unwrap();
    let result = algorithm.run().unwrap();

    let dir = TempDir::new().unwrap();
    let nodes_path = dir.path().join("pores.csv");
    let conduits_path = dir.path().join("throats.csv");

    let metadata = CsvMetadata::from_result(algorithm.kind().quantity(), &result);
    let exporter = CsvExporter::new(CsvConfig::high_precision().with_metadata(metadata));
    let scenario = algorithm.scenario();
    exporter.export_nodes(&scenario, &result, nodes_path.to_str().unwrap()).unwrap();
    exporter.export_conduits(&scenario, &result, conduits_path.to_str().unwrap()).unwrap();

    let nodes = fs::read_to_string(&nodes_path).unwrap();
    assert!(nodes.contains("# Transport: concentration"));
    let rows: Vec<&str> = nodes.lines().filter(|line| !line.starts_with('#')).collect();
    assert_eq!(rows.len(), topology.node_count() + 1);
    assert_eq!(rows[0], "pore,x,y,z,value,net_rate");

    let conduits = fs::read_to_string(&conduits_path).unwrap();
    let rows: Vec<&str> = conduits.lines().filter(|line| !line.starts_with('#')).collect();
    assert_eq!(rows.len(), topology.conduit_count() + 1);
    assert!(rows[1].starts_with("0,0,1,"));
}
