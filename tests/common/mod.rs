//! Common utilities for integration tests

#![allow(dead_code)]

pub mod mock_models;
pub mod test_helpers;

// Re-export commonly used items
pub use mock_models::{ConstantConductance, FieldConductance, QuadraticSink, UnflaggedLinearSink};
pub use test_helpers::{
    assert_vectors_close,
    chain_scenario,
    diffusion_properties,
    relative_error,
    square_topology,
};
