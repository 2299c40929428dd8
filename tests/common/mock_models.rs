//! Mock models for integration tests
//!
//! Simple conductance and source models with known analytical behaviour.

use pnm_rs::error::PropertyError;
use pnm_rs::network::{PropertyTable, ThroatProperty, Topology};
use pnm_rs::physics::{ConductanceModel, SourceModel};

// =================================================================================================
// Conductance models
// =================================================================================================

/// Same conductance on every conduit, read from nothing
pub struct ConstantConductance {
    value: f64,
}

impl ConstantConductance {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl ConductanceModel for ConstantConductance {
    fn conductance(&self, _conduit: usize, _topology: &Topology, _properties: &PropertyTable) -> Result<f64, PropertyError> {
        Ok(self.value)
    }

    fn name(&self) -> &str {
        "ConstantConductance"
    }
}

/// Conductance taken directly from the `throat.test_conductance` field
pub struct FieldConductance;

impl FieldConductance {
    pub const FIELD: ThroatProperty = ThroatProperty::Custom("test_conductance");
}

impl ConductanceModel for FieldConductance {
    fn conductance(&self, conduit: usize, _topology: &Topology, properties: &PropertyTable) -> Result<f64, PropertyError> {
        properties
            .throat(Self::FIELD, conduit)
            .ok_or(PropertyError::MissingThroat { conduit, property: Self::FIELD })
    }

    fn name(&self) -> &str {
        "FieldConductance"
    }
}

// =================================================================================================
// Source models
// =================================================================================================

/// First-order sink `-k·x` that does not advertise itself as linear
///
/// Forces the Picard loop on a problem with a closed-form solution.
pub struct UnflaggedLinearSink {
    k: f64,
}

impl UnflaggedLinearSink {
    pub fn new(k: f64) -> Self {
        Self { k }
    }
}

impl SourceModel for UnflaggedLinearSink {
    fn rate(&self, x: f64) -> f64 {
        -self.k * x
    }

    fn slope(&self, _x: f64) -> f64 {
        -self.k
    }

    fn name(&self) -> &str {
        "UnflaggedLinearSink"
    }
}

/// Second-order sink `-k·x²`
pub struct QuadraticSink {
    k: f64,
}

impl QuadraticSink {
    pub fn new(k: f64) -> Self {
        Self { k }
    }
}

impl SourceModel for QuadraticSink {
    fn rate(&self, x: f64) -> f64 {
        -self.k * x * x
    }

    fn slope(&self, x: f64) -> f64 {
        -2.0 * self.k * x
    }

    fn name(&self) -> &str {
        "QuadraticSink"
    }
}
