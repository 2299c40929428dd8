//! Transport physics traits and types
//!
//! This module defines the core API for transport physics:
//! - `TransportKind`: type-safe identifier of the transported quantity
//! - `ConductanceModel`: trait mapping conduit properties to a conductance
//! - `SourceModel`: trait for node sinks/sources, linearized per iteration
//! - `Linearization`: tangent `a1·x + a0` of a source term

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, PropertyError};
use crate::models::{HagenPoiseuille, SeriesResistors};
use crate::network::{PropertyTable, Topology};

// =================================================================================================
// Transport kinds (Type-safe Identifiers)
// =================================================================================================

/// Transport phenomenon solved on the network
///
/// The kind only names the unknown field and selects a default conductance
/// model; the solver itself is the same for all of them.
///
/// # Example
/// ```
/// use pnm_rs::physics::TransportKind;
///
/// assert_eq!(TransportKind::StokesFlow.quantity(), "pressure");
/// assert!(TransportKind::Custom("species").default_model().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportKind {
    /// Fickian diffusion, unknown is concentration (mol/m³)
    Diffusion,

    /// Viscous (Stokes) flow, unknown is pressure (Pa)
    StokesFlow,

    /// Heat conduction, unknown is temperature (K)
    Thermal,

    /// Ohmic conduction, unknown is voltage (V)
    Electrical,

    /// Custom transport (no default model)
    #[serde(skip)]
    Custom(&'static str),
}

impl TransportKind {
    /// Name of the unknown field
    pub fn quantity(&self) -> &'static str {
        match self {
            TransportKind::Diffusion => "concentration",
            TransportKind::StokesFlow => "pressure",
            TransportKind::Thermal => "temperature",
            TransportKind::Electrical => "voltage",
            TransportKind::Custom(name) => *name,
        }
    }

    /// Name of the macroscopic coefficient derived from a solve
    pub fn coefficient(&self) -> &'static str {
        match self {
            TransportKind::Diffusion => "effective diffusivity",
            TransportKind::StokesFlow => "effective hydraulic conductance",
            TransportKind::Thermal => "effective thermal conductivity",
            TransportKind::Electrical => "effective electrical conductivity",
            TransportKind::Custom(_) => "effective coefficient",
        }
    }

    /// Built-in conductance model for this kind
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::NoDefaultModel`] for [`TransportKind::Custom`].
    pub fn default_model(&self) -> Result<Box<dyn ConductanceModel>, ConfigurationError> {
        match self {
            TransportKind::Diffusion => Ok(Box::new(SeriesResistors::diffusive())),
            TransportKind::StokesFlow => Ok(Box::new(HagenPoiseuille::new())),
            TransportKind::Thermal => Ok(Box::new(SeriesResistors::thermal())),
            TransportKind::Electrical => Ok(Box::new(SeriesResistors::electrical())),
            TransportKind::Custom(name) => Err(ConfigurationError::NoDefaultModel { kind: name.to_string() }),
        }
    }
}

// =================================================================================================
// Conductance Model Trait
// =================================================================================================

/// Trait for conduit conductance models
///
/// # Responsibility
/// Maps the geometric and phase properties of one conduit to a scalar
/// conductance `g ≥ 0`. Does NOT assemble anything (that's the Assembler's job).
///
/// # Contract
/// - pure: the same inputs always give the same value
/// - a missing input is reported as a [`PropertyError`] naming the conduit and
///   the field, never silently replaced
/// - numeric degeneracy (zero lengths, zero areas) is resolved inside the
///   model and yields a finite value
pub trait ConductanceModel: Send + Sync {
    /// Conductance of one conduit
    fn conductance(
        &self,
        conduit: usize,
        topology: &Topology,
        properties: &PropertyTable,
    ) -> Result<f64, PropertyError>;

    /// Name of the model (used to display and logging)
    fn name(&self) -> &str;

    /// Description of the model (option)
    fn description(&self) -> Option<&str> {
        None
    }
}

// =================================================================================================
// Source Model Trait
// =================================================================================================

/// Tangent linearization of a source term: `rate(x) ≈ a1·x + a0`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Linearization {
    /// Constant part
    pub a0: f64,
    /// Slope
    pub a1: f64,
}

impl Linearization {
    pub fn new(a0: f64, a1: f64) -> Self {
        Self { a0, a1 }
    }

    /// Tangent of `rate` at `x` given its value and slope there
    ///
    /// A non-finite slope (e.g. `x^0.5` at `x = 0`) falls back to a constant
    /// source equal to the rate itself.
    pub fn tangent(x: f64, rate: f64, slope: f64) -> Self {
        if slope.is_finite() {
            Self { a0: rate - slope * x, a1: slope }
        } else {
            Self { a0: rate, a1: 0.0 }
        }
    }

    /// Value of the linear approximation at `x`
    pub fn evaluate(&self, x: f64) -> f64 {
        self.a1 * x + self.a0
    }
}

impl std::ops::Add for Linearization {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self { a0: self.a0 + rhs.a0, a1: self.a1 + rhs.a1 }
    }
}

impl std::ops::AddAssign for Linearization {
    fn add_assign(&mut self, rhs: Self) {
        self.a0 += rhs.a0;
        self.a1 += rhs.a1;
    }
}

/// Trait for node source/sink terms
///
/// Positive rates inject into the node, negative rates remove from it.
/// Nonlinear models are handled by the Picard loop, which calls
/// [`linearize`](SourceModel::linearize) at the latest iterate.
pub trait SourceModel: Send + Sync {
    /// Rate produced at a node whose unknown equals `x`
    fn rate(&self, x: f64) -> f64;

    /// Derivative of the rate with respect to `x`
    fn slope(&self, x: f64) -> f64;

    /// Tangent linearization at `x`
    fn linearize(&self, x: f64) -> Linearization {
        Linearization::tangent(x, self.rate(x), self.slope(x))
    }

    /// Whether the rate is affine in `x` (single Picard pass suffices)
    fn is_linear(&self) -> bool {
        false
    }

    /// Name of the model (used to display and logging)
    fn name(&self) -> &str;
}

// =================================================================================================
// Tests
// =================================================================================================
