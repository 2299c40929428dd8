//! Conduit conductance models
//!
//! A conduit is three resistors in series: half of pore 1, the throat body and
//! half of pore 2. Each segment `i` has a conductance
//!
//! ```text
//! g_i = SF_i · c_i / L_i
//! ```
//!
//! where `c_i` is the segment transport coefficient (e.g. `D·A` for
//! diffusion, `π·d⁴/(128·μ)` for viscous flow), `L_i` its length and `SF_i` an
//! optional shape factor. The conduit conductance is
//!
//! ```text
//! g = ( 1/g_pore1 + 1/g_throat + 1/g_pore2 )⁻¹
//! ```
//!
//! # Degenerate segments
//!
//! - `L_i = 0`: the segment has no resistance and drops out of the sum
//! - `c_i = 0` or `SF_i = 0` with `L_i > 0`: the segment blocks, `g = 0`
//! - all three lengths zero: no finite conductance exists; the conduit is
//!   treated as an open circuit (`g = 0`) and a warning is logged
//!
//! # Example
//!
//! ```rust
//! use pnm_rs::models::{series_conductance, ConduitSegment};
//!
//! let g = series_conductance(&[
//!     ConduitSegment::new(2.0, 1.0),
//!     ConduitSegment::new(5.0, 0.0),
//!     ConduitSegment::new(3.0, 1.0),
//! ]);
//! assert!((g - 1.2).abs() < 1e-12);
//! ```

use std::f64::consts::PI;

use log::warn;

use crate::error::PropertyError;
use crate::network::{PoreProperty, PropertyTable, Segment, ThroatProperty, Topology};
use crate::physics::ConductanceModel;

// =================================================================================================
// Series combination
// =================================================================================================

/// One resistor of a conduit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConduitSegment {
    /// Transport coefficient `c` (conductance per unit length)
    pub coefficient: f64,
    /// Segment length
    pub length: f64,
    /// Shape factor
    pub shape_factor: f64,
}

impl ConduitSegment {
    /// Segment with unit shape factor
    pub fn new(coefficient: f64, length: f64) -> Self {
        Self { coefficient, length, shape_factor: 1.0 }
    }

    pub fn with_shape_factor(mut self, shape_factor: f64) -> Self {
        self.shape_factor = shape_factor;
        self
    }

    /// Resistance `L / (SF·c)`
    ///
    /// Zero for a zero-length segment, infinite for a blocked one.
    pub fn resistance(&self) -> f64 {
        if self.length == 0.0 {
            return 0.0;
        }
        if self.coefficient <= 0.0 || self.shape_factor <= 0.0 {
            return f64::INFINITY;
        }
        self.length / (self.coefficient * self.shape_factor)
    }
}

/// Series conductance of a set of segments
///
/// Returns `f64::INFINITY` when every segment has zero resistance; callers
/// decide how to treat that case.
pub fn series_conductance(segments: &[ConduitSegment]) -> f64 {
    let resistance: f64 = segments.iter().map(ConduitSegment::resistance).sum();
    if resistance == 0.0 {
        f64::INFINITY
    } else if resistance.is_infinite() {
        0.0
    } else {
        1.0 / resistance
    }
}

/// Replace a non-finite series conductance by an open circuit
fn open_if_unbounded(model: &str, conduit: usize, g: f64) -> f64 {
    if g.is_finite() {
        g
    } else {
        warn!("{}: conduit {} has zero length in every segment, treating as open circuit", model, conduit);
        0.0
    }
}

// =================================================================================================
// Property lookup
// =================================================================================================

/// Typed accessors raising [`PropertyError`] for one conduit
struct ConduitInputs<'a> {
    conduit: usize,
    pores: (usize, usize),
    properties: &'a PropertyTable,
}

impl<'a> ConduitInputs<'a> {
    fn new(conduit: usize, topology: &Topology, properties: &'a PropertyTable) -> Self {
        Self {
            conduit,
            pores: topology.conduit_endpoints(conduit),
            properties,
        }
    }

    fn pore(&self, property: PoreProperty, pore: usize) -> Result<f64, PropertyError> {
        self.properties
            .pore(property, pore)
            .ok_or(PropertyError::MissingPore { conduit: self.conduit, pore, property })
    }

    fn throat(&self, property: ThroatProperty) -> Result<f64, PropertyError> {
        self.properties
            .throat(property, self.conduit)
            .ok_or(PropertyError::MissingThroat { conduit: self.conduit, property })
    }

    /// Per-segment value of a field that exists on pores and on throats
    fn segment_value(&self, segment: Segment, pore: PoreProperty, throat: ThroatProperty) -> Result<f64, PropertyError> {
        match segment {
            Segment::Pore1 => self.pore(pore, self.pores.0),
            Segment::Throat => self.throat(throat),
            Segment::Pore2 => self.pore(pore, self.pores.1),
        }
    }

    fn length(&self, segment: Segment) -> Result<f64, PropertyError> {
        self.throat(ThroatProperty::ConduitLength(segment))
    }

    /// Shape factor, `1` when the field is not registered
    ///
    /// A registered field with an unset entry is a missing property.
    fn shape_factor(&self, segment: Segment) -> Result<f64, PropertyError> {
        let property = ThroatProperty::ShapeFactor(segment);
        if !self.properties.has_throat(property) {
            return Ok(1.0);
        }
        self.throat(property)
    }
}

// =================================================================================================
// Series resistors
// =================================================================================================

/// Generic series-resistor conductance `c_i = property_i · area_i`
///
/// Covers diffusive (`D·A/L`), thermal (`k·A/L`) and electrical (`σ·A/L`)
/// conductance, or any other pore/throat field pair.
///
/// Required inputs: `pore.area`, `throat.area`, the chosen transport field on
/// pores and throats, and the three `throat.conduit_lengths.*`.
#[derive(Debug, Clone)]
pub struct SeriesResistors {
    name: String,
    pore_property: PoreProperty,
    throat_property: ThroatProperty,
}

impl SeriesResistors {
    /// Series resistors for an arbitrary transport field
    pub fn new(name: impl Into<String>, pore_property: PoreProperty, throat_property: ThroatProperty) -> Self {
        Self {
            name: name.into(),
            pore_property,
            throat_property,
        }
    }

    /// Diffusive conductance from the phase diffusivity
    pub fn diffusive() -> Self {
        Self::new("diffusive_conductance", PoreProperty::Diffusivity, ThroatProperty::Diffusivity)
    }

    /// Thermal conductance from the phase thermal conductivity
    pub fn thermal() -> Self {
        Self::new(
            "thermal_conductance",
            PoreProperty::ThermalConductivity,
            ThroatProperty::ThermalConductivity,
        )
    }

    /// Electrical conductance from the phase electrical conductivity
    pub fn electrical() -> Self {
        Self::new(
            "electrical_conductance",
            PoreProperty::ElectricalConductivity,
            ThroatProperty::ElectricalConductivity,
        )
    }
}

impl ConductanceModel for SeriesResistors {
    fn conductance(&self, conduit: usize, topology: &Topology, properties: &PropertyTable) -> Result<f64, PropertyError> {
        let inputs = ConduitInputs::new(conduit, topology, properties);

        let mut segments = [ConduitSegment::new(0.0, 0.0); 3];
        for (slot, segment) in segments.iter_mut().zip(Segment::ALL) {
            let area = inputs.segment_value(segment, PoreProperty::Area, ThroatProperty::Area)?;
            let transport = inputs.segment_value(segment, self.pore_property, self.throat_property)?;
            *slot = ConduitSegment::new(transport * area, inputs.length(segment)?)
                .with_shape_factor(inputs.shape_factor(segment)?);
        }

        Ok(open_if_unbounded(&self.name, conduit, series_conductance(&segments)))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        Some("series combination of pore-throat-pore resistances, g_i = property_i·area_i/length_i")
    }
}

// =================================================================================================
// Hagen-Poiseuille
// =================================================================================================

/// Hydraulic conductance of cylindrical segments
///
/// `c_i = π·d_i⁴ / (128·μ_i)`, i.e. Hagen-Poiseuille flow in each segment.
///
/// Required inputs: `pore.diameter`, `throat.diameter`, `pore.viscosity`,
/// `throat.viscosity` and the three `throat.conduit_lengths.*`.
#[derive(Debug, Clone, Default)]
pub struct HagenPoiseuille;

impl HagenPoiseuille {
    pub fn new() -> Self {
        Self
    }

    /// Per-length conductance of a cylinder of diameter `d` and viscosity `μ`
    ///
    /// A zero diameter blocks the segment. Otherwise a zero viscosity gives an
    /// infinite coefficient, so the segment adds no resistance.
    pub fn coefficient(diameter: f64, viscosity: f64) -> f64 {
        if diameter <= 0.0 {
            return 0.0;
        }
        if viscosity <= 0.0 {
            return f64::INFINITY;
        }
        PI * diameter.powi(4) / (128.0 * viscosity)
    }
}

impl ConductanceModel for HagenPoiseuille {
    fn conductance(&self, conduit: usize, topology: &Topology, properties: &PropertyTable) -> Result<f64, PropertyError> {
        let inputs = ConduitInputs::new(conduit, topology, properties);

        let mut segments = [ConduitSegment::new(0.0, 0.0); 3];
        for (slot, segment) in segments.iter_mut().zip(Segment::ALL) {
            let diameter = inputs.segment_value(segment, PoreProperty::Diameter, ThroatProperty::Diameter)?;
            let viscosity = inputs.segment_value(segment, PoreProperty::Viscosity, ThroatProperty::Viscosity)?;
            *slot = ConduitSegment::new(Self::coefficient(diameter, viscosity), inputs.length(segment)?)
                .with_shape_factor(inputs.shape_factor(segment)?);
        }

        Ok(open_if_unbounded(self.name(), conduit, series_conductance(&segments)))
    }

    fn name(&self) -> &str {
        "hagen_poiseuille"
    }

    fn description(&self) -> Option<&str> {
        Some("viscous flow through cylindrical pore-throat-pore segments")
    }
}

// =================================================================================================
// Tests
// =================================================================================================
