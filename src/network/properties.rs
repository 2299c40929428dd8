//! Per-pore and per-throat property tables
//!
//! Fields are strongly typed ([`PoreProperty`], [`ThroatProperty`]) instead of
//! string keys. Each field maps to a `Vec<Option<f64>>` sized to the topology,
//! where `None` means "unset" and is distinct from `0.0`.
//!
//! # Example
//!
//! ```rust
//! use pnm_rs::network::{PoreProperty, PropertyTable, Segment, ThroatProperty, Topology};
//!
//! let topology = Topology::chain(3, 1.0);
//! let mut properties = PropertyTable::new(&topology);
//!
//! properties.fill_pore(PoreProperty::Area, 1.0).unwrap();
//! properties.set_throat(ThroatProperty::ConduitLength(Segment::Throat), vec![0.5, 0.5]).unwrap();
//!
//! assert_eq!(properties.pore(PoreProperty::Area, 2), Some(1.0));
//! assert_eq!(properties.throat(ThroatProperty::Area, 0), None);
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::error::ConfigurationError;
use crate::network::Topology;

// =================================================================================================
// Field names
// =================================================================================================

/// Segment of a conduit: half of pore 1, the throat body, half of pore 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Half-pore on the first endpoint side
    Pore1,
    /// Throat body
    Throat,
    /// Half-pore on the second endpoint side
    Pore2,
}

impl Segment {
    /// The three segments in series order
    pub const ALL: [Segment; 3] = [Segment::Pore1, Segment::Throat, Segment::Pore2];

    fn suffix(&self) -> &'static str {
        match self {
            Segment::Pore1 => "pore1",
            Segment::Throat => "throat",
            Segment::Pore2 => "pore2",
        }
    }
}

/// Per-pore field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoreProperty {
    /// Cross-sectional area
    Area,
    /// Pore diameter
    Diameter,
    /// Molecular diffusivity of the phase
    Diffusivity,
    /// Dynamic viscosity of the phase
    Viscosity,
    /// Thermal conductivity of the phase
    ThermalConductivity,
    /// Electrical conductivity of the phase
    ElectricalConductivity,
    /// User-defined field
    Custom(&'static str),
}

/// Per-throat field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThroatProperty {
    /// Cross-sectional area
    Area,
    /// Throat diameter
    Diameter,
    /// Molecular diffusivity of the phase
    Diffusivity,
    /// Dynamic viscosity of the phase
    Viscosity,
    /// Thermal conductivity of the phase
    ThermalConductivity,
    /// Electrical conductivity of the phase
    ElectricalConductivity,
    /// Length of one conduit segment
    ConduitLength(Segment),
    /// Shape factor of one conduit segment
    ShapeFactor(Segment),
    /// User-defined field
    Custom(&'static str),
}

impl PoreProperty {
    /// Whether registered values must be non-negative
    fn is_non_negative(&self) -> bool {
        !matches!(self, PoreProperty::Custom(_))
    }
}

impl ThroatProperty {
    fn is_non_negative(&self) -> bool {
        !matches!(self, ThroatProperty::Custom(_))
    }
}

impl fmt::Display for PoreProperty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PoreProperty::Area => write!(f, "pore.area"),
            PoreProperty::Diameter => write!(f, "pore.diameter"),
            PoreProperty::Diffusivity => write!(f, "pore.diffusivity"),
            PoreProperty::Viscosity => write!(f, "pore.viscosity"),
            PoreProperty::ThermalConductivity => write!(f, "pore.thermal_conductivity"),
            PoreProperty::ElectricalConductivity => write!(f, "pore.electrical_conductivity"),
            PoreProperty::Custom(name) => write!(f, "pore.{}", name),
        }
    }
}

impl fmt::Display for ThroatProperty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ThroatProperty::Area => write!(f, "throat.area"),
            ThroatProperty::Diameter => write!(f, "throat.diameter"),
            ThroatProperty::Diffusivity => write!(f, "throat.diffusivity"),
            ThroatProperty::Viscosity => write!(f, "throat.viscosity"),
            ThroatProperty::ThermalConductivity => write!(f, "throat.thermal_conductivity"),
            ThroatProperty::ElectricalConductivity => write!(f, "throat.electrical_conductivity"),
            ThroatProperty::ConduitLength(segment) => write!(f, "throat.conduit_lengths.{}", segment.suffix()),
            ThroatProperty::ShapeFactor(segment) => write!(f, "throat.shape_factors.{}", segment.suffix()),
            ThroatProperty::Custom(name) => write!(f, "throat.{}", name),
        }
    }
}

// =================================================================================================
// Property table
// =================================================================================================

/// Strongly-typed property storage for one network and phase
#[derive(Debug, Clone)]
pub struct PropertyTable {
    node_count: usize,
    conduit_count: usize,
    pores: HashMap<PoreProperty, Vec<Option<f64>>>,
    throats: HashMap<ThroatProperty, Vec<Option<f64>>>,
}

impl PropertyTable {
    /// Create an empty table sized to a topology
    pub fn new(topology: &Topology) -> Self {
        Self::with_sizes(topology.node_count(), topology.conduit_count())
    }

    /// Create an empty table from explicit sizes
    pub fn with_sizes(node_count: usize, conduit_count: usize) -> Self {
        Self {
            node_count,
            conduit_count,
            pores: HashMap::new(),
            throats: HashMap::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn conduit_count(&self) -> usize {
        self.conduit_count
    }

    // ======================================= Pores ===============================================

    /// Register a fully populated pore field
    pub fn set_pore(&mut self, property: PoreProperty, values: Vec<f64>) -> Result<(), ConfigurationError> {
        self.set_pore_partial(property, values.into_iter().map(Some).collect())
    }

    /// Register a pore field where some entries may be unset
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::SizeMismatch`] if the length differs from the node count
    /// - [`ConfigurationError::InvalidValue`] for non-finite entries, or
    ///   negative entries of a physical (non-custom) field
    pub fn set_pore_partial(
        &mut self,
        property: PoreProperty,
        values: Vec<Option<f64>>,
    ) -> Result<(), ConfigurationError> {
        validate_field(&property.to_string(), &values, self.node_count, property.is_non_negative())?;
        self.pores.insert(property, values);
        Ok(())
    }

    /// Register a pore field with the same value everywhere
    pub fn fill_pore(&mut self, property: PoreProperty, value: f64) -> Result<(), ConfigurationError> {
        self.set_pore(property, vec![value; self.node_count])
    }

    /// Value of a pore field, `None` if the field or the entry is unset
    pub fn pore(&self, property: PoreProperty, pore: usize) -> Option<f64> {
        self.pores.get(&property).and_then(|values| values.get(pore).copied().flatten())
    }

    /// Raw entries of a pore field
    pub fn pore_values(&self, property: PoreProperty) -> Option<&[Option<f64>]> {
        self.pores.get(&property).map(Vec::as_slice)
    }

    pub fn has_pore(&self, property: PoreProperty) -> bool {
        self.pores.contains_key(&property)
    }

    /// Remove a pore field, returning its entries
    pub fn remove_pore(&mut self, property: PoreProperty) -> Option<Vec<Option<f64>>> {
        self.pores.remove(&property)
    }

    // ====================================== Throats ==============================================

    /// Register a fully populated throat field
    pub fn set_throat(&mut self, property: ThroatProperty, values: Vec<f64>) -> Result<(), ConfigurationError> {
        self.set_throat_partial(property, values.into_iter().map(Some).collect())
    }

    /// Register a throat field where some entries may be unset
    ///
    /// Same validation rules as [`set_pore_partial`](Self::set_pore_partial),
    /// against the conduit count.
    pub fn set_throat_partial(
        &mut self,
        property: ThroatProperty,
        values: Vec<Option<f64>>,
    ) -> Result<(), ConfigurationError> {
        validate_field(&property.to_string(), &values, self.conduit_count, property.is_non_negative())?;
        self.throats.insert(property, values);
        Ok(())
    }

    /// Register a throat field with the same value everywhere
    pub fn fill_throat(&mut self, property: ThroatProperty, value: f64) -> Result<(), ConfigurationError> {
        self.set_throat(property, vec![value; self.conduit_count])
    }

    /// Value of a throat field, `None` if the field or the entry is unset
    pub fn throat(&self, property: ThroatProperty, conduit: usize) -> Option<f64> {
        self.throats.get(&property).and_then(|values| values.get(conduit).copied().flatten())
    }

    /// Raw entries of a throat field
    pub fn throat_values(&self, property: ThroatProperty) -> Option<&[Option<f64>]> {
        self.throats.get(&property).map(Vec::as_slice)
    }

    pub fn has_throat(&self, property: ThroatProperty) -> bool {
        self.throats.contains_key(&property)
    }

    /// Remove a throat field, returning its entries
    pub fn remove_throat(&mut self, property: ThroatProperty) -> Option<Vec<Option<f64>>> {
        self.throats.remove(&property)
    }
}

fn validate_field(
    name: &str,
    values: &[Option<f64>],
    expected: usize,
    non_negative: bool,
) -> Result<(), ConfigurationError> {
    if values.len() != expected {
        return Err(ConfigurationError::SizeMismatch {
            name: name.to_string(),
            expected,
            actual: values.len(),
        });
    }

    for (index, value) in values.iter().enumerate() {
        if let Some(value) = *value {
            if !value.is_finite() || (non_negative && value < 0.0) {
                return Err(ConfigurationError::InvalidValue { name: name.to_string(), index, value });
            }
        }
    }
    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PropertyTable {
        PropertyTable::new(&Topology::chain(3, 1.0))
    }

    #[test]
    fn test_unset_is_distinct_from_zero() {
        let mut properties = table();
        properties
            .set_pore_partial(PoreProperty::Diameter, vec![Some(0.0), None, Some(1.0)])
            .unwrap();

        assert_eq!(properties.pore(PoreProperty::Diameter, 0), Some(0.0));
        assert_eq!(properties.pore(PoreProperty::Diameter, 1), None);
        assert_eq!(properties.pore(PoreProperty::Area, 0), None);
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let mut properties = table();
        let result = properties.set_throat(ThroatProperty::Area, vec![1.0; 3]);
        assert_eq!(
            result,
            Err(ConfigurationError::SizeMismatch { name: "throat.area".to_string(), expected: 2, actual: 3 })
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut properties = table();
        let result = properties.set_pore(PoreProperty::Area, vec![1.0, f64::NAN, 1.0]);
        assert!(matches!(result, Err(ConfigurationError::InvalidValue { index: 1, .. })));
        assert!(!properties.has_pore(PoreProperty::Area));
    }

    #[test]
    fn test_negative_physical_value_rejected() {
        let mut properties = table();
        assert!(properties.fill_throat(ThroatProperty::Diffusivity, -1.0).is_err());
        assert!(properties.fill_throat(ThroatProperty::Custom("charge"), -1.0).is_ok());
    }

    #[test]
    fn test_remove_field() {
        let mut properties = table();
        properties.fill_pore(PoreProperty::Viscosity, 1e-3).unwrap();
        assert!(properties.remove_pore(PoreProperty::Viscosity).is_some());
        assert!(!properties.has_pore(PoreProperty::Viscosity));
    }

    #[test]
    fn test_field_names() {
        assert_eq!(ThroatProperty::ConduitLength(Segment::Pore2).to_string(), "throat.conduit_lengths.pore2");
        assert_eq!(ThroatProperty::ShapeFactor(Segment::Throat).to_string(), "throat.shape_factors.throat");
        assert_eq!(PoreProperty::Custom("porosity").to_string(), "pore.porosity");
    }
}
