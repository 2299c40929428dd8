//! Effective transport coefficients
//!
//! With two opposing faces held at fixed values, the network behaves like a
//! homogeneous slab of length `L` and cross-section `A`:
//!
//! ```text
//! K_eff = |Q| · L / (A · |Δ|)
//! ```
//!
//! `Q` is the rate through one face and `Δ` the difference of the mean
//! Dirichlet values of the two faces. For Stokes flow, multiplying by the
//! viscosity used in the hydraulic conductance gives the absolute permeability
//! (Darcy's law `Q = K·A·ΔP/(μ·L)`).

pub use crate::network::DomainExtent;

use crate::error::ConfigurationError;
use crate::solver::BoundaryConditions;

/// Mean Dirichlet value over a face
///
/// # Errors
///
/// - [`ConfigurationError::InvalidExtent`] for an empty face
/// - [`ConfigurationError::FaceNotConstrained`] if a face node carries no
///   Dirichlet condition
pub fn face_potential(boundary_conditions: &BoundaryConditions, face: &[usize]) -> Result<f64, ConfigurationError> {
    if face.is_empty() {
        return Err(ConfigurationError::InvalidExtent("face has no nodes".to_string()));
    }

    let mut total = 0.0;
    for &node in face {
        total += boundary_conditions
            .dirichlet_value(node)
            .ok_or(ConfigurationError::FaceNotConstrained { node })?;
    }
    Ok(total / face.len() as f64)
}

/// `|rate| · L / (A · |Δ|)`
///
/// # Errors
///
/// Invalid extent, or a zero/non-finite potential difference.
pub fn effective_coefficient(rate: f64, extent: &DomainExtent, potential_difference: f64) -> Result<f64, ConfigurationError> {
    extent.validate()?;
    if !(potential_difference.is_finite() && potential_difference != 0.0) {
        return Err(ConfigurationError::InvalidValue {
            name: "potential difference".to_string(),
            index: 0,
            value: potential_difference,
        });
    }
    Ok(rate.abs() * extent.length / (extent.area * potential_difference.abs()))
}

/// Absolute permeability from an effective hydraulic coefficient
pub fn effective_permeability(hydraulic_coefficient: f64, viscosity: f64) -> f64 {
    hydraulic_coefficient * viscosity
}

// =================================================================================================
// Tests
// =================================================================================================
