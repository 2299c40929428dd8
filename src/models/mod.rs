//! Transport models for pore networks
//!
//! Conductance models implement [`ConductanceModel`](crate::physics::ConductanceModel),
//! source-term kinetics implement [`SourceModel`](crate::physics::SourceModel).
//! Models only compute coefficients; assembling and solving is the solver's job.
//!
//! # Available Models
//!
//! ## [`SeriesResistors`]: diffusion, heat and charge
//!
//! Pore-throat-pore resistors in series, `g_i = property_i·area_i/length_i`.
//! Constructors [`SeriesResistors::diffusive`], [`SeriesResistors::thermal`] and
//! [`SeriesResistors::electrical`] pick the matching phase property.
//!
//! ## [`HagenPoiseuille`]: viscous flow
//!
//! Cylindrical segments with `g_i = π·d⁴/(128·μ·L)`.
//!
//! # Source terms
//!
//! [`ConstantRate`], [`LinearKinetics`], [`PowerLaw`] and
//! [`NaturalExponential`] describe reaction or injection rates at nodes.

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod conductance;
pub mod source_terms;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use conductance::{series_conductance, ConduitSegment, HagenPoiseuille, SeriesResistors};
pub use source_terms::{ConstantRate, LinearKinetics, NaturalExponential, PowerLaw};
