//! Transport physics
//!
//! This module provides the traits that connect network data to the solver.
//! A conductance model turns per-conduit geometry and phase properties into a
//! scalar conductance; a source model describes an optional nonlinear
//! sink/source at a node.
//!
//! # Core Concepts
//!
//! - **Transport Kind**: names the unknown field (concentration, pressure, ...)
//! - **Conductance Model**: `g = f(conduit properties)`, `g ≥ 0`
//! - **Conductances**: the validated table of `g` for every conduit
//! - **Source Model**: `rate(x)`, linearized as `a1·x + a0`
//!
//! # Architecture
//!
//! Physics is **separate from the numerical solver**:
//! - The models provide the **coefficients** (physics)
//! - The solver provides the **method** to solve the resulting system (numerics)
//!
//! The same solver handles diffusion, viscous flow, heat and charge transport;
//! only the conductance model changes.
//!
//! # Implementing a New Conductance Model
//!
//! ```rust
//! use pnm_rs::error::PropertyError;
//! use pnm_rs::network::{PropertyTable, ThroatProperty, Topology};
//! use pnm_rs::physics::ConductanceModel;
//!
//! /// Conductance proportional to throat area
//! struct AreaWeighted {
//!     factor: f64,
//! }
//!
//! impl ConductanceModel for AreaWeighted {
//!     fn conductance(
//!         &self,
//!         conduit: usize,
//!         _topology: &Topology,
//!         properties: &PropertyTable,
//!     ) -> Result<f64, PropertyError> {
//!         let property = ThroatProperty::Area;
//!         let area = properties
//!             .throat(property, conduit)
//!             .ok_or(PropertyError::MissingThroat { conduit, property })?;
//!         Ok(self.factor * area)
//!     }
//!
//!     fn name(&self) -> &str {
//!         "area_weighted"
//!     }
//! }
//! ```
//!
//! # Available Models
//!
//! See [`crate::models`]: series resistors (diffusive, thermal, electrical),
//! Hagen-Poiseuille and the source-term kinetics.

// module declaration
pub mod conductances;
pub mod traits;

// re-export commonly used types for convenience
pub use conductances::{Conductances, MissingPropertyPolicy};
pub use traits::{ConductanceModel, Linearization, SourceModel, TransportKind};
