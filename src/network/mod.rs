//! Pore network description
//!
//! - [`Topology`]: nodes (pores), conduits (throats), adjacency and coordinates
//! - [`PropertyTable`]: typed per-pore and per-throat scalar fields
//! - [`Cubic`]: regular lattice generator
//!
//! Everything here is read-only once built and is borrowed by the solver.

pub mod cubic;
pub mod properties;
pub mod topology;

pub use cubic::Cubic;
pub use properties::{PoreProperty, PropertyTable, Segment, ThroatProperty};
pub use topology::{DomainExtent, Face, Topology};
