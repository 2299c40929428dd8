//! Post-processing of solved fields
//!
//! - [`rates`]: per-conduit rates, per-node net rates, net rate of a node set
//! - [`effective`]: effective coefficients between two Dirichlet faces

pub mod effective;
pub mod rates;

pub use effective::{effective_coefficient, effective_permeability, face_potential, DomainExtent};
pub use rates::{conduit_rates, net_rate, node_rates};
