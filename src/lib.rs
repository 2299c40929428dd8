//! pnm-rs: Pore Network Transport Framework
//!
//! Steady-state linear transport (diffusion, Stokes flow, heat and electrical
//! conduction) on pore networks, where each pore carries one unknown and each
//! throat a conductance.
//!
//! # Architecture
//!
//! pnm-rs is built on two core principles:
//!
//! 1. **Separation of Physics and Numerics**
//!    - Conductance and source models define the physics (what to solve)
//!    - Assembler, linear solvers and the Picard loop provide methods (how to solve)
//!
//! 2. **One algorithm for every transport kind**
//!    - Diffusion, Stokes flow, heat and charge share the same assembly and
//!      post-processing; [`TransportKind`](physics::TransportKind) only names
//!      the quantity and picks the default conductance model
//!    - Trait-based models for easy extension
//!
//! # Quick Start
//!
//! ```rust
//! use pnm_rs::prelude::*;
//!
//! # fn main() -> Result<(), TransportError> {
//! // 1. Build the network and its properties
//! let lattice = Cubic::new([4, 4, 4], 1e-4)?;
//! let topology = lattice.topology();
//! let mut properties = PropertyTable::new(&topology);
//! properties.fill_throat(ThroatProperty::Area, 1e-9)?;
//! properties.fill_throat(ThroatProperty::Diffusivity, 2e-9)?;
//! properties.fill_throat(ThroatProperty::ConduitLength(Segment::Throat), 1e-4)?;
//! properties.fill_throat(ThroatProperty::ConduitLength(Segment::Pore1), 0.0)?;
//! properties.fill_throat(ThroatProperty::ConduitLength(Segment::Pore2), 0.0)?;
//! properties.fill_pore(PoreProperty::Area, 1e-9)?;
//! properties.fill_pore(PoreProperty::Diffusivity, 2e-9)?;
//!
//! // 2. Describe the problem
//! let mut diffusion = TransportAlgorithm::with_default_model(
//!     TransportKind::Diffusion,
//!     &topology,
//!     &properties,
//!     SolverConfiguration::default(),
//! )?;
//! let inlet = lattice.face(Face::XMin);
//! let outlet = lattice.face(Face::XMax);
//! diffusion.set_dirichlet(&inlet, 1.0)?;
//! diffusion.set_dirichlet(&outlet, 0.0)?;
//!
//! // 3. Solve and post-process
//! diffusion.run()?;
//! let rate = diffusion.rate(&inlet)?;
//! let d_eff = diffusion.effective_coefficient(&inlet, &outlet)?;
//! assert!(rate > 0.0 && d_eff > 0.0);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`network`]: topology, property tables, cubic lattices
//! - [`physics`]: conductance/source traits and the conductance table
//! - [`models`]: concrete conductance and source-term models
//! - [`solver`]: boundary conditions, assembly, linear solvers, Picard loop
//! - [`postprocess`]: rates and effective coefficients
//! - [`output`]: CSV export
//! - [`algorithm`]: the [`TransportAlgorithm`](algorithm::TransportAlgorithm) facade
//! - [`error`]: error types

// Core modules
pub mod error;
pub mod network;
pub mod physics;

pub mod models;
pub mod solver;

pub mod algorithm;
pub mod postprocess;

pub mod output;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //!
    //! use pnm_rs::prelude::*;
    //! ```
    pub use crate::algorithm::TransportAlgorithm;
    pub use crate::error::{ConfigurationError, PropertyError, TransportError, TransportResult};
    pub use crate::models::{
        ConstantRate, HagenPoiseuille, LinearKinetics, NaturalExponential, PowerLaw, SeriesResistors,
    };
    pub use crate::network::{Cubic, DomainExtent, Face, PoreProperty, PropertyTable, Segment, ThroatProperty, Topology};
    pub use crate::physics::{
        ConductanceModel, Conductances, Linearization, MissingPropertyPolicy, SourceModel, TransportKind,
    };
    pub use crate::solver::{
        solve_batch, solve_scenario, BoundaryConditions, PicardSettings, Scenario, SolveResult, SolverConfiguration,
        SolverType, SourceTerms,
    };
}
