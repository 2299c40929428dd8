//! Linear solution methods
//!
//! This module contains concrete implementations of the
//! [`LinearSolver`](crate::solver::LinearSolver) trait.
//!
//! # Architecture
//!
//! The separation between abstract solver interface (`solver::traits`) and
//! concrete implementations (`solver::methods`) lets new methods be added
//! without touching the assembler or the Picard loop.
//!
//! # Available Methods
//!
//! - **[`DirectSolver`]**: sparse LDLᵀ with reverse Cuthill-McKee ordering
//!   - Exact up to rounding
//!   - Cost dominated by fill-in
//!   - Use: **default**, small to medium networks
//!
//! - **[`ConjugateGradientSolver`]**: Jacobi-preconditioned CG
//!   - Iterative, tolerance-controlled
//!   - Memory linear in the number of pores
//!   - Use: large networks, symmetric positive definite systems
//!
//! Both are selected through [`SolverType`](crate::solver::SolverType).

mod conjugate_gradient;
mod direct;

// Re-exports for convenience
pub use conjugate_gradient::ConjugateGradientSolver;
pub use direct::DirectSolver;
