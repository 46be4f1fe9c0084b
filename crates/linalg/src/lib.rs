//! Stateful solver objects over `nalgebra`.
//!
//! The types here mirror the usual object-oriented solver shape: construct, `compute`
//! a factorization, check `info`, then `solve`. They implement the structural traits
//! of `algebind-bridge` ([`Dimensions`](algebind_bridge::Dimensions),
//! [`Factorize`](algebind_bridge::Factorize), [`LinearSolve`](algebind_bridge::LinearSolve)
//! and friends), which is all an exposure layer needs to bind them.
//!
//! Decompositions delegate to `nalgebra`; only the preconditioned conjugate gradient
//! loop lives here.

pub mod compare;
pub mod dense;
pub mod error;
pub mod info;
pub mod iterative;

pub use compare::{DEFAULT_PRECISION, is_approx};
pub use dense::{HouseholderQr, JacobiSvd, Llt, PartialPivLu, SelfAdjointEigenSolver};
pub use error::LinalgError;
pub use info::ComputationInfo;
pub use iterative::{ConjugateGradient, DiagonalPreconditioner, ITERATION_DEFAULTS, IdentityPreconditioner, IterationDefaults, Preconditioner, iteration_defaults};
