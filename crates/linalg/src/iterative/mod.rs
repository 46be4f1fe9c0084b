//! Iterative solvers and the process-wide defaults they start from.

mod cg;
mod defaults;
mod preconditioner;

pub use cg::ConjugateGradient;
pub use defaults::{ITERATION_DEFAULTS, IterationDefaults, iteration_defaults};
pub use preconditioner::{DiagonalPreconditioner, IdentityPreconditioner, Preconditioner};
