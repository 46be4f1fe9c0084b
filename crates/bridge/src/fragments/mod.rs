//! The fragments shared by every exposed solver type.

mod compute;
mod identity;
mod iterative;
mod preconditioner;
mod shape;
mod solve;
mod warm_start;

pub use compute::Compute;
pub use identity::Identity;
pub use iterative::Iterative;
pub use preconditioner::PreconditionerAccess;
pub use shape::Shape;
pub use solve::{Solve, SolveMatrix};
pub use warm_start::SolveWithGuess;
