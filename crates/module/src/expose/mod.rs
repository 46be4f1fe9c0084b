//! Exposure of each native family into a scope.
//!
//! Order matters: a class whose bindings borrow or copy another native type needs that
//! type exposed first, so `Matrix` precedes the dense decompositions and the
//! preconditioners precede the solvers that own them.

mod dense;
mod info;
mod iterative;
mod matrix;

pub(crate) use dense::dense;
pub(crate) use info::computation_info;
pub(crate) use iterative::iterative;
pub(crate) use matrix::matrix;

use algebind_bridge::runtime::RuntimeError;
use algebind_linalg::LinalgError;

/// Surfaces a native error under the exposed class name, message untouched.
pub(crate) fn native(class: &'static str) -> impl Fn(LinalgError) -> RuntimeError + Copy {
	move |err| RuntimeError::native(class, err)
}
