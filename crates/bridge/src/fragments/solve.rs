use algebind_runtime::RuntimeError;
use nalgebra::{DMatrix, DVector};

use crate::builder::ClassBuilder;
use crate::capability::CapabilitySet;
use crate::error::BindError;
use crate::fragment::Fragment;
use crate::traits::{LinearSolve, MatrixSolve, Native};

/// Binds the `solve(b)` overload for 1-d right-hand sides.
#[derive(Debug, Clone, Copy, Default)]
pub struct Solve;

impl<T: Native + LinearSolve> Fragment<T> for Solve {
	const PROVIDES: CapabilitySet = CapabilitySet::SOLVE;

	fn name(&self) -> &'static str {
		"solve"
	}

	fn apply(self, class: &mut ClassBuilder<'_, T>) -> Result<(), BindError> {
		let owner = class.name().to_string();
		class.overload("solve", "vector", move |native: &T, args| {
			args.expect_arity(1)?;
			let rhs = args.get::<DVector<f64>>(0)?;
			native.solve(&rhs).map_err(|e| RuntimeError::native(owner.as_str(), e))
		})?;
		Ok(())
	}
}

/// Binds the `solve(B)` overload for matrix right-hand sides.
///
/// Sits next to [`Solve`] under the same name; the argument shape picks the overload.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveMatrix;

impl<T: Native + MatrixSolve> Fragment<T> for SolveMatrix {
	const PROVIDES: CapabilitySet = CapabilitySet::MATRIX_SOLVE;

	fn name(&self) -> &'static str {
		"solve_matrix"
	}

	fn apply(self, class: &mut ClassBuilder<'_, T>) -> Result<(), BindError> {
		let owner = class.name().to_string();
		class.overload("solve", "matrix", move |native: &T, args| {
			args.expect_arity(1)?;
			let rhs = args.get::<DMatrix<f64>>(0)?;
			native.solve_matrix(&rhs).map_err(|e| RuntimeError::native(owner.as_str(), e))
		})?;
		Ok(())
	}
}
