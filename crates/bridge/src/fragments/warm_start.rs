use algebind_runtime::RuntimeError;
use nalgebra::DVector;

use crate::builder::ClassBuilder;
use crate::capability::CapabilitySet;
use crate::error::BindError;
use crate::fragment::Fragment;
use crate::traits::{Native, WarmStart};

/// Binds `solveWithGuess(b, x0)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveWithGuess;

impl<T: Native + WarmStart> Fragment<T> for SolveWithGuess {
	const PROVIDES: CapabilitySet = CapabilitySet::WARM_START;

	fn name(&self) -> &'static str {
		"solve_with_guess"
	}

	fn apply(self, class: &mut ClassBuilder<'_, T>) -> Result<(), BindError> {
		let owner = class.name().to_string();
		class.def("solveWithGuess", move |native: &T, args| {
			args.expect_arity(2)?;
			let rhs = args.get::<DVector<f64>>(0)?;
			let guess = args.get::<DVector<f64>>(1)?;
			native.solve_with_guess(&rhs, &guess).map_err(|e| RuntimeError::native(owner.as_str(), e))
		})?;
		Ok(())
	}
}
