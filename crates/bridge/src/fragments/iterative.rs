use crate::builder::ClassBuilder;
use crate::capability::CapabilitySet;
use crate::error::BindError;
use crate::fragment::Fragment;
use crate::traits::{IterativeControl, Native};

/// Binds iteration count, tolerance and iteration-limit accessors, the achieved error
/// and the convergence status. Setters return the receiver.
#[derive(Debug, Clone, Copy, Default)]
pub struct Iterative;

impl<T: Native + IterativeControl> Fragment<T> for Iterative {
	const PROVIDES: CapabilitySet = CapabilitySet::ITERATIVE;

	fn name(&self) -> &'static str {
		"iterative"
	}

	fn apply(self, class: &mut ClassBuilder<'_, T>) -> Result<(), BindError> {
		class
			.def("iterations", |native: &T, args| {
				args.expect_arity(0)?;
				Ok(native.iterations())
			})?
			.def("tolerance", |native: &T, args| {
				args.expect_arity(0)?;
				Ok(native.tolerance())
			})?
			.def_chain("setTolerance", |native: &mut T, (tolerance,): (f64,)| {
				native.set_tolerance(tolerance);
				Ok(())
			})?
			.def("maxIterations", |native: &T, args| {
				args.expect_arity(0)?;
				Ok(native.max_iterations())
			})?
			.def_chain("setMaxIterations", |native: &mut T, (max_iterations,): (usize,)| {
				native.set_max_iterations(max_iterations);
				Ok(())
			})?
			.def("error", |native: &T, args| {
				args.expect_arity(0)?;
				Ok(native.error())
			})?
			.def("info", |native: &T, args| {
				args.expect_arity(0)?;
				Ok(IterativeControl::info(native))
			})?;
		Ok(())
	}
}
