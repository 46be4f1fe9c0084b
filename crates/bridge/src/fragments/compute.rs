use crate::builder::ClassBuilder;
use crate::capability::CapabilitySet;
use crate::error::BindError;
use crate::fragment::Fragment;
use crate::traits::{Factorize, Native};

/// Binds `compute(input)`, which returns the receiver, and `info()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compute;

impl<T: Native + Factorize> Fragment<T> for Compute {
	const PROVIDES: CapabilitySet = CapabilitySet::COMPUTE;

	fn name(&self) -> &'static str {
		"compute"
	}

	fn apply(self, class: &mut ClassBuilder<'_, T>) -> Result<(), BindError> {
		class
			.def_chain("compute", |native: &mut T, (input,): (T::Input,)| {
				native.compute(input);
				Ok(())
			})?
			.def("info", |native: &T, args| {
				args.expect_arity(0)?;
				Ok(Factorize::info(native))
			})?;
		Ok(())
	}
}
