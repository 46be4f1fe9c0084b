use crate::builder::ClassBuilder;
use crate::capability::CapabilitySet;
use crate::error::BindError;
use crate::fragment::Fragment;
use crate::traits::{Dimensions, Native};

/// Binds `rows()`, `cols()` and `size()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shape;

impl<T: Native + Dimensions> Fragment<T> for Shape {
	const PROVIDES: CapabilitySet = CapabilitySet::DIMENSIONS;

	fn name(&self) -> &'static str {
		"shape"
	}

	fn apply(self, class: &mut ClassBuilder<'_, T>) -> Result<(), BindError> {
		class
			.def("rows", |native: &T, args| {
				args.expect_arity(0)?;
				Ok(native.rows())
			})?
			.def("cols", |native: &T, args| {
				args.expect_arity(0)?;
				Ok(native.cols())
			})?
			.def("size", |native: &T, args| {
				args.expect_arity(0)?;
				Ok(native.size())
			})?;
		Ok(())
	}
}
