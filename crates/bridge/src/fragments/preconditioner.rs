use crate::builder::ClassBuilder;
use crate::capability::CapabilitySet;
use crate::error::BindError;
use crate::fragment::Fragment;
use crate::traits::{Native, Preconditioned};

/// Binds `preconditioner()` as a read/write view into the solver.
///
/// The preconditioner type must be exposed before the solver that owns it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreconditionerAccess;

impl<T: Native + Preconditioned> Fragment<T> for PreconditionerAccess {
	const PROVIDES: CapabilitySet = CapabilitySet::PRECONDITIONED;

	fn name(&self) -> &'static str {
		"preconditioner"
	}

	fn apply(self, class: &mut ClassBuilder<'_, T>) -> Result<(), BindError> {
		class.def_internal::<T::Preconditioner>("preconditioner", <T as Preconditioned>::preconditioner, <T as Preconditioned>::preconditioner_mut)?;
		Ok(())
	}
}
