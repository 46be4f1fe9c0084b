use algebind_runtime::{OwnershipPolicy, Value};

use crate::builder::ClassBuilder;
use crate::capability::CapabilitySet;
use crate::error::BindError;
use crate::fragment::Fragment;
use crate::identity::{IdentityStrategy, identity_of};
use crate::traits::Native;

/// Binds `id()`, the instance's identity token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity(pub IdentityStrategy);

impl<T: Native> Fragment<T> for Identity {
	const PROVIDES: CapabilitySet = CapabilitySet::IDENTITY;

	fn name(&self) -> &'static str {
		"identity"
	}

	fn apply(self, class: &mut ClassBuilder<'_, T>) -> Result<(), BindError> {
		let strategy = self.0;
		class.def_raw("id", OwnershipPolicy::None, move |this, args| {
			args.expect_arity(0)?;
			Ok(Value::Int(identity_of(this, strategy)?.get() as i64))
		})?;
		Ok(())
	}
}
