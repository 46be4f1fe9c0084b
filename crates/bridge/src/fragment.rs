//! Capability fragments: binding behavior applied to a class without inheritance.
//!
//! A fragment is generic over the native type it binds and states its structural
//! precondition as trait bounds on that type. Fragments never assume another fragment
//! ran before them; they rely only on their own bounds. Composition is ordered
//! application, and a later fragment binding an already-bound name replaces it.
//!
//! Pairing a fragment with a type that lacks the required capability is rejected at
//! compile time:
//!
//! ```compile_fail
//! use algebind_bridge::TypeRegistry;
//! use algebind_bridge::fragments::Solve;
//!
//! struct NotASolver;
//!
//! let registry = TypeRegistry::new("doc");
//! registry
//! 	.register_or_get::<NotASolver>("NotASolver", |class| {
//! 		class.apply(Solve)?;
//! 		Ok(())
//! 	})
//! 	.ok();
//! ```
//!
//! while a type that has it composes freely:
//!
//! ```
//! use algebind_bridge::TypeRegistry;
//! use algebind_bridge::fragments::{Identity, Shape};
//! use nalgebra::DMatrix;
//!
//! let registry = TypeRegistry::new("doc");
//! let matrix = registry.register_or_get::<DMatrix<f64>>("Matrix", |class| {
//! 	class.apply((Shape, Identity::default()))?;
//! 	Ok(())
//! })?;
//! assert!(matrix.created);
//! assert!(matrix.handle.has_attr("rows"));
//! assert!(matrix.handle.has_attr("id"));
//! # Ok::<(), algebind_bridge::BindError>(())
//! ```

use crate::builder::ClassBuilder;
use crate::capability::CapabilitySet;
use crate::error::BindError;
use crate::traits::Native;

pub trait Fragment<T: Native> {
	/// Capabilities recorded on the exposed type once the fragment is applied.
	const PROVIDES: CapabilitySet;

	fn name(&self) -> &'static str;

	fn apply(self, class: &mut ClassBuilder<'_, T>) -> Result<(), BindError>;
}

macro_rules! tuple_fragment {
	($($frag:ident $var:ident),+) => {
		impl<T: Native, $($frag: Fragment<T>),+> Fragment<T> for ($($frag,)+) {
			const PROVIDES: CapabilitySet = CapabilitySet::empty()$(.union(<$frag as Fragment<T>>::PROVIDES))+;

			fn name(&self) -> &'static str {
				"composite"
			}

			fn apply(self, class: &mut ClassBuilder<'_, T>) -> Result<(), BindError> {
				let ($($var,)+) = self;
				$(class.apply($var)?;)+
				Ok(())
			}
		}
	};
}

tuple_fragment!(A a);
tuple_fragment!(A a, B b);
tuple_fragment!(A a, B b, C c);
tuple_fragment!(A a, B b, C c, D d);
tuple_fragment!(A a, B b, C c, D d, E e);
tuple_fragment!(A a, B b, C c, D d, E e, F f);
tuple_fragment!(A a, B b, C c, D d, E e, F f, G g);
tuple_fragment!(A a, B b, C c, D d, E e, F f, G g, H h);

/// An ad hoc fragment built from a closure. Provides no recorded capability.
pub struct FnFragment<F> {
	name: &'static str,
	f: F,
}

pub fn from_fn<T, F>(name: &'static str, f: F) -> FnFragment<F>
where
	T: Native,
	F: FnOnce(&mut ClassBuilder<'_, T>) -> Result<(), BindError>,
{
	FnFragment { name, f }
}

impl<T: Native, F> Fragment<T> for FnFragment<F>
where
	F: FnOnce(&mut ClassBuilder<'_, T>) -> Result<(), BindError>,
{
	const PROVIDES: CapabilitySet = CapabilitySet::empty();

	fn name(&self) -> &'static str {
		self.name
	}

	fn apply(self, class: &mut ClassBuilder<'_, T>) -> Result<(), BindError> {
		(self.f)(class)
	}
}
