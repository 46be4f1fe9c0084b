//! Ownership policy selection.
//!
//! Every bound operation declares how its return value relates to the receiver. The
//! classification is made once, when the binding is declared, and mapped to an
//! [`OwnershipPolicy`] through the static [`select`] table.
//!
//! Return types crossing by value must implement [`Crossing`], which names their
//! [`ReturnKind`]. A type without a `Crossing` impl cannot be returned from
//! [`ClassBuilder::def`](crate::ClassBuilder::def), so an unclassified return is a
//! compile error rather than a silent copy. Borrowed and self returns are declared
//! through the dedicated builder methods (`def_internal`, `def_external`, `def_chain`).

use algebind_runtime::{NdArray, OwnershipPolicy, Value};
use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnKind {
	/// A fresh value, duplicated out of native state.
	ByValue,
	/// A primitive or enum member.
	Primitive,
	/// A read/write reference into state owned by the receiver.
	InternalRef,
	/// A reference into global or static state.
	ExternalRef,
	/// The receiver itself, for call chaining.
	SelfRef,
}

pub const fn select(kind: ReturnKind) -> OwnershipPolicy {
	match kind {
		ReturnKind::ByValue => OwnershipPolicy::OwnedCopy,
		ReturnKind::Primitive => OwnershipPolicy::None,
		ReturnKind::InternalRef => OwnershipPolicy::BorrowedInternal,
		ReturnKind::ExternalRef => OwnershipPolicy::BorrowedExternal,
		ReturnKind::SelfRef => OwnershipPolicy::SelfReference,
	}
}

/// A native value that crosses into the runtime by value.
pub trait Crossing {
	const KIND: ReturnKind;

	fn into_value(self) -> Value;
}

macro_rules! primitive_crossing {
	($($ty:ty => |$v:ident| $body:expr),+ $(,)?) => {
		$(
			impl Crossing for $ty {
				const KIND: ReturnKind = ReturnKind::Primitive;

				fn into_value(self) -> Value {
					let $v = self;
					$body
				}
			}
		)+
	};
}

primitive_crossing! {
	() => |_v| Value::None,
	bool => |v| Value::Bool(v),
	i64 => |v| Value::Int(v),
	usize => |v| Value::Int(i64::try_from(v).unwrap_or(i64::MAX)),
	f64 => |v| Value::Float(v),
	String => |v| Value::Str(v),
}

impl Crossing for NdArray {
	const KIND: ReturnKind = ReturnKind::ByValue;

	fn into_value(self) -> Value {
		Value::Array(self)
	}
}

impl Crossing for DVector<f64> {
	const KIND: ReturnKind = ReturnKind::ByValue;

	fn into_value(self) -> Value {
		Value::Array(NdArray::vector(self.as_slice().to_vec()))
	}
}

impl Crossing for DMatrix<f64> {
	const KIND: ReturnKind = ReturnKind::ByValue;

	fn into_value(self) -> Value {
		let (rows, cols) = self.shape();
		// nalgebra storage is always rows * cols long
		NdArray::matrix(rows, cols, self.as_slice().to_vec()).map_or(Value::None, Value::Array)
	}
}

impl<T: Crossing> Crossing for Vec<T> {
	const KIND: ReturnKind = ReturnKind::ByValue;

	fn into_value(self) -> Value {
		Value::List(self.into_iter().map(Crossing::into_value).collect())
	}
}
