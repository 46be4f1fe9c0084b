//! Per-operation crossing policies.
//!
//! Every bound method and property declares how its result crosses into the runtime.
//! There is deliberately no `Default`: a binding without a policy cannot be declared.

use std::fmt;
use std::sync::Arc;

use crate::object::Object;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnershipPolicy {
	/// Result is duplicated; no lifetime relationship to the receiver.
	OwnedCopy,
	/// Result aliases state owned by the receiver and keeps it alive.
	BorrowedInternal,
	/// Result aliases state owned outside any instance.
	BorrowedExternal,
	/// Result is the receiver itself, after mutation.
	SelfReference,
	/// Plain value without aliasing concerns.
	None,
}

impl OwnershipPolicy {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::OwnedCopy => "owned_copy",
			Self::BorrowedInternal => "borrowed_internal",
			Self::BorrowedExternal => "borrowed_external",
			Self::SelfReference => "self_reference",
			Self::None => "none",
		}
	}

	/// Checks that `result` honors this policy for a call on `receiver`.
	pub fn admits(self, receiver: &Arc<Object>, result: &Value) -> bool {
		match self {
			Self::None => result.is_primitive(),
			Self::OwnedCopy => match result {
				Value::Object(obj) => obj.is_owned(),
				Value::List(items) => items.iter().all(|v| !matches!(v, Value::Object(o) if !o.is_owned())),
				_ => true,
			},
			Self::SelfReference => matches!(result, Value::Object(obj) if Arc::ptr_eq(obj, receiver)),
			Self::BorrowedInternal => match result {
				Value::Object(obj) => obj.owner().is_some() && Arc::ptr_eq(&obj.root(), &receiver.root()),
				_ => false,
			},
			Self::BorrowedExternal => matches!(result, Value::Object(obj) if obj.is_external()),
		}
	}
}

impl fmt::Display for OwnershipPolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
