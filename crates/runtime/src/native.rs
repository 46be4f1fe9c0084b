use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Process-unique identity of a concrete native type.
///
/// Derived from [`TypeId`], so every monomorphized instantiation of a generic type is
/// its own identity. The name is carried for diagnostics only and takes no part in
/// equality.
#[derive(Clone, Copy)]
pub struct NativeType {
	id: TypeId,
	name: &'static str,
}

impl NativeType {
	pub fn of<T: Any>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: type_name::<T>(),
		}
	}

	pub fn id(self) -> TypeId {
		self.id
	}

	pub fn name(self) -> &'static str {
		self.name
	}

	pub fn is<T: Any>(self) -> bool {
		self.id == TypeId::of::<T>()
	}
}

impl PartialEq for NativeType {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for NativeType {}

impl Hash for NativeType {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for NativeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "NativeType({})", self.name)
	}
}

impl fmt::Display for NativeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}
