//! Class objects: the runtime-visible counterpart of a native type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::RuntimeError;
use crate::native::NativeType;
use crate::object::Object;
use crate::policy::OwnershipPolicy;
use crate::value::Value;

pub type NativeBox = Box<dyn Any + Send + Sync>;
pub type MethodFn = Arc<dyn Fn(&Arc<Object>, &[Value]) -> Result<Value, RuntimeError> + Send + Sync>;
pub type GetterFn = Arc<dyn Fn(&Arc<Object>) -> Result<Value, RuntimeError> + Send + Sync>;
pub type SetterFn = Arc<dyn Fn(&Arc<Object>, &Value) -> Result<(), RuntimeError> + Send + Sync>;
pub type ConstructorFn = Arc<dyn Fn(&[Value]) -> Result<NativeBox, RuntimeError> + Send + Sync>;

/// One overload of a bound method.
#[derive(Clone)]
pub struct Method {
	pub name: Box<str>,
	/// Distinguishes overloads sharing a name.
	pub signature: Box<str>,
	pub policy: OwnershipPolicy,
	pub doc: Option<Box<str>>,
	pub call: MethodFn,
}

impl Method {
	/// Calls the overload and verifies the result against the declared policy.
	pub fn invoke(&self, receiver: &Arc<Object>, args: &[Value]) -> Result<Value, RuntimeError> {
		let out = (self.call)(receiver, args)?;
		if !self.policy.admits(receiver, &out) {
			return Err(RuntimeError::PolicyViolation {
				callable: format!("{}.{}", receiver.class().name(), self.name),
				policy: self.policy,
			});
		}
		Ok(out)
	}
}

impl fmt::Debug for Method {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Method")
			.field("name", &self.name)
			.field("signature", &self.signature)
			.field("policy", &self.policy)
			.finish_non_exhaustive()
	}
}

#[derive(Clone)]
pub struct Property {
	pub name: Box<str>,
	pub policy: OwnershipPolicy,
	pub get: GetterFn,
	pub set: Option<SetterFn>,
}

impl fmt::Debug for Property {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Property")
			.field("name", &self.name)
			.field("policy", &self.policy)
			.field("writable", &self.set.is_some())
			.finish_non_exhaustive()
	}
}

#[derive(Clone)]
pub struct Constructor {
	pub signature: Box<str>,
	pub make: ConstructorFn,
}

impl fmt::Debug for Constructor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Constructor").field("signature", &self.signature).finish_non_exhaustive()
	}
}

/// Everything needed to declare a class.
#[derive(Debug)]
pub struct ClassSpec {
	pub name: Box<str>,
	pub native: NativeType,
	pub doc: Option<Box<str>>,
	pub constructors: Vec<Constructor>,
	pub methods: IndexMap<Box<str>, Vec<Method>>,
	pub properties: IndexMap<Box<str>, Property>,
}

impl ClassSpec {
	pub fn new(name: impl Into<Box<str>>, native: NativeType) -> Self {
		Self {
			name: name.into(),
			native,
			doc: None,
			constructors: Vec::new(),
			methods: IndexMap::new(),
			properties: IndexMap::new(),
		}
	}
}

/// A declared class. Shared by every scope that binds it.
pub struct Class {
	name: Box<str>,
	native: NativeType,
	doc: Option<Box<str>>,
	constructors: Vec<Constructor>,
	methods: IndexMap<Box<str>, Vec<Method>>,
	properties: IndexMap<Box<str>, Property>,
}

impl Class {
	pub fn new(spec: ClassSpec) -> Arc<Self> {
		Arc::new(Self {
			name: spec.name,
			native: spec.native,
			doc: spec.doc,
			constructors: spec.constructors,
			methods: spec.methods,
			properties: spec.properties,
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn native(&self) -> NativeType {
		self.native
	}

	pub fn doc(&self) -> Option<&str> {
		self.doc.as_deref()
	}

	pub fn methods(&self, name: &str) -> Option<&[Method]> {
		self.methods.get(name).map(Vec::as_slice)
	}

	pub fn method_names(&self) -> impl Iterator<Item = &str> {
		self.methods.keys().map(|k| &**k)
	}

	pub fn property(&self, name: &str) -> Option<&Property> {
		self.properties.get(name)
	}

	pub fn property_names(&self) -> impl Iterator<Item = &str> {
		self.properties.keys().map(|k| &**k)
	}

	pub fn has_attr(&self, name: &str) -> bool {
		self.methods.contains_key(name) || self.properties.contains_key(name)
	}

	pub fn is_constructible(&self) -> bool {
		!self.constructors.is_empty()
	}

	/// Constructs a new owned instance, trying constructor overloads in order.
	pub fn construct(self: &Arc<Self>, args: &[Value]) -> Result<Arc<Object>, RuntimeError> {
		if self.constructors.is_empty() {
			return Err(RuntimeError::NotConstructible { class: self.name.to_string() });
		}
		for ctor in &self.constructors {
			match (ctor.make)(args) {
				Ok(native) => return self.wrap(native),
				Err(e) if e.is_mismatch() => continue,
				Err(e) => return Err(e),
			}
		}
		Err(RuntimeError::NoMatchingOverload {
			callable: format!("{}.__init__", self.name),
			tried: self.constructors.len(),
		})
	}

	/// Wraps an already-built native value as a new owned instance of this class.
	pub fn wrap(self: &Arc<Self>, native: NativeBox) -> Result<Arc<Object>, RuntimeError> {
		if (*native).type_id() != self.native.id() {
			return Err(RuntimeError::NativeTypeMismatch {
				class: self.name.to_string(),
				expected: self.native.name(),
			});
		}
		Ok(Object::owned(self.clone(), native))
	}
}

impl fmt::Debug for Class {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Class")
			.field("name", &self.name)
			.field("native", &self.native)
			.field("methods", &self.methods.keys().collect::<Vec<_>>())
			.field("properties", &self.properties.keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}
