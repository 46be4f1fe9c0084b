//! Modules: named scopes holding classes, submodules, values and functions.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::class::Class;
use crate::error::RuntimeError;
use crate::object::Object;
use crate::value::Value;

pub type FunctionFn = Arc<dyn Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync>;

/// Module-level callable with ordered overloads.
pub struct Function {
	name: Box<str>,
	doc: Option<Box<str>>,
	overloads: Vec<FunctionFn>,
}

impl Function {
	pub fn new(name: impl Into<Box<str>>, f: impl Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static) -> Self {
		Self {
			name: name.into(),
			doc: None,
			overloads: vec![Arc::new(f)],
		}
	}

	pub fn with_doc(mut self, doc: impl Into<Box<str>>) -> Self {
		self.doc = Some(doc.into());
		self
	}

	pub fn overload(mut self, f: impl Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static) -> Self {
		self.overloads.push(Arc::new(f));
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn doc(&self) -> Option<&str> {
		self.doc.as_deref()
	}

	pub fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
		let mut last_mismatch = None;
		for f in &self.overloads {
			match f(args) {
				Err(e) if e.is_mismatch() => last_mismatch = Some(e),
				other => return other,
			}
		}
		match last_mismatch {
			Some(e) if self.overloads.len() == 1 => Err(e),
			_ => Err(RuntimeError::NoMatchingOverload {
				callable: self.name.to_string(),
				tried: self.overloads.len(),
			}),
		}
	}
}

impl fmt::Debug for Function {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Function")
			.field("name", &self.name)
			.field("overloads", &self.overloads.len())
			.finish_non_exhaustive()
	}
}

/// A module attribute.
#[derive(Debug, Clone)]
pub enum Attr {
	Class(Arc<Class>),
	Module(Arc<Module>),
	Function(Arc<Function>),
	Value(Value),
}

impl Attr {
	/// Identity for classes, modules and functions; value equality otherwise.
	pub fn same_as(&self, other: &Attr) -> bool {
		match (self, other) {
			(Self::Class(a), Self::Class(b)) => Arc::ptr_eq(a, b),
			(Self::Module(a), Self::Module(b)) => Arc::ptr_eq(a, b),
			(Self::Function(a), Self::Function(b)) => Arc::ptr_eq(a, b),
			(Self::Value(a), Self::Value(b)) => a == b,
			_ => false,
		}
	}

	pub fn kind(&self) -> &'static str {
		match self {
			Self::Class(_) => "class",
			Self::Module(_) => "module",
			Self::Function(_) => "function",
			Self::Value(_) => "value",
		}
	}
}

pub struct Module {
	name: Box<str>,
	qualified: Box<str>,
	doc: Option<Box<str>>,
	attrs: RwLock<IndexMap<Box<str>, Attr>>,
}

impl Module {
	pub fn new(name: impl Into<Box<str>>) -> Arc<Self> {
		let name = name.into();
		Arc::new(Self {
			qualified: name.clone(),
			name,
			doc: None,
			attrs: RwLock::new(IndexMap::new()),
		})
	}

	pub fn with_doc(name: impl Into<Box<str>>, doc: impl Into<Box<str>>) -> Arc<Self> {
		let name = name.into();
		Arc::new(Self {
			qualified: name.clone(),
			name,
			doc: Some(doc.into()),
			attrs: RwLock::new(IndexMap::new()),
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Dotted path from the root module.
	pub fn qualified_name(&self) -> &str {
		&self.qualified
	}

	pub fn doc(&self) -> Option<&str> {
		self.doc.as_deref()
	}

	/// Returns the submodule `name`, creating it if absent.
	///
	/// Fails when `name` is already bound to something other than a module.
	pub fn def_submodule(&self, name: &str) -> Result<Arc<Module>, RuntimeError> {
		let mut attrs = self.attrs.write();
		match attrs.get(name) {
			Some(Attr::Module(existing)) => return Ok(existing.clone()),
			Some(other) => {
				return Err(RuntimeError::native(
					self.qualified.to_string(),
					format_args!("'{name}' is already bound to a {}", other.kind()),
				));
			}
			None => {}
		}
		let child = Arc::new(Self {
			name: name.into(),
			qualified: format!("{}.{name}", self.qualified).into(),
			doc: None,
			attrs: RwLock::new(IndexMap::new()),
		});
		attrs.insert(name.into(), Attr::Module(child.clone()));
		Ok(child)
	}

	/// Binds `name`, returning the attribute it replaced.
	pub fn set_attr(&self, name: &str, attr: Attr) -> Option<Attr> {
		self.attrs.write().insert(name.into(), attr)
	}

	/// Binds `name` only if it is free; otherwise returns what is already bound there.
	pub fn try_bind(&self, name: &str, attr: Attr) -> Result<(), Attr> {
		let mut attrs = self.attrs.write();
		if let Some(existing) = attrs.get(name) {
			return Err(existing.clone());
		}
		attrs.insert(name.into(), attr);
		Ok(())
	}

	pub fn add_function(&self, function: Function) -> Option<Attr> {
		let name = function.name.clone();
		self.set_attr(&name, Attr::Function(Arc::new(function)))
	}

	pub fn get(&self, name: &str) -> Option<Attr> {
		self.attrs.read().get(name).cloned()
	}

	pub fn contains(&self, name: &str) -> bool {
		self.attrs.read().contains_key(name)
	}

	pub fn names(&self) -> Vec<String> {
		self.attrs.read().keys().map(|k| k.to_string()).collect()
	}

	fn attribute_error(&self, name: &str) -> RuntimeError {
		RuntimeError::Attribute {
			owner: self.qualified.to_string(),
			name: name.to_string(),
		}
	}

	pub fn class(&self, name: &str) -> Result<Arc<Class>, RuntimeError> {
		match self.get(name) {
			Some(Attr::Class(class)) => Ok(class),
			_ => Err(self.attribute_error(name)),
		}
	}

	pub fn submodule(&self, name: &str) -> Result<Arc<Module>, RuntimeError> {
		match self.get(name) {
			Some(Attr::Module(module)) => Ok(module),
			_ => Err(self.attribute_error(name)),
		}
	}

	pub fn value(&self, name: &str) -> Result<Value, RuntimeError> {
		match self.get(name) {
			Some(Attr::Value(value)) => Ok(value),
			_ => Err(self.attribute_error(name)),
		}
	}

	/// Resolves a dotted path such as `solvers.ConjugateGradient` to a class.
	pub fn resolve_class(&self, path: &str) -> Result<Arc<Class>, RuntimeError> {
		match path.split_once('.') {
			Some((head, rest)) => self.submodule(head)?.resolve_class(rest),
			None => self.class(path),
		}
	}

	/// Calls the class bound at `name` as a constructor.
	pub fn construct(&self, name: &str, args: &[Value]) -> Result<Arc<Object>, RuntimeError> {
		self.resolve_class(name)?.construct(args)
	}

	pub fn call_function(&self, name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
		match self.get(name) {
			Some(Attr::Function(function)) => function.call(args),
			_ => Err(self.attribute_error(name)),
		}
	}
}

impl fmt::Debug for Module {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Module")
			.field("qualified", &self.qualified)
			.field("attrs", &self.attrs.read().keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}
