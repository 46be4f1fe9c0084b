//! Class builder handed to registration callbacks and fragments.
//!
//! Every binding method fixes the operation's [`OwnershipPolicy`] from how it is
//! declared:
//!
//! | Method | Policy |
//! |---|---|
//! | `def`, `overload`, `def_mut`, `prop_*` | [`select`]`(R::KIND)` of the [`Crossing`] return type |
//! | `def_owned` | `OwnedCopy` (a new instance of another exposed type) |
//! | `def_internal`, `def_internal_ro` | `BorrowedInternal` |
//! | `def_external` | `BorrowedExternal` |
//! | `def_chain` | `SelfReference` |
//! | `def_raw` | given explicitly |
//!
//! Binding a name that is already bound replaces it (last applied wins).

use std::any::{Any, type_name};
use std::marker::PhantomData;
use std::sync::Arc;

use algebind_runtime::{
	Class, ClassSpec, Constructor, ConstructorFn, Method, MethodFn, NativeBox, NativeType, Object, OwnershipPolicy, Projection, Property, RuntimeError,
	Value,
};
use parking_lot::RwLock;

use crate::capability::CapabilitySet;
use crate::cast::{Args, FromArgs, FromValue};
use crate::error::BindError;
use crate::fragment::Fragment;
use crate::policy::{Crossing, ReturnKind, select};
use crate::registry::TypeRegistry;
use crate::traits::Native;

/// Checks that `name` is an identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_name(name: &str) -> Result<(), BindError> {
	let mut chars = name.chars();
	let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_') && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
	if valid {
		Ok(())
	} else {
		Err(BindError::InvalidName { name: name.to_string() })
	}
}

/// Projects a field of `T` as an `R`.
struct FieldProjection<T, R> {
	read: fn(&T) -> &R,
	write: Option<fn(&mut T) -> &mut R>,
}

impl<T: Native, R: Native> Projection for FieldProjection<T, R> {
	fn project<'a>(&self, parent: &'a dyn Any) -> Option<&'a dyn Any> {
		parent.downcast_ref::<T>().map(|t| (self.read)(t) as &dyn Any)
	}

	fn project_mut<'a>(&self, parent: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
		let write = self.write?;
		parent.downcast_mut::<T>().map(|t| write(t) as &mut dyn Any)
	}

	fn is_writable(&self) -> bool {
		self.write.is_some()
	}
}

pub struct ClassBuilder<'r, T> {
	registry: &'r TypeRegistry,
	spec: ClassSpec,
	capabilities: CapabilitySet,
	_native: PhantomData<fn() -> T>,
}

impl<'r, T: Native> ClassBuilder<'r, T> {
	pub(crate) fn new(registry: &'r TypeRegistry, name: &str) -> Result<Self, BindError> {
		validate_name(name)?;
		Ok(Self {
			registry,
			spec: ClassSpec::new(name, NativeType::of::<T>()),
			capabilities: CapabilitySet::empty(),
			_native: PhantomData,
		})
	}

	pub fn name(&self) -> &str {
		&self.spec.name
	}

	pub fn registry(&self) -> &'r TypeRegistry {
		self.registry
	}

	/// Capabilities recorded by the fragments applied so far.
	pub fn capabilities(&self) -> CapabilitySet {
		self.capabilities
	}

	pub fn has_method(&self, name: &str) -> bool {
		self.spec.methods.contains_key(name)
	}

	pub fn has_property(&self, name: &str) -> bool {
		self.spec.properties.contains_key(name)
	}

	pub fn doc(&mut self, doc: &str) -> &mut Self {
		self.spec.doc = Some(doc.into());
		self
	}

	fn callable(&self, name: &str) -> String {
		format!("{}.{name}", self.spec.name)
	}

	fn require<R: Native>(&self, name: &str) -> Result<Arc<Class>, BindError> {
		self.registry.class_of::<R>().ok_or_else(|| BindError::UnregisteredType {
			type_name: type_name::<R>(),
			needed_by: self.callable(name),
		})
	}

	/// Adds a constructor overload. A second `init` with the same signature replaces the first.
	pub fn init(&mut self, signature: &str, make: impl Fn(&Args<'_>) -> Result<T, RuntimeError> + Send + Sync + 'static) -> &mut Self {
		let callable = self.callable("__init__");
		let make: ConstructorFn = Arc::new(move |values: &[Value]| make(&Args::new(&callable, values)).map(|native| Box::new(native) as NativeBox));
		match self.spec.constructors.iter_mut().find(|c| &*c.signature == signature) {
			Some(existing) => existing.make = make,
			None => self.spec.constructors.push(Constructor {
				signature: signature.into(),
				make,
			}),
		}
		self
	}

	pub fn init_default(&mut self) -> &mut Self
	where
		T: Default,
	{
		self.init("()", |args| {
			args.expect_arity(0)?;
			Ok(T::default())
		})
	}

	fn bind(&mut self, name: &str, signature: Option<&str>, policy: OwnershipPolicy, call: impl Fn(&Arc<Object>, &Args<'_>) -> Result<Value, RuntimeError> + Send + Sync + 'static) -> Result<&mut Self, BindError> {
		validate_name(name)?;
		let callable = self.callable(name);
		let method = Method {
			name: name.into(),
			signature: signature.unwrap_or("*").into(),
			policy,
			doc: None,
			call: method_fn(callable, call),
		};
		let class = self.spec.name.clone();
		let overloads = self.spec.methods.entry(name.into()).or_default();
		match signature {
			None => {
				if !overloads.is_empty() {
					tracing::debug!(class = %class, method = name, "binding shadowed");
				}
				overloads.clear();
				overloads.push(method);
			}
			Some(signature) => match overloads.iter_mut().find(|m| &*m.signature == signature) {
				Some(existing) => {
					tracing::debug!(class = %class, method = name, signature, "overload shadowed");
					*existing = method;
				}
				None => overloads.push(method),
			},
		}
		Ok(self)
	}

	/// Binds `name` with an explicit policy, for operations that need the runtime object itself.
	pub fn def_raw(&mut self, name: &str, policy: OwnershipPolicy, call: impl Fn(&Arc<Object>, &Args<'_>) -> Result<Value, RuntimeError> + Send + Sync + 'static) -> Result<&mut Self, BindError> {
		self.bind(name, None, policy, call)
	}

	/// Binds a read-only method returning by value. Replaces every overload of `name`.
	pub fn def<R: Crossing>(&mut self, name: &str, f: impl Fn(&T, &Args<'_>) -> Result<R, RuntimeError> + Send + Sync + 'static) -> Result<&mut Self, BindError> {
		self.bind(name, None, select(R::KIND), move |this, args| {
			let out = this.read(|native: &T| f(native, args))??;
			Ok(out.into_value())
		})
	}

	/// Adds or replaces the overload of `name` keyed by `signature`.
	pub fn overload<R: Crossing>(&mut self, name: &str, signature: &str, f: impl Fn(&T, &Args<'_>) -> Result<R, RuntimeError> + Send + Sync + 'static) -> Result<&mut Self, BindError> {
		self.bind(name, Some(signature), select(R::KIND), move |this, args| {
			let out = this.read(|native: &T| f(native, args))??;
			Ok(out.into_value())
		})
	}

	/// Binds a mutating method returning by value.
	///
	/// Arguments are decoded into `A` before the receiver is locked for writing.
	pub fn def_mut<A: FromArgs, R: Crossing>(&mut self, name: &str, f: impl Fn(&mut T, A) -> Result<R, RuntimeError> + Send + Sync + 'static) -> Result<&mut Self, BindError> {
		self.bind(name, None, select(R::KIND), move |this, args| {
			let decoded = A::from_args(args)?;
			let out = this.write(|native: &mut T| f(native, decoded))??;
			Ok(out.into_value())
		})
	}

	/// Binds a mutating method that returns the receiver itself. Arguments are decoded first.
	pub fn def_chain<A: FromArgs>(&mut self, name: &str, f: impl Fn(&mut T, A) -> Result<(), RuntimeError> + Send + Sync + 'static) -> Result<&mut Self, BindError> {
		self.bind(name, None, select(ReturnKind::SelfRef), move |this, args| {
			let decoded = A::from_args(args)?;
			this.write(|native: &mut T| f(native, decoded))??;
			Ok(Value::Object(this.clone()))
		})
	}

	/// Binds a method returning a new owned instance of another exposed type.
	pub fn def_owned<R: Native>(&mut self, name: &str, f: impl Fn(&T, &Args<'_>) -> Result<R, RuntimeError> + Send + Sync + 'static) -> Result<&mut Self, BindError> {
		let class = self.require::<R>(name)?;
		self.bind(name, None, select(ReturnKind::ByValue), move |this, args| {
			let out = this.read(|native: &T| f(native, args))??;
			Ok(Value::Object(class.wrap(Box::new(out))?))
		})
	}

	/// Binds a read/write view of a sub-object of `T`. The view keeps the receiver alive.
	pub fn def_internal<R: Native>(&mut self, name: &str, read: fn(&T) -> &R, write: fn(&mut T) -> &mut R) -> Result<&mut Self, BindError> {
		self.bind_view(name, FieldProjection { read, write: Some(write) })
	}

	/// Like [`def_internal`](Self::def_internal), but writes through the view fail with `ReadOnly`.
	pub fn def_internal_ro<R: Native>(&mut self, name: &str, read: fn(&T) -> &R) -> Result<&mut Self, BindError> {
		self.bind_view(name, FieldProjection { read, write: None })
	}

	fn bind_view<R: Native>(&mut self, name: &str, view: FieldProjection<T, R>) -> Result<&mut Self, BindError> {
		let class = self.require::<R>(name)?;
		let view: Arc<dyn Projection> = Arc::new(view);
		self.bind(name, None, select(ReturnKind::InternalRef), move |this, args| {
			args.expect_arity(0)?;
			Ok(Value::Object(Object::borrow_internal(this, class.clone(), view.clone())?))
		})
	}

	/// Binds a view of process-wide state that outlives every instance.
	pub fn def_external<R: Native>(&mut self, name: &str, cell: &'static RwLock<R>) -> Result<&mut Self, BindError> {
		let class = self.require::<R>(name)?;
		self.bind(name, None, select(ReturnKind::ExternalRef), move |_, args| {
			args.expect_arity(0)?;
			Ok(Value::Object(Object::borrow_external(class.clone(), cell)?))
		})
	}

	fn bind_property(&mut self, property: Property) -> Result<&mut Self, BindError> {
		validate_name(&property.name)?;
		if let Some(previous) = self.spec.properties.insert(property.name.clone(), property) {
			tracing::debug!(class = %self.spec.name, property = %previous.name, "property shadowed");
		}
		Ok(self)
	}

	pub fn prop_ro<R: Crossing>(&mut self, name: &str, get: impl Fn(&T) -> R + Send + Sync + 'static) -> Result<&mut Self, BindError> {
		self.bind_property(Property {
			name: name.into(),
			policy: select(R::KIND),
			get: Arc::new(move |this| Ok(this.read(|native: &T| get(native))?.into_value())),
			set: None,
		})
	}

	pub fn prop_rw<V: Crossing + FromValue>(
		&mut self,
		name: &str,
		get: impl Fn(&T) -> V + Send + Sync + 'static,
		set: impl Fn(&mut T, V) + Send + Sync + 'static,
	) -> Result<&mut Self, BindError> {
		let callable = self.callable(name);
		self.bind_property(Property {
			name: name.into(),
			policy: select(V::KIND),
			get: Arc::new(move |this| Ok(this.read(|native: &T| get(native))?.into_value())),
			set: Some(Arc::new(move |this, value| {
				let value = Args::new(&callable, std::slice::from_ref(value)).get::<V>(0)?;
				this.write(|native: &mut T| set(native, value))
			})),
		})
	}

	/// Applies a fragment and records the capabilities it provides.
	pub fn apply<F: Fragment<T>>(&mut self, fragment: F) -> Result<&mut Self, BindError> {
		let name = fragment.name();
		fragment.apply(self)?;
		self.capabilities |= F::PROVIDES;
		tracing::trace!(class = %self.spec.name, fragment = name, "fragment applied");
		Ok(self)
	}

	pub(crate) fn finish(self) -> (Arc<Class>, CapabilitySet) {
		(Class::new(self.spec), self.capabilities)
	}
}

fn method_fn(callable: String, call: impl Fn(&Arc<Object>, &Args<'_>) -> Result<Value, RuntimeError> + Send + Sync + 'static) -> MethodFn {
	Arc::new(move |this: &Arc<Object>, values: &[Value]| call(this, &Args::new(&callable, values)))
}
