//! Instances of exposed classes and the storage behind them.
//!
//! # Storage
//!
//! | Kind | Holds | Lifetime |
//! |---|---|---|
//! | owned | the native value behind a lock | the instance |
//! | internal borrow | a projection into another instance + a strong ref to it | keeps the owner alive |
//! | external borrow | a `'static` shared cell | independent of any instance |
//!
//! # Invariants
//!
//! - A borrowed instance must keep its owner reachable for as long as it is reachable.
//!   - Enforced in: [`Object::borrow_internal`] (stores `Arc<Object>` of the owner).
//!   - Failure symptom: use-after-free through the view.
//! - At most one live wrapper exists per borrowed (address, native type, writability).
//!   A read-only and a read/write view of one field are separate wrappers.
//!   - Enforced in: the borrowed-instance map consulted by [`Object::borrow_internal`] and
//!     [`Object::borrow_external`].
//!   - Failure symptom: two runtime objects for one native object, breaking identity equality.
//! - Serials are never reused within a process.
//!   - Enforced in: `NEXT_SERIAL` (monotonic atomic counter).

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Weak};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::class::{Class, NativeBox};
use crate::error::RuntimeError;
use crate::value::Value;

/// Maps a parent's native value to a sub-object it owns.
pub trait Projection: Send + Sync {
	fn project<'a>(&self, parent: &'a dyn Any) -> Option<&'a dyn Any>;
	fn project_mut<'a>(&self, parent: &'a mut dyn Any) -> Option<&'a mut dyn Any>;
	fn is_writable(&self) -> bool;
}

/// Native state that lives outside every instance, typically in a `static`.
pub trait SharedCell: Send + Sync {
	fn with_ref(&self, f: &mut dyn FnMut(&dyn Any));
	fn with_mut(&self, f: &mut dyn FnMut(&mut dyn Any));
}

impl<T: Any + Send + Sync> SharedCell for RwLock<T> {
	fn with_ref(&self, f: &mut dyn FnMut(&dyn Any)) {
		let guard = self.read_recursive();
		f(&*guard);
	}

	fn with_mut(&self, f: &mut dyn FnMut(&mut dyn Any)) {
		let mut guard = self.write();
		f(&mut *guard);
	}
}

enum Storage {
	Owned(RwLock<NativeBox>),
	Internal { owner: Arc<Object>, view: Arc<dyn Projection> },
	External(&'static dyn SharedCell),
}

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// (native address, native type, writable)
type BorrowKey = (usize, TypeId, bool);

static BORROWED: LazyLock<Mutex<FxHashMap<BorrowKey, Weak<Object>>>> = LazyLock::new(|| Mutex::new(FxHashMap::default()));

fn next_serial() -> u64 {
	NEXT_SERIAL.fetch_add(1, Ordering::Relaxed)
}

fn address_of(native: &dyn Any) -> usize {
	native as *const dyn Any as *const () as usize
}

/// A runtime instance of an exposed class.
pub struct Object {
	class: Arc<Class>,
	storage: Storage,
	serial: u64,
}

impl Object {
	pub(crate) fn owned(class: Arc<Class>, native: NativeBox) -> Arc<Self> {
		Arc::new(Self {
			class,
			storage: Storage::Owned(RwLock::new(native)),
			serial: next_serial(),
		})
	}

	/// Returns the wrapper for a sub-object of `owner`, creating it if none is live.
	///
	/// The wrapper holds `owner` alive. `class` must be the class of the projected type.
	pub fn borrow_internal(owner: &Arc<Object>, class: Arc<Class>, view: Arc<dyn Projection>) -> Result<Arc<Object>, RuntimeError> {
		let mut found = None;
		owner.with_native(&mut |parent: &dyn Any| {
			if let Some(sub) = view.project(parent) {
				found = Some((address_of(sub), sub.type_id()));
			}
		})?;
		let Some((address, native)) = found else {
			return Err(RuntimeError::NativeTypeMismatch {
				class: owner.class.name().to_string(),
				expected: "projection source",
			});
		};
		if native != class.native().id() {
			return Err(RuntimeError::NativeTypeMismatch {
				class: class.name().to_string(),
				expected: class.native().name(),
			});
		}
		Ok(Self::memoized((address, native, view.is_writable()), || Self {
			class,
			storage: Storage::Internal { owner: owner.clone(), view },
			serial: next_serial(),
		}))
	}

	/// Returns the wrapper for a shared cell, creating it if none is live.
	pub fn borrow_external(class: Arc<Class>, cell: &'static dyn SharedCell) -> Result<Arc<Object>, RuntimeError> {
		let mut found = None;
		cell.with_ref(&mut |native: &dyn Any| found = Some((address_of(native), native.type_id())));
		let Some((address, native)) = found.filter(|(_, id)| *id == class.native().id()) else {
			return Err(RuntimeError::NativeTypeMismatch {
				class: class.name().to_string(),
				expected: class.native().name(),
			});
		};
		Ok(Self::memoized((address, native, true), || Self {
			class,
			storage: Storage::External(cell),
			serial: next_serial(),
		}))
	}

	fn memoized(key: BorrowKey, make: impl FnOnce() -> Self) -> Arc<Self> {
		let mut borrowed = BORROWED.lock();
		if let Some(live) = borrowed.get(&key).and_then(Weak::upgrade) {
			tracing::trace!(class = %live.class.name(), serial = live.serial, "reusing live borrowed wrapper");
			return live;
		}
		borrowed.retain(|_, weak| weak.strong_count() > 0);
		let obj = Arc::new(make());
		borrowed.insert(key, Arc::downgrade(&obj));
		obj
	}

	pub fn class(&self) -> &Arc<Class> {
		&self.class
	}

	/// Process-unique serial assigned when this runtime object was created.
	pub fn serial(&self) -> u64 {
		self.serial
	}

	pub fn is_owned(&self) -> bool {
		matches!(self.storage, Storage::Owned(_))
	}

	pub fn is_external(&self) -> bool {
		matches!(self.storage, Storage::External(_))
	}

	/// The instance this one borrows from, if any.
	pub fn owner(&self) -> Option<&Arc<Object>> {
		match &self.storage {
			Storage::Internal { owner, .. } => Some(owner),
			_ => None,
		}
	}

	/// Follows the owner chain to the instance that owns the storage.
	pub fn root(self: &Arc<Self>) -> Arc<Object> {
		let mut cur = self.clone();
		while let Some(owner) = cur.owner().cloned() {
			cur = owner;
		}
		cur
	}

	/// Address of the native value this object resolves to.
	pub fn address(&self) -> Result<usize, RuntimeError> {
		let mut address = 0;
		self.with_native(&mut |native: &dyn Any| address = address_of(native))?;
		Ok(address)
	}

	/// Size in bytes of the native value this object resolves to.
	pub fn native_size(&self) -> Result<usize, RuntimeError> {
		let mut size = 0;
		self.with_native(&mut |native: &dyn Any| size = std::mem::size_of_val(native))?;
		Ok(size)
	}

	/// Runs `f` against the native value, which must be a `T`.
	pub fn read<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, RuntimeError> {
		let mut f = Some(f);
		let mut out = None;
		self.with_native(&mut |native: &dyn Any| {
			if let Some(value) = native.downcast_ref::<T>()
				&& let Some(f) = f.take()
			{
				out = Some(f(value));
			}
		})?;
		out.ok_or_else(|| self.type_mismatch::<T>())
	}

	/// Runs `f` against the native value mutably, which must be a `T`.
	pub fn write<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, RuntimeError> {
		let mut f = Some(f);
		let mut out = None;
		self.with_native_mut(&mut |native: &mut dyn Any| {
			if let Some(value) = native.downcast_mut::<T>()
				&& let Some(f) = f.take()
			{
				out = Some(f(value));
			}
		})?;
		out.ok_or_else(|| self.type_mismatch::<T>())
	}

	fn with_native(&self, f: &mut dyn FnMut(&dyn Any)) -> Result<(), RuntimeError> {
		match &self.storage {
			Storage::Owned(cell) => {
				// argument conversion may read a view of an object already read-locked on this thread
				let guard = cell.read_recursive();
				f(&**guard);
				Ok(())
			}
			Storage::Internal { owner, view } => {
				let mut projected = false;
				owner.with_native(&mut |parent: &dyn Any| {
					if let Some(sub) = view.project(parent) {
						projected = true;
						f(sub);
					}
				})?;
				if projected { Ok(()) } else { Err(self.type_mismatch::<()>()) }
			}
			Storage::External(cell) => {
				cell.with_ref(f);
				Ok(())
			}
		}
	}

	fn with_native_mut(&self, f: &mut dyn FnMut(&mut dyn Any)) -> Result<(), RuntimeError> {
		match &self.storage {
			Storage::Owned(cell) => {
				let mut guard = cell.write();
				f(&mut **guard);
				Ok(())
			}
			Storage::Internal { owner, view } => {
				if !view.is_writable() {
					return Err(RuntimeError::ReadOnly {
						class: self.class.name().to_string(),
					});
				}
				let mut projected = false;
				owner.with_native_mut(&mut |parent: &mut dyn Any| {
					if let Some(sub) = view.project_mut(parent) {
						projected = true;
						f(sub);
					}
				})?;
				if projected { Ok(()) } else { Err(self.type_mismatch::<()>()) }
			}
			Storage::External(cell) => {
				cell.with_mut(f);
				Ok(())
			}
		}
	}

	fn type_mismatch<T>(&self) -> RuntimeError {
		RuntimeError::NativeTypeMismatch {
			class: self.class.name().to_string(),
			expected: type_name::<T>(),
		}
	}

	/// Calls a bound method, trying overloads in declaration order.
	pub fn call(self: &Arc<Self>, name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
		let Some(overloads) = self.class.methods(name) else {
			return Err(RuntimeError::Attribute {
				owner: self.class.name().to_string(),
				name: name.to_string(),
			});
		};
		tracing::trace!(class = %self.class.name(), method = name, serial = self.serial, "dispatch");
		let mut last_mismatch = None;
		for method in overloads {
			match method.invoke(self, args) {
				Err(e) if e.is_mismatch() => last_mismatch = Some(e),
				other => return other,
			}
		}
		match last_mismatch {
			Some(e) if overloads.len() == 1 => Err(e),
			_ => Err(RuntimeError::NoMatchingOverload {
				callable: format!("{}.{}", self.class.name(), name),
				tried: overloads.len(),
			}),
		}
	}

	/// Reads a property.
	pub fn get(self: &Arc<Self>, name: &str) -> Result<Value, RuntimeError> {
		let prop = self.property(name)?;
		let out = (prop.get)(self)?;
		if !prop.policy.admits(self, &out) {
			return Err(RuntimeError::PolicyViolation {
				callable: format!("{}.{}", self.class.name(), name),
				policy: prop.policy,
			});
		}
		Ok(out)
	}

	/// Writes a property.
	pub fn set(self: &Arc<Self>, name: &str, value: Value) -> Result<(), RuntimeError> {
		let prop = self.property(name)?;
		let Some(set) = &prop.set else {
			return Err(RuntimeError::ReadOnlyProperty {
				class: self.class.name().to_string(),
				name: name.to_string(),
			});
		};
		set(self, &value)
	}

	fn property(&self, name: &str) -> Result<&crate::class::Property, RuntimeError> {
		self.class.property(name).ok_or_else(|| RuntimeError::Attribute {
			owner: self.class.name().to_string(),
			name: name.to_string(),
		})
	}
}

impl fmt::Debug for Object {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let storage = match self.storage {
			Storage::Owned(_) => "owned",
			Storage::Internal { .. } => "internal",
			Storage::External(_) => "external",
		};
		f.debug_struct("Object")
			.field("class", &self.class.name())
			.field("serial", &self.serial)
			.field("storage", &storage)
			.finish()
	}
}
