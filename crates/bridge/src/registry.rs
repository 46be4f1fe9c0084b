//! Registration guard: at most one exposed class per native type.
//!
//! # Purpose
//!
//! Make exposing a native type idempotent no matter how many independent call sites
//! ask for it.
//!
//! # Mental model
//!
//! * Readers load an immutable `Arc<Snapshot>` and look the type up lock-free.
//! * A writer that misses reserves the type's slot under the `pending` mutex, builds the
//!   class with the lock released, then publishes a new snapshot with an RCU update.
//! * A second writer that finds the slot reserved waits on `settled` and resolves to
//!   whatever the first one published.
//!
//! # Key types
//!
//! | Type | Meaning | Constraints | Constructed / mutated in |
//! |---|---|---|---|
//! | [`TypeRegistry`] | Registration table plus link ledger | Entries are never removed or replaced | [`TypeRegistry::register_or_get`] |
//! | [`ExposedType`] | Published class, capabilities and ordinal | Immutable once published | [`TypeRegistry::register_or_get`] |
//! | [`Registration`] | Result of a registration request | `created` is true for exactly one request per type | [`TypeRegistry::register_or_get`] |
//!
//! # Invariants
//!
//! - For each native type at most one class is ever published.
//!   - Enforced in: [`TypeRegistry::register_or_get`] (slot reservation before build).
//!   - Tested by: `invariants::test_single_publication_under_contention`.
//!   - Failure symptom: two class objects for one native type; links disagree on identity.
//! - A failed build publishes nothing and frees its slot.
//!   - Enforced in: `Reservation::drop`.
//!   - Tested by: `invariants::test_failed_build_rolls_back`.
//!   - Failure symptom: later callers observe a partially bound class, or block forever.
//! - Once frozen, the table only answers lookups.
//!   - Enforced in: [`TypeRegistry::register_or_get`] (checked after the lookup).
//!   - Tested by: `invariants::test_frozen_registry_still_resolves`.
//!
//! # Lifecycle
//!
//! 1. Registration phase: `register_or_get` populates the table, possibly from several threads.
//! 2. [`TypeRegistry::freeze`] ends the phase.
//! 3. Read-only phase: lookups only.
//!
//! # Failure modes & recovery
//!
//! * Build errors (including a missing dependency type) roll back and are returned as-is.
//! * A build that registers its own type again gets [`BindError::Reentrant`] instead of deadlocking.
//! * A panicking build releases its slot while unwinding; waiters then retry the build.

use std::any::{TypeId, type_name};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Weak};
use std::thread::{self, ThreadId};

use algebind_runtime::Class;
use arc_swap::ArcSwap;
use indexmap::IndexMap;
use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;

use crate::builder::ClassBuilder;
use crate::capability::CapabilitySet;
use crate::error::BindError;
use crate::traits::Native;

/// A class published in the registry.
#[derive(Debug, Clone)]
pub struct ExposedType {
	pub class: Arc<Class>,
	pub capabilities: CapabilitySet,
	/// Publication order, starting at zero.
	pub ordinal: usize,
}

#[derive(Debug, Clone)]
pub struct Registration {
	pub handle: Arc<Class>,
	/// True only for the request that built the class.
	pub created: bool,
}

/// A name bound to a class by the symbolic linker.
#[derive(Debug, Clone)]
pub struct LinkRecord {
	pub scope: String,
	pub name: String,
	pub class: Weak<Class>,
}

#[derive(Default, Clone)]
struct Snapshot {
	types: FxHashMap<TypeId, ExposedType>,
}

pub struct TypeRegistry {
	label: &'static str,
	snap: ArcSwap<Snapshot>,
	pending: Mutex<FxHashMap<TypeId, ThreadId>>,
	settled: Condvar,
	frozen: AtomicBool,
	links: Mutex<IndexMap<(String, String), Weak<Class>>>,
}

static GLOBAL: LazyLock<TypeRegistry> = LazyLock::new(|| TypeRegistry::new("global"));

/// Holds a type's slot while its class is built. Releasing it wakes waiters.
struct Reservation<'r> {
	registry: &'r TypeRegistry,
	key: TypeId,
}

impl Drop for Reservation<'_> {
	fn drop(&mut self) {
		self.registry.pending.lock().remove(&self.key);
		self.registry.settled.notify_all();
	}
}

impl TypeRegistry {
	pub fn new(label: &'static str) -> Self {
		Self {
			label,
			snap: ArcSwap::from_pointee(Snapshot::default()),
			pending: Mutex::new(FxHashMap::default()),
			settled: Condvar::new(),
			frozen: AtomicBool::new(false),
			links: Mutex::new(IndexMap::new()),
		}
	}

	/// The process-wide registry.
	pub fn global() -> &'static TypeRegistry {
		&GLOBAL
	}

	pub fn label(&self) -> &'static str {
		self.label
	}

	fn lookup(&self, key: TypeId) -> Option<ExposedType> {
		self.snap.load().types.get(&key).cloned()
	}

	/// Returns the class exposed for `T`, building it with `build` if there is none yet.
	///
	/// Exactly one request per type observes `created == true`. `build` runs without
	/// any registry lock held, so it may register other types (for example the types
	/// its bindings return). If `build` fails nothing is published.
	pub fn register_or_get<T: Native>(&self, name: &str, build: impl FnOnce(&mut ClassBuilder<'_, T>) -> Result<(), BindError>) -> Result<Registration, BindError> {
		let key = TypeId::of::<T>();
		if let Some(existing) = self.lookup(key) {
			return Ok(self.resolved::<T>(existing));
		}

		let me = thread::current().id();
		let mut pending = self.pending.lock();
		loop {
			if let Some(existing) = self.lookup(key) {
				drop(pending);
				return Ok(self.resolved::<T>(existing));
			}
			match pending.get(&key) {
				Some(owner) if *owner == me => return Err(BindError::Reentrant { type_name: type_name::<T>() }),
				Some(_) => self.settled.wait(&mut pending),
				None => break,
			}
		}
		if self.is_frozen() {
			return Err(BindError::Frozen {
				registry: self.label,
				type_name: type_name::<T>(),
			});
		}
		pending.insert(key, me);
		drop(pending);
		let reservation = Reservation { registry: self, key };

		let mut builder = ClassBuilder::<T>::new(self, name)?;
		if let Err(err) = build(&mut builder) {
			tracing::warn!(registry = self.label, class = name, native = type_name::<T>(), error = %err, "registration rolled back");
			return Err(err);
		}
		let (class, capabilities) = builder.finish();

		self.snap.rcu(|current| {
			let mut next = Snapshot::clone(current);
			let ordinal = next.types.len();
			next.types.insert(
				key,
				ExposedType {
					class: class.clone(),
					capabilities,
					ordinal,
				},
			);
			next
		});
		drop(reservation);

		tracing::debug!(registry = self.label, class = name, native = type_name::<T>(), ?capabilities, "registration created");
		Ok(Registration { handle: class, created: true })
	}

	fn resolved<T>(&self, existing: ExposedType) -> Registration {
		tracing::trace!(registry = self.label, class = %existing.class.name(), native = type_name::<T>(), "duplicate registration resolved");
		Registration {
			handle: existing.class,
			created: false,
		}
	}

	/// Ends the registration phase. Lookups keep working; new types are refused.
	pub fn freeze(&self) {
		if !self.frozen.swap(true, Ordering::AcqRel) {
			tracing::info!(registry = self.label, types = self.len(), "registry frozen");
		}
	}

	pub fn is_frozen(&self) -> bool {
		self.frozen.load(Ordering::Acquire)
	}

	pub fn get<T: Native>(&self) -> Option<ExposedType> {
		self.lookup(TypeId::of::<T>())
	}

	pub fn class_of<T: Native>(&self) -> Option<Arc<Class>> {
		self.get::<T>().map(|exposed| exposed.class)
	}

	pub fn contains<T: Native>(&self) -> bool {
		self.snap.load().types.contains_key(&TypeId::of::<T>())
	}

	/// True if `class` is the published class of some type in this registry.
	pub fn owns(&self, class: &Arc<Class>) -> bool {
		self.snap.load().types.get(&class.native().id()).is_some_and(|exposed| Arc::ptr_eq(&exposed.class, class))
	}

	pub fn len(&self) -> usize {
		self.snap.load().types.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Every exposed type, in publication order.
	pub fn exposed(&self) -> Vec<ExposedType> {
		let mut all: Vec<_> = self.snap.load().types.values().cloned().collect();
		all.sort_by_key(|exposed| exposed.ordinal);
		all
	}

	pub(crate) fn record_link(&self, scope: &str, name: &str, class: &Arc<Class>) {
		self.links.lock().insert((scope.to_string(), name.to_string()), Arc::downgrade(class));
	}

	/// Every link made through this registry, in link order.
	pub fn links(&self) -> Vec<LinkRecord> {
		self.links
			.lock()
			.iter()
			.map(|((scope, name), class)| LinkRecord {
				scope: scope.clone(),
				name: name.clone(),
				class: class.clone(),
			})
			.collect()
	}

	/// Names a class is linked under, as `scope.name`.
	pub fn link_names(&self, class: &Arc<Class>) -> Vec<String> {
		self.links
			.lock()
			.iter()
			.filter(|(_, linked)| linked.upgrade().is_some_and(|linked| Arc::ptr_eq(&linked, class)))
			.map(|((scope, name), _)| format!("{scope}.{name}"))
			.collect()
	}
}

impl std::fmt::Debug for TypeRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TypeRegistry")
			.field("label", &self.label)
			.field("types", &self.len())
			.field("frozen", &self.is_frozen())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod tests;
