use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use crate::error::BindError;
use crate::fragments::Shape;
use crate::registry::TypeRegistry;
use crate::traits::Dimensions;

#[derive(Debug, Default)]
struct Sample<const N: usize>;

impl<const N: usize> Dimensions for Sample<N> {
	fn rows(&self) -> usize {
		N
	}

	fn cols(&self) -> usize {
		N
	}
}

struct Unexposed;

/// Invariant: For each native type at most one class is ever published.
///
/// Concurrent first requests MUST build once and all resolve to the published class.
pub(crate) fn inv_single_publication_under_contention() {
	const THREADS: usize = 8;
	let registry = TypeRegistry::new("contention");
	let builds = AtomicUsize::new(0);
	let barrier = Barrier::new(THREADS);

	let results: Vec<_> = thread::scope(|s| {
		let handles: Vec<_> = (0..THREADS)
			.map(|_| {
				s.spawn(|| {
					barrier.wait();
					registry
						.register_or_get::<Sample<4>>("Sample", |class| {
							builds.fetch_add(1, Ordering::SeqCst);
							thread::sleep(Duration::from_millis(5));
							class.apply(Shape)?;
							Ok(())
						})
						.unwrap()
				})
			})
			.collect();
		handles.into_iter().map(|h| h.join().unwrap()).collect()
	});

	assert_eq!(builds.load(Ordering::SeqCst), 1, "class must be built exactly once");
	assert_eq!(results.iter().filter(|r| r.created).count(), 1);
	let first = &results[0].handle;
	assert!(results.iter().all(|r| Arc::ptr_eq(&r.handle, first)), "every caller must see one class");
	assert_eq!(registry.len(), 1);
}

#[cfg_attr(test, test)]
pub(crate) fn test_single_publication_under_contention() {
	inv_single_publication_under_contention()
}

/// Invariant: A failed build publishes nothing and frees its slot.
pub(crate) fn inv_failed_build_rolls_back() {
	let registry = TypeRegistry::new("rollback");

	let err = registry
		.register_or_get::<Sample<2>>("Sample", |class| {
			class.apply(Shape)?;
			class.def_owned::<Unexposed>("unexposed", |_, _| Ok(Unexposed))?;
			Ok(())
		})
		.unwrap_err();
	assert!(matches!(err, BindError::UnregisteredType { .. }), "got {err:?}");
	assert!(!registry.contains::<Sample<2>>(), "partial class must not be published");

	let retry = registry
		.register_or_get::<Sample<2>>("Sample", |class| {
			class.apply(Shape)?;
			Ok(())
		})
		.unwrap();
	assert!(retry.created, "slot must be free after rollback");
	assert!(retry.handle.has_attr("rows"));
	assert!(!retry.handle.has_attr("unexposed"));
}

#[cfg_attr(test, test)]
pub(crate) fn test_failed_build_rolls_back() {
	inv_failed_build_rolls_back()
}

/// Invariant: A panicking build MUST release its slot while unwinding.
pub(crate) fn inv_panicking_build_releases_slot() {
	let registry = TypeRegistry::new("panic");

	let outcome = catch_unwind(AssertUnwindSafe(|| registry.register_or_get::<Sample<3>>("Sample", |_| panic!("build exploded"))));
	assert!(outcome.is_err());
	assert!(!registry.contains::<Sample<3>>());

	let retry = registry.register_or_get::<Sample<3>>("Sample", |_| Ok(())).unwrap();
	assert!(retry.created);
}

#[cfg_attr(test, test)]
pub(crate) fn test_panicking_build_releases_slot() {
	inv_panicking_build_releases_slot()
}

/// Invariant: A build that requests its own type MUST fail instead of deadlocking.
pub(crate) fn inv_reentrant_build_is_rejected() {
	let registry = TypeRegistry::new("reentrant");

	let err = registry
		.register_or_get::<Sample<5>>("Sample", |class| {
			class.registry().register_or_get::<Sample<5>>("Again", |_| Ok(()))?;
			Ok(())
		})
		.unwrap_err();
	assert!(matches!(err, BindError::Reentrant { .. }), "got {err:?}");
	assert!(registry.is_empty());
}

#[cfg_attr(test, test)]
pub(crate) fn test_reentrant_build_is_rejected() {
	inv_reentrant_build_is_rejected()
}

/// Invariant: Once frozen, the table only answers lookups.
pub(crate) fn inv_frozen_registry_still_resolves() {
	let registry = TypeRegistry::new("frozen");
	let first = registry.register_or_get::<Sample<1>>("Sample", |_| Ok(())).unwrap();
	registry.freeze();
	assert!(registry.is_frozen());

	let again = registry.register_or_get::<Sample<1>>("Sample", |_| Ok(())).unwrap();
	assert!(!again.created);
	assert!(Arc::ptr_eq(&first.handle, &again.handle));

	let err = registry.register_or_get::<Sample<6>>("Other", |_| Ok(())).unwrap_err();
	assert_eq!(
		err,
		BindError::Frozen {
			registry: "frozen",
			type_name: std::any::type_name::<Sample<6>>(),
		}
	);
}

#[cfg_attr(test, test)]
pub(crate) fn test_frozen_registry_still_resolves() {
	inv_frozen_registry_still_resolves()
}

/// Invariant: Distinct instantiations of one generic type MUST get distinct classes.
pub(crate) fn inv_instantiations_are_distinct_identities() {
	let registry = TypeRegistry::new("instantiations");
	let a = registry.register_or_get::<Sample<7>>("Sample7", |_| Ok(())).unwrap();
	let b = registry.register_or_get::<Sample<8>>("Sample8", |_| Ok(())).unwrap();
	assert!(a.created && b.created);
	assert!(!Arc::ptr_eq(&a.handle, &b.handle));
	assert_eq!(registry.len(), 2);
}

#[cfg_attr(test, test)]
pub(crate) fn test_instantiations_are_distinct_identities() {
	inv_instantiations_are_distinct_identities()
}
