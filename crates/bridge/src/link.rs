//! Symbolic linker: binds an already exposed class under more names.
//!
//! Linking never creates a class. Every name a class is linked under resolves to the
//! same `Arc<Class>`, so instances built through any of them are interchangeable.

use std::sync::Arc;

use algebind_runtime::{Attr, Class, Module};

use crate::builder::{ClassBuilder, validate_name};
use crate::error::BindError;
use crate::registry::{Registration, TypeRegistry};
use crate::traits::Native;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
	Linked,
	/// `name` was already bound to this very class.
	AlreadyLinked,
}

/// Binds `name` in `scope` to `handle`, which must be published in `registry`.
pub fn link(registry: &TypeRegistry, handle: &Arc<Class>, scope: &Module, name: &str) -> Result<LinkOutcome, BindError> {
	validate_name(name)?;
	if !registry.owns(handle) {
		return Err(BindError::UnregisteredType {
			type_name: handle.native().name(),
			needed_by: format!("link {}.{name}", scope.qualified_name()),
		});
	}
	match scope.try_bind(name, Attr::Class(handle.clone())) {
		Ok(()) => {
			registry.record_link(scope.qualified_name(), name, handle);
			tracing::debug!(scope = scope.qualified_name(), name, class = %handle.name(), "linked");
			Ok(LinkOutcome::Linked)
		}
		Err(Attr::Class(existing)) if Arc::ptr_eq(&existing, handle) => Ok(LinkOutcome::AlreadyLinked),
		Err(existing) => Err(BindError::NameTaken {
			scope: scope.qualified_name().to_string(),
			name: name.to_string(),
			kind: existing.kind(),
		}),
	}
}

/// Links the class exposed for `T`, if any. Returns `false` when `T` is not exposed yet.
pub fn link_registered<T: Native>(registry: &TypeRegistry, scope: &Module, name: &str) -> Result<bool, BindError> {
	let Some(handle) = registry.class_of::<T>() else {
		return Ok(false);
	};
	link(registry, &handle, scope, name)?;
	Ok(true)
}

/// Registers `T` if needed, then links it as `name` in `scope`.
///
/// When `T` is already exposed, `build` does not run and the existing class is linked
/// under the new name.
pub fn expose<T: Native>(
	registry: &TypeRegistry,
	scope: &Module,
	name: &str,
	build: impl FnOnce(&mut ClassBuilder<'_, T>) -> Result<(), BindError>,
) -> Result<Registration, BindError> {
	let registration = registry.register_or_get::<T>(name, build)?;
	link(registry, &registration.handle, scope, name)?;
	Ok(registration)
}
