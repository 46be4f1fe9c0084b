use std::sync::Arc;

use algebind_runtime::{Attr, Module, Value};
use pretty_assertions::assert_eq;

use crate::capability::{Capability, CapabilitySet};
use crate::error::BindError;
use crate::fragments::{Identity, Shape};
use crate::link::{LinkOutcome, expose, link, link_registered};
use crate::registry::TypeRegistry;
use crate::traits::Dimensions;

#[derive(Debug, Default)]
struct Grid {
	rows: usize,
	cols: usize,
}

impl Dimensions for Grid {
	fn rows(&self) -> usize {
		self.rows
	}

	fn cols(&self) -> usize {
		self.cols
	}
}

#[derive(Debug, Default)]
struct Marker;

fn expose_grid(registry: &TypeRegistry, scope: &Module, name: &str) -> Result<crate::Registration, BindError> {
	expose::<Grid>(registry, scope, name, |class| {
		class.init("(rows, cols)", |args| {
			args.expect_arity(2)?;
			Ok(Grid {
				rows: args.get(0)?,
				cols: args.get(1)?,
			})
		});
		class.apply((Shape, Identity::default()))?;
		Ok(())
	})
}

#[test]
fn test_second_request_resolves_without_building() {
	let registry = TypeRegistry::new("t");
	let first = registry.register_or_get::<Grid>("Grid", |class| {
		class.apply(Shape)?;
		Ok(())
	});
	let first = first.unwrap();
	let second = registry
		.register_or_get::<Grid>("Ignored", |_| panic!("an exposed type must not be rebuilt"))
		.unwrap();

	assert!(first.created);
	assert!(!second.created);
	assert!(Arc::ptr_eq(&first.handle, &second.handle));
	assert_eq!(second.handle.name(), "Grid");
}

#[test]
fn test_capabilities_are_recorded() {
	let registry = TypeRegistry::new("t");
	registry
		.register_or_get::<Grid>("Grid", |class| {
			class.apply((Shape, Identity::default()))?;
			Ok(())
		})
		.unwrap();

	let exposed = registry.get::<Grid>().unwrap();
	assert_eq!(exposed.capabilities, CapabilitySet::DIMENSIONS | CapabilitySet::IDENTITY);
	assert_eq!(exposed.capabilities.capabilities().collect::<Vec<_>>(), vec![Capability::Dimensions, Capability::Identity]);
}

#[test]
fn test_exposed_is_in_publication_order() {
	let registry = TypeRegistry::new("t");
	registry.register_or_get::<Marker>("Marker", |_| Ok(())).unwrap();
	registry.register_or_get::<Grid>("Grid", |_| Ok(())).unwrap();

	let names: Vec<_> = registry.exposed().iter().map(|e| e.class.name().to_string()).collect();
	assert_eq!(names, vec!["Marker", "Grid"]);
	assert_eq!(registry.exposed()[1].ordinal, 1);
}

#[test]
fn test_invalid_class_name_is_rejected() {
	let registry = TypeRegistry::new("t");
	let err = registry.register_or_get::<Grid>("1Grid", |_| Ok(())).unwrap_err();
	assert_eq!(err, BindError::InvalidName { name: "1Grid".into() });
	assert!(registry.is_empty());
}

#[test]
fn test_link_under_second_name_shares_the_class() {
	let registry = TypeRegistry::new("t");
	let m = Module::new("m");
	let m2 = Module::new("m2");
	let first = expose_grid(&registry, &m, "Grid").unwrap();
	let second = expose_grid(&registry, &m2, "Lattice").unwrap();

	assert!(first.created);
	assert!(!second.created);
	assert!(Arc::ptr_eq(&m.class("Grid").unwrap(), &m2.class("Lattice").unwrap()));

	let a = m.construct("Grid", &[Value::Int(2), Value::Int(3)]).unwrap();
	let b = m2.construct("Lattice", &[Value::Int(2), Value::Int(3)]).unwrap();
	assert!(Arc::ptr_eq(a.class(), b.class()));
	assert_ne!(a.call("id", &[]).unwrap(), b.call("id", &[]).unwrap());
	assert_eq!(registry.link_names(&first.handle), vec!["m.Grid", "m2.Lattice"]);
}

#[test]
fn test_relinking_same_name_is_a_no_op() {
	let registry = TypeRegistry::new("t");
	let m = Module::new("m");
	let reg = expose_grid(&registry, &m, "Grid").unwrap();
	assert_eq!(link(&registry, &reg.handle, &m, "Grid").unwrap(), LinkOutcome::AlreadyLinked);
	assert_eq!(registry.links().len(), 1);
}

#[test]
fn test_link_refuses_taken_names() {
	let registry = TypeRegistry::new("t");
	let m = Module::new("m");
	m.set_attr("Grid", Attr::Value(Value::Int(1)));
	let reg = registry.register_or_get::<Grid>("Grid", |_| Ok(())).unwrap();

	let err = link(&registry, &reg.handle, &m, "Grid").unwrap_err();
	assert_eq!(
		err,
		BindError::NameTaken {
			scope: "m".into(),
			name: "Grid".into(),
			kind: "value",
		}
	);
	assert_eq!(m.value("Grid").unwrap(), Value::Int(1));
}

#[test]
fn test_link_requires_a_registered_handle() {
	let registry = TypeRegistry::new("t");
	let other = TypeRegistry::new("other");
	let m = Module::new("m");
	let foreign = other.register_or_get::<Grid>("Grid", |_| Ok(())).unwrap();

	assert!(matches!(link(&registry, &foreign.handle, &m, "Grid"), Err(BindError::UnregisteredType { .. })));
	assert!(!m.contains("Grid"));
}

#[test]
fn test_link_registered_reports_absence() {
	let registry = TypeRegistry::new("t");
	let m = Module::new("m");
	assert!(!link_registered::<Grid>(&registry, &m, "Grid").unwrap());
	assert!(!m.contains("Grid"));

	registry.register_or_get::<Grid>("Grid", |_| Ok(())).unwrap();
	assert!(link_registered::<Grid>(&registry, &m, "Alias").unwrap());
	assert!(m.contains("Alias"));
}
