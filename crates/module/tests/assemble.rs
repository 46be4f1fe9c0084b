//! End-to-end behavior of the assembled module, driven through the runtime.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use algebind::bridge::runtime::{Module, NdArray, Object, RuntimeError, Value};
use algebind::bridge::{BindError, CapabilitySet, IdentityStrategy, Preconditioned, TypeRegistry};
use algebind::linalg::{ComputationInfo, ConjugateGradient, HouseholderQr, Llt, SelfAdjointEigenSolver};
use algebind::{Alias, AssemblyConfig, AssemblyError, Groups, VERSION, assemble};
use approx::assert_relative_eq;
use nalgebra::{DMatrix, DVector};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

fn matrix(m: &DMatrix<f64>) -> Value {
	Value::Array(NdArray::matrix(m.nrows(), m.ncols(), m.as_slice().to_vec()).unwrap())
}

fn vector(v: &DVector<f64>) -> Value {
	Value::Array(NdArray::vector(v.as_slice().to_vec()))
}

fn to_dvector(value: &Value) -> DVector<f64> {
	let array = value.as_array().unwrap();
	assert!(array.is_vector(), "expected a vector, got {}", array.shape());
	DVector::from_column_slice(array.data())
}

fn to_dmatrix(value: &Value) -> DMatrix<f64> {
	let array = value.as_array().unwrap();
	DMatrix::from_column_slice(array.rows(), array.cols(), array.data())
}

fn object(value: Value) -> Arc<Object> {
	value.into_object().unwrap()
}

fn spd(n: usize) -> DMatrix<f64> {
	DMatrix::from_fn(n, n, |r, c| if r == c { 4.0 + r as f64 } else { 1.0 / (1.0 + r.abs_diff(c) as f64) })
}

fn info(info: ComputationInfo) -> Value {
	Value::Enum(info.to_enum())
}

/// Runs `f` on its own thread and fails if it has not finished within five seconds.
fn within<R: Send + 'static>(f: impl FnOnce() -> R + Send + 'static) -> R {
	let (tx, rx) = mpsc::channel();
	thread::spawn(move || {
		let _ = tx.send(f());
	});
	rx.recv_timeout(Duration::from_secs(5)).expect("call did not return")
}

fn assembled() -> (TypeRegistry, Arc<Module>) {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
	let registry = TypeRegistry::new("test");
	let module = assemble(&registry, &AssemblyConfig::default()).unwrap();
	(registry, module)
}

#[test]
fn test_default_layout() {
	let (registry, root) = assembled();
	for name in ["Matrix", "LLT", "PartialPivLU", "HouseholderQR", "JacobiSVD", "SelfAdjointEigenSolver"] {
		assert!(root.class(name).is_ok(), "missing class {name}");
	}
	assert_eq!(root.value("__version__").unwrap(), Value::Str(VERSION.into()));
	assert!(root.contains("is_approx"));
	assert_eq!(root.value("Success").unwrap(), info(ComputationInfo::Success));

	let solvers = root.submodule("solvers").unwrap();
	assert_eq!(solvers.qualified_name(), "algebind.solvers");
	for name in ["IterationDefaults", "IdentityPreconditioner", "DiagonalPreconditioner", "ConjugateGradient", "IdentityConjugateGradient"] {
		assert!(solvers.class(name).is_ok(), "missing class solvers.{name}");
	}
	assert_eq!(registry.len(), 11);
	assert_eq!(registry.exposed()[0].class.name(), "Matrix");
}

#[test]
fn test_computation_info_namespace() {
	let (_registry, root) = assembled();
	let namespace = root.submodule("ComputationInfo").unwrap();
	for member in ComputationInfo::ALL {
		assert_eq!(namespace.value(member.name()).unwrap(), info(member));
	}
}

#[test]
fn test_llt_end_to_end() {
	let (_registry, root) = assembled();
	let a = spd(4);
	let llt = root.construct("LLT", &[matrix(&a)]).unwrap();
	assert_eq!(llt.call("info", &[]).unwrap(), root.submodule("ComputationInfo").unwrap().value("Success").unwrap());
	assert_eq!(llt.call("rows", &[]).unwrap(), Value::Int(4));

	let l = to_dmatrix(&llt.call("matrixL", &[]).unwrap());
	let u = to_dmatrix(&llt.call("matrixU", &[]).unwrap());
	assert_relative_eq!(&l * &u, a, epsilon = 1e-12);

	let x = DVector::from_fn(4, |i, _| i as f64 - 1.5);
	let x_est = llt.call("solve", &[vector(&(&a * &x))]).unwrap();
	assert_eq!(root.call_function("is_approx", &[x_est, vector(&x)]).unwrap(), Value::Bool(true));

	let xs = DMatrix::from_fn(4, 3, |r, c| (r * c) as f64 + 1.0);
	let xs_est = llt.call("solve", &[matrix(&(&a * &xs))]).unwrap();
	assert_eq!(xs_est.as_array().unwrap().shape().cols(), 3);
	assert_eq!(root.call_function("is_approx", &[xs_est, matrix(&xs)]).unwrap(), Value::Bool(true));
}

#[test]
fn test_constructor_overloads() {
	let (_registry, root) = assembled();
	let sized = root.construct("LLT", &[Value::Int(5)]).unwrap();
	assert_eq!(sized.call("rows", &[]).unwrap(), Value::Int(5));
	assert_eq!(sized.call("info", &[]).unwrap(), info(ComputationInfo::InvalidInput));

	let empty = root.construct("HouseholderQR", &[]).unwrap();
	assert_eq!(empty.call("cols", &[]).unwrap(), Value::Int(0));
	let shaped = root.construct("HouseholderQR", &[Value::Int(4), Value::Int(2)]).unwrap();
	assert!(shaped.read(|qr: &HouseholderQr| qr.matrix_r().is_err()).unwrap());

	let from_matrix_object = root.construct("Matrix", &[matrix(&spd(2))]).unwrap();
	let llt = root.construct("LLT", &[Value::Object(from_matrix_object)]).unwrap();
	assert_eq!(llt.call("info", &[]).unwrap(), info(ComputationInfo::Success));

	assert!(matches!(
		root.construct("LLT", &[Value::Str("nope".into())]),
		Err(RuntimeError::NoMatchingOverload { tried: 3, .. })
	));
}

#[test]
fn test_matrix_llt_view_is_tethered_and_read_only() {
	let (_registry, root) = assembled();
	let llt = root.construct("LLT", &[matrix(&spd(3))]).unwrap();
	let view = object(llt.call("matrixLLT", &[]).unwrap());

	assert!(Arc::ptr_eq(view.owner().unwrap(), &llt));
	assert!(Arc::ptr_eq(&view, &object(llt.call("matrixLLT", &[]).unwrap())), "live view is reused");
	assert_eq!(view.class().name(), "Matrix");
	assert_eq!(
		view.call("set", &[Value::Int(0), Value::Int(0), Value::Float(1.0)]),
		Err(RuntimeError::ReadOnly { class: "Matrix".into() })
	);

	let expected = llt.read(|llt: &Llt| llt.matrix_l().unwrap()).unwrap();
	assert_eq!(view.call("get", &[Value::Int(2), Value::Int(1)]).unwrap(), Value::Float(expected[(2, 1)]));

	// the view follows recomputation of its owner
	llt.call("compute", &[matrix(&DMatrix::identity(2, 2))]).unwrap();
	assert_eq!(view.call("rows", &[]).unwrap(), Value::Int(2));

	drop(llt);
	assert_eq!(view.call("get", &[Value::Int(1), Value::Int(1)]).unwrap(), Value::Float(1.0));
}

#[test]
fn test_solver_accepts_a_view_of_itself() {
	let (_registry, root) = assembled();
	let llt = root.construct("LLT", &[matrix(&spd(3))]).unwrap();
	let view = object(llt.call("matrixLLT", &[]).unwrap());

	let (llt, solved) = within(move || {
		let solved = llt.call("solve", &[Value::Object(view.clone())]).unwrap();
		let chained = llt.call("compute", &[Value::Object(view)]).unwrap();
		assert_eq!(chained, Value::Object(llt.clone()));
		(llt, solved)
	});
	assert_eq!(to_dmatrix(&solved).shape(), (3, 3));
	assert_eq!(llt.call("rows", &[]).unwrap(), Value::Int(3));
}

#[test]
fn test_copies_do_not_alias() {
	let (_registry, root) = assembled();
	let llt = root.construct("LLT", &[matrix(&spd(3))]).unwrap();
	let before = llt.call("matrixL", &[]).unwrap();
	llt.call("compute", &[matrix(&(spd(3) * 2.0))]).unwrap();
	assert_ne!(before, llt.call("matrixL", &[]).unwrap());

	let m = root.construct("Matrix", &[Value::Int(2), Value::Int(2)]).unwrap();
	let snapshot = m.call("to_array", &[]).unwrap();
	let chained = m.call("set", &[Value::Int(0), Value::Int(1), Value::Float(7.0)]).unwrap();
	assert_eq!(chained, Value::Object(m.clone()));
	assert_eq!(snapshot.as_array().unwrap().get(0, 1), Some(0.0));
	assert_eq!(m.call("get", &[Value::Int(0), Value::Int(1)]).unwrap(), Value::Float(7.0));
}

#[test]
fn test_native_errors_pass_through() {
	let (_registry, root) = assembled();
	let llt = root.construct("LLT", &[matrix(&DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]))]).unwrap();
	assert_eq!(llt.call("info", &[]).unwrap(), info(ComputationInfo::NumericalIssue));
	assert_eq!(
		llt.call("solve", &[vector(&DVector::zeros(2))]),
		Err(RuntimeError::Native {
			class: "LLT".into(),
			message: "LLT is not initialized, call compute() first".into(),
		})
	);

	let m = root.construct("Matrix", &[Value::Int(1), Value::Int(1)]).unwrap();
	assert!(matches!(m.call("get", &[Value::Int(3), Value::Int(0)]), Err(RuntimeError::Native { .. })));
}

#[test]
fn test_eigen_solver_has_a_narrower_surface() {
	let (registry, root) = assembled();
	let eig = root.construct("SelfAdjointEigenSolver", &[matrix(&DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 2.0]))]).unwrap();
	for missing in ["rows", "solve"] {
		assert!(matches!(eig.call(missing, &[]), Err(RuntimeError::Attribute { .. })), "{missing} must not be bound");
	}
	assert_relative_eq!(to_dvector(&eig.call("eigenvalues", &[]).unwrap()), DVector::from_column_slice(&[1.0, 3.0]), epsilon = 1e-12);

	let caps = registry.get::<SelfAdjointEigenSolver>().unwrap().capabilities;
	assert_eq!(caps, CapabilitySet::COMPUTE | CapabilitySet::IDENTITY);
	let llt_caps = registry.get::<Llt>().unwrap().capabilities;
	assert!(llt_caps.contains(caps | CapabilitySet::DIMENSIONS | CapabilitySet::SOLVE | CapabilitySet::MATRIX_SOLVE));
}

#[rstest]
#[case::partial_piv_lu("PartialPivLU")]
#[case::householder_qr("HouseholderQR")]
#[case::jacobi_svd("JacobiSVD")]
fn test_square_solvers_agree(#[case] class: &str) {
	let (_registry, root) = assembled();
	let a = spd(5) + DMatrix::from_fn(5, 5, |r, c| if c > r { 0.5 } else { 0.0 });
	let x = DVector::from_fn(5, |i, _| (i as f64).cos());
	let solver = root.construct(class, &[matrix(&a)]).unwrap();
	assert_eq!(solver.call("info", &[]).unwrap(), info(ComputationInfo::Success));
	let x_est = to_dvector(&solver.call("solve", &[vector(&(&a * &x))]).unwrap());
	assert_relative_eq!(x_est, x, epsilon = 1e-10);
}

#[test]
fn test_conjugate_gradient_end_to_end() {
	let (_registry, root) = assembled();
	let solvers = root.submodule("solvers").unwrap();
	let a = spd(6);
	let cg = solvers.construct("ConjugateGradient", &[matrix(&a)]).unwrap();
	assert_eq!(cg.call("maxIterations", &[]).unwrap(), Value::Int(12));

	let same = cg.call("setTolerance", &[Value::Float(1e-12)]).unwrap();
	assert_eq!(same, Value::Object(cg.clone()), "setters return the receiver");
	assert_eq!(cg.call("tolerance", &[]).unwrap(), Value::Float(1e-12));

	let x = DVector::from_fn(6, |i, _| 1.0 + i as f64);
	let x_est = to_dvector(&cg.call("solve", &[vector(&(&a * &x))]).unwrap());
	assert_relative_eq!(x_est, x, epsilon = 1e-9);
	assert_eq!(cg.call("info", &[]).unwrap(), info(ComputationInfo::Success));
	assert!(cg.call("iterations", &[]).unwrap().as_int().unwrap() > 0);
	assert!(cg.call("error", &[]).unwrap().as_float().unwrap() <= 1e-12);

	let warm = to_dvector(&cg.call("solveWithGuess", &[vector(&(&a * &x)), vector(&x)]).unwrap());
	assert_eq!(warm, x);
	assert_eq!(cg.call("iterations", &[]).unwrap(), Value::Int(0));
}

#[test]
fn test_iteration_limit_surfaces_no_convergence() {
	let (_registry, root) = assembled();
	let solvers = root.submodule("solvers").unwrap();
	let cg = solvers.construct("IdentityConjugateGradient", &[matrix(&spd(20))]).unwrap();
	cg.call("setMaxIterations", &[Value::Int(1)]).unwrap();
	cg.call("solve", &[vector(&DVector::from_element(20, 1.0))]).unwrap();
	assert_eq!(cg.call("info", &[]).unwrap(), info(ComputationInfo::NoConvergence));
	assert_eq!(cg.call("iterations", &[]).unwrap(), Value::Int(1));
}

#[test]
fn test_preconditioner_view_writes_through() {
	let (_registry, root) = assembled();
	let solvers = root.submodule("solvers").unwrap();
	let a = DMatrix::from_diagonal(&DVector::from_column_slice(&[2.0, 4.0]));
	let cg = solvers.construct("ConjugateGradient", &[matrix(&a)]).unwrap();

	let pre = object(cg.call("preconditioner", &[]).unwrap());
	assert!(Arc::ptr_eq(pre.owner().unwrap(), &cg));
	assert_eq!(pre.class().name(), "DiagonalPreconditioner");
	assert_eq!(to_dvector(&pre.call("inverseDiagonal", &[]).unwrap()), DVector::from_column_slice(&[0.5, 0.25]));

	let chained = pre.call("compute", &[matrix(&DMatrix::identity(2, 2))]).unwrap();
	assert_eq!(chained, Value::Object(pre.clone()));
	let seen = cg
		.read(|cg: &ConjugateGradient| cg.preconditioner().inverse_diagonal().clone())
		.unwrap();
	assert_eq!(seen, DVector::from_element(2, 1.0));

	drop(cg);
	assert_eq!(pre.call("rows", &[]).unwrap(), Value::Int(2), "view keeps the solver alive");
}

#[test]
fn test_is_approx_function() {
	let (_registry, root) = assembled();
	let a = spd(2);
	let nudged = &a + DMatrix::from_element(2, 2, 1e-6);
	let call = |args: &[Value]| root.call_function("is_approx", args);

	assert_eq!(call(&[matrix(&a), matrix(&a)]).unwrap(), Value::Bool(true));
	assert_eq!(call(&[matrix(&a), matrix(&nudged)]).unwrap(), Value::Bool(false));
	assert_eq!(call(&[matrix(&a), matrix(&nudged), Value::Float(1e-3)]).unwrap(), Value::Bool(true));
	assert_eq!(call(&[vector(&DVector::zeros(3)), vector(&DVector::zeros(3))]).unwrap(), Value::Bool(true));
	assert!(call(&[matrix(&a)]).is_err());
}

#[test]
fn test_aliases_link_existing_classes() {
	let registry = TypeRegistry::new("alias");
	let config = AssemblyConfig {
		aliases: vec![
			Alias {
				class: "LLT".into(),
				scope: "legacy.decompositions".into(),
				name: Some("Cholesky".into()),
			},
			Alias {
				class: "ConjugateGradient".into(),
				scope: "compat".into(),
				name: None,
			},
		],
		..AssemblyConfig::default()
	};
	let root = assemble(&registry, &config).unwrap();

	let llt = root.class("LLT").unwrap();
	assert!(Arc::ptr_eq(&root.resolve_class("legacy.decompositions.Cholesky").unwrap(), &llt));
	assert_eq!(registry.link_names(&llt), vec!["algebind.LLT", "algebind.legacy.decompositions.Cholesky"]);
	let cg = root.resolve_class("solvers.ConjugateGradient").unwrap();
	assert!(Arc::ptr_eq(&root.resolve_class("compat.ConjugateGradient").unwrap(), &cg));
	assert_eq!(registry.len(), 11, "aliases never create classes");
}

#[test]
fn test_alias_errors() {
	let registry = TypeRegistry::new("alias-errors");
	let unknown = AssemblyConfig {
		aliases: vec![Alias {
			class: "LDLT".into(),
			scope: "x".into(),
			name: None,
		}],
		..AssemblyConfig::default()
	};
	assert!(matches!(assemble(&registry, &unknown), Err(AssemblyError::UnknownAliasTarget { class }) if class == "LDLT"));

	let clash = AssemblyConfig {
		aliases: vec![Alias {
			class: "LLT".into(),
			scope: "solvers".into(),
			name: Some("ConjugateGradient".into()),
		}],
		..AssemblyConfig::default()
	};
	let err = assemble(&registry, &clash).unwrap_err();
	assert!(
		matches!(&err, AssemblyError::Bind(BindError::NameTaken { kind: "class", name, .. }) if name == "ConjugateGradient"),
		"got {err:?}"
	);
}

#[test]
fn test_two_assemblies_share_one_registry() {
	let registry = TypeRegistry::new("shared");
	let first = assemble(&registry, &AssemblyConfig::default()).unwrap();
	let second = assemble(
		&registry,
		&AssemblyConfig {
			module: "algebind_compat".into(),
			..AssemblyConfig::default()
		},
	)
	.unwrap();

	assert_eq!(registry.len(), 11);
	assert!(Arc::ptr_eq(&first.class("LLT").unwrap(), &second.class("LLT").unwrap()));
	let a = first.construct("LLT", &[]).unwrap();
	let b = second.construct("LLT", &[]).unwrap();
	assert!(Arc::ptr_eq(a.class(), b.class()));
	assert_ne!(a.call("id", &[]).unwrap(), b.call("id", &[]).unwrap());
}

#[test]
fn test_groups_can_be_disabled() {
	let registry = TypeRegistry::new("groups");
	let config = AssemblyConfig {
		groups: Groups { dense: false, iterative: false },
		..AssemblyConfig::default()
	};
	let root = assemble(&registry, &config).unwrap();
	assert!(root.class("Matrix").is_ok());
	assert!(!root.contains("LLT"));
	assert!(!root.contains("solvers"));
	assert_eq!(registry.len(), 1);
}

#[test]
fn test_address_identity_strategy() {
	let registry = TypeRegistry::new("address");
	let config = AssemblyConfig {
		identity: IdentityStrategy::Address,
		..AssemblyConfig::default()
	};
	let root = assemble(&registry, &config).unwrap();
	let llt = root.construct("LLT", &[]).unwrap();
	let id = llt.call("id", &[]).unwrap();
	assert_eq!(id, Value::Int(llt.address().unwrap() as i64));
	assert_eq!(id, llt.call("id", &[]).unwrap());

	// stateless preconditioners have no storage of their own to take an address from
	let solvers = root.submodule("solvers").unwrap();
	let first = solvers.construct("IdentityPreconditioner", &[]).unwrap();
	let second = solvers.construct("IdentityPreconditioner", &[]).unwrap();
	let first_id = first.call("id", &[]).unwrap();
	assert_ne!(first_id, second.call("id", &[]).unwrap());
	assert_eq!(first_id, first.call("id", &[]).unwrap());
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(16))]

	#[test]
	fn prop_live_instances_have_distinct_ids(count in 1usize..24, address in any::<bool>()) {
		let registry = TypeRegistry::new("prop");
		let identity = if address { IdentityStrategy::Address } else { IdentityStrategy::Serial };
		let root = assemble(&registry, &AssemblyConfig { identity, ..AssemblyConfig::default() }).unwrap();
		let solvers = root.submodule("solvers").unwrap();

		let live: Vec<_> = (0..count)
			.map(|i| match i % 4 {
				0 => root.construct("LLT", &[]).unwrap(),
				1 => root.construct("JacobiSVD", &[]).unwrap(),
				2 => solvers.construct("IdentityPreconditioner", &[]).unwrap(),
				_ => solvers.construct("ConjugateGradient", &[]).unwrap(),
			})
			.collect();
		let mut ids: Vec<i64> = live.iter().map(|o| o.call("id", &[]).unwrap().as_int().unwrap()).collect();
		ids.sort_unstable();
		ids.dedup();
		prop_assert_eq!(ids.len(), count);
	}
}
