//! Assembles the `algebind` module: dense decompositions, iterative solvers and the
//! matrix type they share, exposed through `algebind-bridge`.
//!
//! # Mental model
//!
//! - [`assemble`] builds one module tree against a given [`TypeRegistry`]. Assembling
//!   twice against the same registry exposes each native type once; the second tree
//!   links the classes the first one published.
//! - [`init_module`] is the process entry point: it assembles against
//!   [`TypeRegistry::global`] and then freezes it.
//! - What gets exposed, and under which extra names, comes from an [`AssemblyConfig`].
//!
//! # Layout
//!
//! | Name | Contents |
//! |---|---|
//! | `Matrix` | native dense matrix |
//! | `LLT`, `PartialPivLU`, `HouseholderQR`, `JacobiSVD`, `SelfAdjointEigenSolver` | dense decompositions |
//! | `ComputationInfo` | enum namespace; members are also exported at the root |
//! | `is_approx(a, b[, precision])`, `__version__` | helpers |
//! | `solvers.*` | preconditioners, `IterationDefaults`, `ConjugateGradient`, `IdentityConjugateGradient` |

use std::sync::Arc;

use algebind_bridge::runtime::{Attr, Function, Module, RuntimeError, Value};
use algebind_bridge::{Args, LinkOutcome, TypeRegistry, link};
use algebind_linalg::{DEFAULT_PRECISION, is_approx};
use nalgebra::{DMatrix, DVector};

pub mod config;
pub mod error;
mod expose;

pub use algebind_bridge as bridge;
pub use algebind_linalg as linalg;
pub use config::{Alias, AssemblyConfig, ConfigError, Groups};
pub use error::AssemblyError;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn approx_matrices(values: &[Value]) -> Result<Value, RuntimeError> {
	let args = Args::new("is_approx", values);
	args.expect_range(2, 3)?;
	let a = args.get::<DMatrix<f64>>(0)?;
	let b = args.get::<DMatrix<f64>>(1)?;
	Ok(Value::Bool(is_approx(&a, &b, args.get_or(2, DEFAULT_PRECISION)?)))
}

fn approx_vectors(values: &[Value]) -> Result<Value, RuntimeError> {
	let args = Args::new("is_approx", values);
	args.expect_range(2, 3)?;
	let column = |v: DVector<f64>| DMatrix::from_column_slice(v.len(), 1, v.as_slice());
	let a = column(args.get::<DVector<f64>>(0)?);
	let b = column(args.get::<DVector<f64>>(1)?);
	Ok(Value::Bool(is_approx(&a, &b, args.get_or(2, DEFAULT_PRECISION)?)))
}

fn apply_alias(registry: &TypeRegistry, root: &Arc<Module>, config: &AssemblyConfig, alias: &Alias) -> Result<LinkOutcome, AssemblyError> {
	let class = root
		.class(&alias.class)
		.or_else(|_| root.submodule(&config.solvers)?.class(&alias.class))
		.map_err(|_| AssemblyError::UnknownAliasTarget { class: alias.class.clone() })?;
	let mut scope = root.clone();
	for segment in alias.scope.split('.') {
		scope = scope.def_submodule(segment)?;
	}
	Ok(link(registry, &class, &scope, alias.name())?)
}

/// Builds the module tree described by `config`, exposing native types into `registry`.
pub fn assemble(registry: &TypeRegistry, config: &AssemblyConfig) -> Result<Arc<Module>, AssemblyError> {
	config.validate()?;
	let root = Module::with_doc(config.module.as_str(), "Dense and iterative linear solvers.");
	root.set_attr("__version__", Attr::Value(Value::Str(VERSION.into())));
	root.add_function(
		Function::new("is_approx", approx_matrices)
			.overload(approx_vectors)
			.with_doc("True when ||a - b|| <= precision * min(||a||, ||b||)."),
	);
	expose::computation_info(&root)?;
	expose::matrix(registry, &root, config.identity)?;

	if config.groups.dense {
		expose::dense(registry, &root, config.identity)?;
	}
	if config.groups.iterative {
		let solvers = root.def_submodule(&config.solvers)?;
		expose::iterative(registry, &solvers, config.identity)?;
	}
	for alias in &config.aliases {
		apply_alias(registry, &root, config, alias)?;
	}

	tracing::info!(
		module = root.name(),
		registry = registry.label(),
		types = registry.len(),
		aliases = config.aliases.len(),
		"module assembled"
	);
	Ok(root)
}

/// Assembles into the process-wide registry, then freezes it.
///
/// Later calls still succeed as long as they only need types already exposed.
pub fn init_module(config: &AssemblyConfig) -> Result<Arc<Module>, AssemblyError> {
	let registry = TypeRegistry::global();
	let module = assemble(registry, config)?;
	registry.freeze();
	Ok(module)
}
