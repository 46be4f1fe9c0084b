use algebind_bridge::fragments::{Compute, Identity, Iterative, PreconditionerAccess, Shape, Solve, SolveWithGuess};
use algebind_bridge::runtime::{Function, Module, Object, RuntimeError, Value};
use algebind_bridge::{BindError, IdentityStrategy, Registration, TypeRegistry, expose};
use algebind_linalg::{ConjugateGradient, DiagonalPreconditioner, ITERATION_DEFAULTS, IdentityPreconditioner, IterationDefaults, Preconditioner};
use nalgebra::DMatrix;

fn conjugate_gradient<P: Preconditioner>(registry: &TypeRegistry, scope: &Module, name: &str, identity: IdentityStrategy) -> Result<Registration, BindError> {
	expose::<ConjugateGradient<P>>(registry, scope, name, move |class| {
		class
			.doc("Conjugate gradient solver for symmetric positive definite systems.")
			.init_default()
			.init("(matrix)", |args| {
				args.expect_arity(1)?;
				Ok(ConjugateGradient::new(args.get::<DMatrix<f64>>(0)?))
			});
		// Iterative's `info` replaces the one Compute binds
		class
			.apply((Shape, Compute, Iterative, Solve, SolveWithGuess, PreconditionerAccess, Identity(identity)))?
			.def_external("defaults", &ITERATION_DEFAULTS)?;
		Ok(())
	})
}

/// Exposes preconditioners, the shared iteration defaults and the conjugate gradient
/// solvers into `scope`.
pub(crate) fn iterative(registry: &TypeRegistry, scope: &Module, identity: IdentityStrategy) -> Result<(), BindError> {
	let defaults = expose::<IterationDefaults>(registry, scope, "IterationDefaults", |class| {
		class.doc("Process-wide settings newly constructed iterative solvers start from.");
		class
			.prop_rw("tolerance", |d: &IterationDefaults| d.tolerance, |d: &mut IterationDefaults, v: f64| d.tolerance = v)?
			.prop_rw(
				"maxIterationsFactor",
				|d: &IterationDefaults| d.max_iterations_factor,
				|d: &mut IterationDefaults, v: usize| d.max_iterations_factor = v,
			)?
			.def_chain("reset", |d: &mut IterationDefaults, ()| {
				*d = IterationDefaults::DEFAULT;
				Ok(())
			})?;
		Ok(())
	})?;
	let class = defaults.handle;
	scope.add_function(
		Function::new("iteration_defaults", move |args: &[Value]| {
			if !args.is_empty() {
				return Err(RuntimeError::Arity {
					callable: "iteration_defaults".into(),
					expected: 0,
					got: args.len(),
				});
			}
			Ok(Value::Object(Object::borrow_external(class.clone(), &ITERATION_DEFAULTS)?))
		})
		.with_doc("The live process-wide iteration defaults."),
	);

	expose::<IdentityPreconditioner>(registry, scope, "IdentityPreconditioner", move |class| {
		class.init_default();
		class.apply((Compute, Solve, Identity(identity)))?;
		Ok(())
	})?;
	expose::<DiagonalPreconditioner>(registry, scope, "DiagonalPreconditioner", move |class| {
		class.doc("Jacobi preconditioner: scales residuals by the inverse diagonal.").init_default();
		class.apply((Shape, Compute, Solve, Identity(identity)))?.def("inverseDiagonal", |p: &DiagonalPreconditioner, args| {
			args.expect_arity(0)?;
			Ok(p.inverse_diagonal().clone())
		})?;
		Ok(())
	})?;

	conjugate_gradient::<DiagonalPreconditioner>(registry, scope, "ConjugateGradient", identity)?;
	conjugate_gradient::<IdentityPreconditioner>(registry, scope, "IdentityConjugateGradient", identity)?;
	Ok(())
}
