use algebind_bridge::fragments::{Identity, Shape};
use algebind_bridge::runtime::{Module, RuntimeError};
use algebind_bridge::{BindError, IdentityStrategy, Registration, TypeRegistry, expose};
use nalgebra::DMatrix;

fn index(m: &DMatrix<f64>, row: usize, col: usize) -> Result<(usize, usize), RuntimeError> {
	if row < m.nrows() && col < m.ncols() {
		Ok((row, col))
	} else {
		Err(RuntimeError::native(
			"Matrix",
			format!("index ({row}, {col}) out of bounds for {}x{} matrix", m.nrows(), m.ncols()),
		))
	}
}

/// Exposes `DMatrix<f64>` as `Matrix`, the native dense matrix.
pub(crate) fn matrix(registry: &TypeRegistry, scope: &Module, identity: IdentityStrategy) -> Result<Registration, BindError> {
	expose::<DMatrix<f64>>(registry, scope, "Matrix", move |class| {
		class
			.doc("Dense column-major matrix of f64, owned natively.")
			.init("()", |args| {
				args.expect_arity(0)?;
				Ok(DMatrix::zeros(0, 0))
			})
			.init("(rows, cols)", |args| {
				args.expect_arity(2)?;
				Ok(DMatrix::zeros(args.get(0)?, args.get(1)?))
			})
			.init("(array)", |args| {
				args.expect_arity(1)?;
				args.get(0)
			});
		class
			.apply((Shape, Identity(identity)))?
			.def("get", |m: &DMatrix<f64>, args| {
				args.expect_arity(2)?;
				Ok(m[index(m, args.get(0)?, args.get(1)?)?])
			})?
			.def_chain("set", |m: &mut DMatrix<f64>, (row, col, value): (usize, usize, f64)| {
				let at = index(m, row, col)?;
				m[at] = value;
				Ok(())
			})?
			.def("to_array", |m: &DMatrix<f64>, args| {
				args.expect_arity(0)?;
				Ok(m.clone())
			})?;
		Ok(())
	})
}
