use algebind_bridge::fragments::{Compute, Identity, Shape, Solve, SolveMatrix};
use algebind_bridge::runtime::Module;
use algebind_bridge::{BindError, ClassBuilder, Factorize, IdentityStrategy, Native, TypeRegistry, expose};
use algebind_linalg::{HouseholderQr, JacobiSvd, Llt, PartialPivLu, SelfAdjointEigenSolver};
use nalgebra::DMatrix;

use super::native;

/// `()` and `(matrix)` constructors; the latter computes right away.
fn factorizing_init<T>(class: &mut ClassBuilder<'_, T>)
where
	T: Native + Default + Factorize<Input = DMatrix<f64>>,
{
	class.init_default().init("(matrix)", |args| {
		args.expect_arity(1)?;
		let mut solver = T::default();
		solver.compute(args.get(0)?);
		Ok(solver)
	});
}

/// Exposes the dense decompositions. `Matrix` must already be exposed in `registry`.
pub(crate) fn dense(registry: &TypeRegistry, scope: &Module, identity: IdentityStrategy) -> Result<(), BindError> {
	expose::<Llt>(registry, scope, "LLT", move |class| {
		class.doc("Standard Cholesky decomposition (LL^T) of a symmetric positive definite matrix.");
		factorizing_init(class);
		class.init("(size)", |args| {
			args.expect_arity(1)?;
			Ok(Llt::with_size(args.get(0)?))
		});
		let err = native("LLT");
		class
			.apply((Shape, Compute, Solve, SolveMatrix, Identity(identity)))?
			.def("matrixL", move |llt: &Llt, args| {
				args.expect_arity(0)?;
				llt.matrix_l().map_err(err)
			})?
			.def("matrixU", move |llt: &Llt, args| {
				args.expect_arity(0)?;
				llt.matrix_u().map_err(err)
			})?
			.def_internal_ro::<DMatrix<f64>>("matrixLLT", Llt::matrix_llt)?
			.def("reconstructedMatrix", move |llt: &Llt, args| {
				args.expect_arity(0)?;
				llt.reconstructed_matrix().map_err(err)
			})?
			.def("rcond", move |llt: &Llt, args| {
				args.expect_arity(0)?;
				llt.rcond().map_err(err)
			})?;
		Ok(())
	})?;

	expose::<PartialPivLu>(registry, scope, "PartialPivLU", move |class| {
		class.doc("LU decomposition of a square matrix with partial pivoting.");
		factorizing_init(class);
		class.init("(size)", |args| {
			args.expect_arity(1)?;
			Ok(PartialPivLu::with_size(args.get(0)?))
		});
		let err = native("PartialPivLU");
		class
			.apply((Shape, Compute, Solve, SolveMatrix, Identity(identity)))?
			.def("determinant", move |lu: &PartialPivLu, args| {
				args.expect_arity(0)?;
				lu.determinant().map_err(err)
			})?
			.def("inverse", move |lu: &PartialPivLu, args| {
				args.expect_arity(0)?;
				lu.inverse().map_err(err)
			})?
			.def("matrixL", move |lu: &PartialPivLu, args| {
				args.expect_arity(0)?;
				lu.matrix_l().map_err(err)
			})?
			.def("matrixU", move |lu: &PartialPivLu, args| {
				args.expect_arity(0)?;
				lu.matrix_u().map_err(err)
			})?;
		Ok(())
	})?;

	expose::<HouseholderQr>(registry, scope, "HouseholderQR", move |class| {
		class.doc("Householder QR decomposition of a matrix.");
		factorizing_init(class);
		class.init("(rows, cols)", |args| {
			args.expect_arity(2)?;
			Ok(HouseholderQr::with_shape(args.get(0)?, args.get(1)?))
		});
		let err = native("HouseholderQR");
		class
			.apply((Shape, Compute, Solve, SolveMatrix, Identity(identity)))?
			.def("householderQ", move |qr: &HouseholderQr, args| {
				args.expect_arity(0)?;
				qr.matrix_q().map_err(err)
			})?
			.def("matrixR", move |qr: &HouseholderQr, args| {
				args.expect_arity(0)?;
				qr.matrix_r().map_err(err)
			})?
			.def("absDeterminant", move |qr: &HouseholderQr, args| {
				args.expect_arity(0)?;
				qr.abs_determinant().map_err(err)
			})?;
		Ok(())
	})?;

	expose::<JacobiSvd>(registry, scope, "JacobiSVD", move |class| {
		class.doc("Singular value decomposition with thin U and V; solve gives least-squares solutions.");
		factorizing_init(class);
		class.init("(rows, cols)", |args| {
			args.expect_arity(2)?;
			Ok(JacobiSvd::with_shape(args.get(0)?, args.get(1)?))
		});
		let err = native("JacobiSVD");
		class
			.apply((Shape, Compute, Solve, SolveMatrix, Identity(identity)))?
			.def("singularValues", move |svd: &JacobiSvd, args| {
				args.expect_arity(0)?;
				svd.singular_values().map_err(err)
			})?
			.def("matrixU", move |svd: &JacobiSvd, args| {
				args.expect_arity(0)?;
				svd.matrix_u().map_err(err)
			})?
			.def("matrixV", move |svd: &JacobiSvd, args| {
				args.expect_arity(0)?;
				svd.matrix_v().map_err(err)
			})?
			.def("rank", move |svd: &JacobiSvd, args| {
				args.expect_arity(0)?;
				svd.rank().map_err(err)
			})?
			.def("nonzeroSingularValues", move |svd: &JacobiSvd, args| {
				args.expect_arity(0)?;
				svd.nonzero_singular_values().map_err(err)
			})?
			.def("threshold", |svd: &JacobiSvd, args| {
				args.expect_arity(0)?;
				Ok(svd.threshold())
			})?
			.def_chain("setThreshold", |svd: &mut JacobiSvd, (threshold,): (f64,)| {
				svd.set_threshold(threshold);
				Ok(())
			})?;
		Ok(())
	})?;

	// no Shape and no Solve: the eigen solver gets the narrower fragment set
	expose::<SelfAdjointEigenSolver>(registry, scope, "SelfAdjointEigenSolver", move |class| {
		class.doc("Eigen decomposition of a symmetric matrix, eigenvalues in increasing order.");
		factorizing_init(class);
		let err = native("SelfAdjointEigenSolver");
		class
			.apply((Compute, Identity(identity)))?
			.def("eigenvalues", move |eig: &SelfAdjointEigenSolver, args| {
				args.expect_arity(0)?;
				eig.eigenvalues().map_err(err)
			})?
			.def("eigenvectors", move |eig: &SelfAdjointEigenSolver, args| {
				args.expect_arity(0)?;
				eig.eigenvectors().map_err(err)
			})?
			.def("operatorSqrt", move |eig: &SelfAdjointEigenSolver, args| {
				args.expect_arity(0)?;
				eig.operator_sqrt().map_err(err)
			})?
			.def("operatorInverseSqrt", move |eig: &SelfAdjointEigenSolver, args| {
				args.expect_arity(0)?;
				eig.operator_inverse_sqrt().map_err(err)
			})?;
		Ok(())
	})?;

	Ok(())
}
