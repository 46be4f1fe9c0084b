use algebind_bridge::{Dimensions, Factorize, LinearSolve};
use nalgebra::{DMatrix, DVector};

use crate::dense::check_rows;
use crate::error::LinalgError;
use crate::info::ComputationInfo;

/// Approximate inverse applied to residuals by preconditioned solvers.
pub trait Preconditioner: Default + Send + Sync + 'static {
	/// Rebuilds the approximation for a new system matrix.
	fn prepare(&mut self, matrix: &DMatrix<f64>);

	fn apply(&self, residual: &DVector<f64>) -> DVector<f64>;
}

/// Leaves residuals unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityPreconditioner;

impl Preconditioner for IdentityPreconditioner {
	fn prepare(&mut self, _matrix: &DMatrix<f64>) {}

	fn apply(&self, residual: &DVector<f64>) -> DVector<f64> {
		residual.clone()
	}
}

impl Factorize for IdentityPreconditioner {
	type Input = DMatrix<f64>;
	type Status = ComputationInfo;

	fn compute(&mut self, input: DMatrix<f64>) {
		self.prepare(&input);
	}

	fn info(&self) -> ComputationInfo {
		ComputationInfo::Success
	}
}

impl LinearSolve for IdentityPreconditioner {
	type Error = LinalgError;

	fn solve(&self, rhs: &DVector<f64>) -> Result<DVector<f64>, LinalgError> {
		Ok(self.apply(rhs))
	}
}

/// Jacobi preconditioner: scales each residual entry by the inverse diagonal.
///
/// Zero diagonal entries scale by one. Before the first `prepare` it acts as the
/// identity.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalPreconditioner {
	inverse_diagonal: DVector<f64>,
}

impl Default for DiagonalPreconditioner {
	fn default() -> Self {
		Self {
			inverse_diagonal: DVector::zeros(0),
		}
	}
}

impl DiagonalPreconditioner {
	pub fn inverse_diagonal(&self) -> &DVector<f64> {
		&self.inverse_diagonal
	}
}

impl Preconditioner for DiagonalPreconditioner {
	fn prepare(&mut self, matrix: &DMatrix<f64>) {
		self.inverse_diagonal = matrix.diagonal().map(|d| if d == 0.0 { 1.0 } else { d.recip() });
	}

	fn apply(&self, residual: &DVector<f64>) -> DVector<f64> {
		DVector::from_fn(residual.len(), |i, _| residual[i] * self.inverse_diagonal.get(i).copied().unwrap_or(1.0))
	}
}

impl Dimensions for DiagonalPreconditioner {
	fn rows(&self) -> usize {
		self.inverse_diagonal.len()
	}

	fn cols(&self) -> usize {
		self.inverse_diagonal.len()
	}
}

impl Factorize for DiagonalPreconditioner {
	type Input = DMatrix<f64>;
	type Status = ComputationInfo;

	fn compute(&mut self, input: DMatrix<f64>) {
		self.prepare(&input);
	}

	fn info(&self) -> ComputationInfo {
		ComputationInfo::Success
	}
}

impl LinearSolve for DiagonalPreconditioner {
	type Error = LinalgError;

	fn solve(&self, rhs: &DVector<f64>) -> Result<DVector<f64>, LinalgError> {
		if !self.inverse_diagonal.is_empty() {
			check_rows(self.inverse_diagonal.len(), rhs)?;
		}
		Ok(self.apply(rhs))
	}
}
