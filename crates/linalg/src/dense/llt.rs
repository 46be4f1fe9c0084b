use algebind_bridge::{Dimensions, Factorize, LinearSolve, MatrixSolve};
use nalgebra::linalg::Cholesky;
use nalgebra::{DMatrix, DVector, Dyn};

use super::{check_rows, l1_norm, screen};
use crate::error::LinalgError;
use crate::info::ComputationInfo;

/// Standard Cholesky decomposition `A = L Lᵀ` of a symmetric positive definite matrix.
///
/// Only the lower triangle of the input is read.
#[derive(Debug, Clone)]
pub struct Llt {
	/// `L`, or zeros of the last input's size when no factorization is held.
	factor: DMatrix<f64>,
	cholesky: Option<Cholesky<f64, Dyn>>,
	l1_norm: f64,
	info: ComputationInfo,
}

impl Default for Llt {
	fn default() -> Self {
		Self::with_size(0)
	}
}

impl Llt {
	/// An empty decomposition with storage for a `size x size` matrix.
	pub fn with_size(size: usize) -> Self {
		Self {
			factor: DMatrix::zeros(size, size),
			cholesky: None,
			l1_norm: 0.0,
			info: ComputationInfo::InvalidInput,
		}
	}

	pub fn new(input: DMatrix<f64>) -> Self {
		let mut llt = Self::default();
		llt.compute(input);
		llt
	}

	fn ready(&self) -> Result<&Cholesky<f64, Dyn>, LinalgError> {
		self.cholesky.as_ref().ok_or(LinalgError::NotInitialized { decomposition: "LLT" })
	}

	/// The stored factor. Entries are meaningful only after a successful compute.
	pub fn matrix_llt(&self) -> &DMatrix<f64> {
		&self.factor
	}

	pub fn matrix_l(&self) -> Result<DMatrix<f64>, LinalgError> {
		self.ready()?;
		Ok(self.factor.clone())
	}

	pub fn matrix_u(&self) -> Result<DMatrix<f64>, LinalgError> {
		self.ready()?;
		Ok(self.factor.transpose())
	}

	/// `L Lᵀ`, the matrix the decomposition represents.
	pub fn reconstructed_matrix(&self) -> Result<DMatrix<f64>, LinalgError> {
		self.ready()?;
		Ok(&self.factor * self.factor.transpose())
	}

	/// Reciprocal condition number of the factored matrix in the 1-norm.
	pub fn rcond(&self) -> Result<f64, LinalgError> {
		let cholesky = self.ready()?;
		let inverse_norm = l1_norm(&cholesky.inverse());
		if self.l1_norm == 0.0 || inverse_norm == 0.0 {
			return Ok(0.0);
		}
		Ok(1.0 / (self.l1_norm * inverse_norm))
	}
}

impl Dimensions for Llt {
	fn rows(&self) -> usize {
		self.factor.nrows()
	}

	fn cols(&self) -> usize {
		self.factor.ncols()
	}
}

impl Factorize for Llt {
	type Input = DMatrix<f64>;
	type Status = ComputationInfo;

	fn compute(&mut self, input: DMatrix<f64>) {
		let (rows, cols) = input.shape();
		self.cholesky = None;
		self.factor = DMatrix::zeros(rows, cols);
		if let Some(info) = screen(&input, true) {
			self.info = info;
			return;
		}
		let lower = input.lower_triangle();
		self.l1_norm = l1_norm(&(&lower + lower.transpose() - DMatrix::from_diagonal(&lower.diagonal())));
		match input.cholesky() {
			Some(cholesky) => {
				self.factor = cholesky.l();
				self.cholesky = Some(cholesky);
				self.info = ComputationInfo::Success;
			}
			None => self.info = ComputationInfo::NumericalIssue,
		}
	}

	fn info(&self) -> ComputationInfo {
		self.info
	}
}

impl LinearSolve for Llt {
	type Error = LinalgError;

	fn solve(&self, rhs: &DVector<f64>) -> Result<DVector<f64>, LinalgError> {
		let cholesky = self.ready()?;
		check_rows(self.factor.nrows(), rhs)?;
		Ok(cholesky.solve(rhs))
	}
}

impl MatrixSolve for Llt {
	fn solve_matrix(&self, rhs: &DMatrix<f64>) -> Result<DMatrix<f64>, LinalgError> {
		let cholesky = self.ready()?;
		check_rows(self.factor.nrows(), rhs)?;
		Ok(cholesky.solve(rhs))
	}
}
