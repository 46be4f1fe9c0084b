use algebind_bridge::{Dimensions, Factorize, LinearSolve, MatrixSolve};
use nalgebra::linalg::LU;
use nalgebra::{DMatrix, DVector, Dyn};

use super::{check_rows, screen};
use crate::error::LinalgError;
use crate::info::ComputationInfo;

/// LU decomposition with partial (row) pivoting of a square matrix.
#[derive(Debug, Clone)]
pub struct PartialPivLu {
	dim: usize,
	lu: Option<LU<f64, Dyn, Dyn>>,
	info: ComputationInfo,
}

impl Default for PartialPivLu {
	fn default() -> Self {
		Self::with_size(0)
	}
}

impl PartialPivLu {
	pub fn with_size(size: usize) -> Self {
		Self {
			dim: size,
			lu: None,
			info: ComputationInfo::InvalidInput,
		}
	}

	pub fn new(input: DMatrix<f64>) -> Self {
		let mut lu = Self::default();
		lu.compute(input);
		lu
	}

	fn ready(&self) -> Result<&LU<f64, Dyn, Dyn>, LinalgError> {
		self.lu.as_ref().ok_or(LinalgError::NotInitialized { decomposition: "PartialPivLU" })
	}

	pub fn determinant(&self) -> Result<f64, LinalgError> {
		Ok(self.ready()?.determinant())
	}

	pub fn inverse(&self) -> Result<DMatrix<f64>, LinalgError> {
		self.ready()?.try_inverse().ok_or(LinalgError::Singular)
	}

	/// Unit lower triangular factor.
	pub fn matrix_l(&self) -> Result<DMatrix<f64>, LinalgError> {
		Ok(self.ready()?.l())
	}

	pub fn matrix_u(&self) -> Result<DMatrix<f64>, LinalgError> {
		Ok(self.ready()?.u())
	}
}

impl Dimensions for PartialPivLu {
	fn rows(&self) -> usize {
		self.dim
	}

	fn cols(&self) -> usize {
		self.dim
	}
}

impl Factorize for PartialPivLu {
	type Input = DMatrix<f64>;
	type Status = ComputationInfo;

	fn compute(&mut self, input: DMatrix<f64>) {
		self.dim = input.nrows();
		self.lu = None;
		if let Some(info) = screen(&input, true) {
			self.info = info;
			return;
		}
		let lu = input.lu();
		self.info = if lu.is_invertible() { ComputationInfo::Success } else { ComputationInfo::NumericalIssue };
		self.lu = Some(lu);
	}

	fn info(&self) -> ComputationInfo {
		self.info
	}
}

impl LinearSolve for PartialPivLu {
	type Error = LinalgError;

	fn solve(&self, rhs: &DVector<f64>) -> Result<DVector<f64>, LinalgError> {
		let lu = self.ready()?;
		check_rows(self.dim, rhs)?;
		lu.solve(rhs).ok_or(LinalgError::Singular)
	}
}

impl MatrixSolve for PartialPivLu {
	fn solve_matrix(&self, rhs: &DMatrix<f64>) -> Result<DMatrix<f64>, LinalgError> {
		let lu = self.ready()?;
		check_rows(self.dim, rhs)?;
		lu.solve(rhs).ok_or(LinalgError::Singular)
	}
}
