use algebind_bridge::{Dimensions, Factorize, LinearSolve, MatrixSolve};
use nalgebra::linalg::QR;
use nalgebra::{DMatrix, DVector, Dyn};

use super::{check_rows, screen};
use crate::error::LinalgError;
use crate::info::ComputationInfo;

/// Householder QR decomposition of a matrix of any shape.
///
/// Solving is limited to square systems.
#[derive(Debug, Clone)]
pub struct HouseholderQr {
	shape: (usize, usize),
	qr: Option<QR<f64, Dyn, Dyn>>,
	info: ComputationInfo,
}

impl Default for HouseholderQr {
	fn default() -> Self {
		Self::with_shape(0, 0)
	}
}

impl HouseholderQr {
	pub fn with_shape(rows: usize, cols: usize) -> Self {
		Self {
			shape: (rows, cols),
			qr: None,
			info: ComputationInfo::InvalidInput,
		}
	}

	pub fn new(input: DMatrix<f64>) -> Self {
		let mut qr = Self::default();
		qr.compute(input);
		qr
	}

	fn ready(&self) -> Result<&QR<f64, Dyn, Dyn>, LinalgError> {
		self.qr.as_ref().ok_or(LinalgError::NotInitialized { decomposition: "HouseholderQR" })
	}

	fn ready_square(&self) -> Result<&QR<f64, Dyn, Dyn>, LinalgError> {
		let qr = self.ready()?;
		let (rows, cols) = self.shape;
		if rows != cols {
			return Err(LinalgError::NotSquare {
				decomposition: "HouseholderQR",
				rows,
				cols,
			});
		}
		Ok(qr)
	}

	pub fn matrix_q(&self) -> Result<DMatrix<f64>, LinalgError> {
		Ok(self.ready()?.q())
	}

	pub fn matrix_r(&self) -> Result<DMatrix<f64>, LinalgError> {
		Ok(self.ready()?.r())
	}

	/// `|det A|`, the product of the magnitudes of `R`'s diagonal.
	pub fn abs_determinant(&self) -> Result<f64, LinalgError> {
		let r = self.ready_square()?.r();
		Ok(r.diagonal().iter().map(|v| v.abs()).product())
	}
}

impl Dimensions for HouseholderQr {
	fn rows(&self) -> usize {
		self.shape.0
	}

	fn cols(&self) -> usize {
		self.shape.1
	}
}

impl Factorize for HouseholderQr {
	type Input = DMatrix<f64>;
	type Status = ComputationInfo;

	fn compute(&mut self, input: DMatrix<f64>) {
		self.shape = input.shape();
		self.qr = None;
		if let Some(info) = screen(&input, false) {
			self.info = info;
			return;
		}
		self.qr = Some(input.qr());
		self.info = ComputationInfo::Success;
	}

	fn info(&self) -> ComputationInfo {
		self.info
	}
}

impl LinearSolve for HouseholderQr {
	type Error = LinalgError;

	fn solve(&self, rhs: &DVector<f64>) -> Result<DVector<f64>, LinalgError> {
		let qr = self.ready_square()?;
		check_rows(self.shape.0, rhs)?;
		qr.solve(rhs).ok_or(LinalgError::Singular)
	}
}

impl MatrixSolve for HouseholderQr {
	fn solve_matrix(&self, rhs: &DMatrix<f64>) -> Result<DMatrix<f64>, LinalgError> {
		let qr = self.ready_square()?;
		check_rows(self.shape.0, rhs)?;
		qr.solve(rhs).ok_or(LinalgError::Singular)
	}
}
