use algebind_bridge::{Dimensions, Factorize, LinearSolve, MatrixSolve};
use nalgebra::linalg::SVD;
use nalgebra::{DMatrix, DVector, Dyn};

use super::{check_rows, screen};
use crate::error::LinalgError;
use crate::info::ComputationInfo;

/// Singular value decomposition `A = U Σ Vᵀ` with thin `U` and `V`.
///
/// `solve` returns the least-squares solution, treating singular values at or below
/// [`threshold`](JacobiSvd::threshold) as zero.
#[derive(Debug, Clone)]
pub struct JacobiSvd {
	shape: (usize, usize),
	svd: Option<SVD<f64, Dyn, Dyn>>,
	threshold: Option<f64>,
	info: ComputationInfo,
}

impl Default for JacobiSvd {
	fn default() -> Self {
		Self::with_shape(0, 0)
	}
}

impl JacobiSvd {
	pub fn with_shape(rows: usize, cols: usize) -> Self {
		Self {
			shape: (rows, cols),
			svd: None,
			threshold: None,
			info: ComputationInfo::InvalidInput,
		}
	}

	pub fn new(input: DMatrix<f64>) -> Self {
		let mut svd = Self::default();
		svd.compute(input);
		svd
	}

	fn ready(&self) -> Result<&SVD<f64, Dyn, Dyn>, LinalgError> {
		self.svd.as_ref().ok_or(LinalgError::NotInitialized { decomposition: "JacobiSVD" })
	}

	/// Relative cut-off below which singular values count as zero.
	///
	/// Defaults to `min(rows, cols) * f64::EPSILON` until set explicitly.
	pub fn threshold(&self) -> f64 {
		self.threshold.unwrap_or_else(|| self.shape.0.min(self.shape.1) as f64 * f64::EPSILON)
	}

	pub fn set_threshold(&mut self, threshold: f64) {
		self.threshold = Some(threshold);
	}

	/// Reverts [`threshold`](Self::threshold) to its size-dependent default.
	pub fn reset_threshold(&mut self) {
		self.threshold = None;
	}

	fn absolute_threshold(&self, svd: &SVD<f64, Dyn, Dyn>) -> f64 {
		let largest = svd.singular_values.iter().copied().fold(0.0, f64::max);
		(largest * self.threshold()).max(f64::MIN_POSITIVE)
	}

	pub fn singular_values(&self) -> Result<DVector<f64>, LinalgError> {
		Ok(self.ready()?.singular_values.clone())
	}

	pub fn matrix_u(&self) -> Result<DMatrix<f64>, LinalgError> {
		self.ready()?.u.clone().ok_or(LinalgError::NotInitialized { decomposition: "JacobiSVD" })
	}

	pub fn matrix_v(&self) -> Result<DMatrix<f64>, LinalgError> {
		let v_t = self.ready()?.v_t.as_ref().ok_or(LinalgError::NotInitialized { decomposition: "JacobiSVD" })?;
		Ok(v_t.transpose())
	}

	pub fn rank(&self) -> Result<usize, LinalgError> {
		let svd = self.ready()?;
		let cut = self.absolute_threshold(svd);
		Ok(svd.singular_values.iter().filter(|&&s| s > cut).count())
	}

	pub fn nonzero_singular_values(&self) -> Result<usize, LinalgError> {
		Ok(self.ready()?.singular_values.iter().filter(|&&s| s != 0.0).count())
	}
}

impl Dimensions for JacobiSvd {
	fn rows(&self) -> usize {
		self.shape.0
	}

	fn cols(&self) -> usize {
		self.shape.1
	}
}

impl Factorize for JacobiSvd {
	type Input = DMatrix<f64>;
	type Status = ComputationInfo;

	fn compute(&mut self, input: DMatrix<f64>) {
		self.shape = input.shape();
		self.svd = None;
		if let Some(info) = screen(&input, false) {
			self.info = info;
			return;
		}
		// zero iteration limit means run until converged
		self.svd = input.try_svd(true, true, f64::EPSILON, 0);
		self.info = if self.svd.is_some() { ComputationInfo::Success } else { ComputationInfo::NoConvergence };
	}

	fn info(&self) -> ComputationInfo {
		self.info
	}
}

impl LinearSolve for JacobiSvd {
	type Error = LinalgError;

	fn solve(&self, rhs: &DVector<f64>) -> Result<DVector<f64>, LinalgError> {
		let svd = self.ready()?;
		check_rows(self.shape.0, rhs)?;
		svd.solve(rhs, self.absolute_threshold(svd))
			.map_err(|_| LinalgError::NotInitialized { decomposition: "JacobiSVD" })
	}
}

impl MatrixSolve for JacobiSvd {
	fn solve_matrix(&self, rhs: &DMatrix<f64>) -> Result<DMatrix<f64>, LinalgError> {
		let svd = self.ready()?;
		check_rows(self.shape.0, rhs)?;
		svd.solve(rhs, self.absolute_threshold(svd))
			.map_err(|_| LinalgError::NotInitialized { decomposition: "JacobiSVD" })
	}
}
