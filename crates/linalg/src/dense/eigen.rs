use algebind_bridge::Factorize;
use nalgebra::linalg::SymmetricEigen;
use nalgebra::{DMatrix, DVector};

use super::screen;
use crate::error::LinalgError;
use crate::info::ComputationInfo;

/// Eigen decomposition of a symmetric matrix, eigenvalues in increasing order.
///
/// Unlike the other decompositions it has no dimension queries and does not solve.
#[derive(Debug, Clone)]
pub struct SelfAdjointEigenSolver {
	eigenvalues: DVector<f64>,
	eigenvectors: DMatrix<f64>,
	computed: bool,
	info: ComputationInfo,
}

impl Default for SelfAdjointEigenSolver {
	fn default() -> Self {
		Self {
			eigenvalues: DVector::zeros(0),
			eigenvectors: DMatrix::zeros(0, 0),
			computed: false,
			info: ComputationInfo::InvalidInput,
		}
	}
}

impl SelfAdjointEigenSolver {
	pub fn new(input: DMatrix<f64>) -> Self {
		let mut solver = Self::default();
		solver.compute(input);
		solver
	}

	fn ready(&self) -> Result<(), LinalgError> {
		if self.computed {
			Ok(())
		} else {
			Err(LinalgError::NotInitialized {
				decomposition: "SelfAdjointEigenSolver",
			})
		}
	}

	pub fn eigenvalues(&self) -> Result<DVector<f64>, LinalgError> {
		self.ready()?;
		Ok(self.eigenvalues.clone())
	}

	/// Unit eigenvectors as columns, ordered like [`eigenvalues`](Self::eigenvalues).
	pub fn eigenvectors(&self) -> Result<DMatrix<f64>, LinalgError> {
		self.ready()?;
		Ok(self.eigenvectors.clone())
	}

	/// `V f(Λ) Vᵀ` for a function of the eigenvalues.
	fn spectral(&self, f: impl Fn(f64) -> f64) -> Result<DMatrix<f64>, LinalgError> {
		self.ready()?;
		let scaled = DMatrix::from_diagonal(&self.eigenvalues.map(f));
		Ok(&self.eigenvectors * scaled * self.eigenvectors.transpose())
	}

	/// Positive semi-definite square root of the matrix.
	pub fn operator_sqrt(&self) -> Result<DMatrix<f64>, LinalgError> {
		self.spectral(f64::sqrt)
	}

	pub fn operator_inverse_sqrt(&self) -> Result<DMatrix<f64>, LinalgError> {
		self.spectral(|v| v.sqrt().recip())
	}
}

impl Factorize for SelfAdjointEigenSolver {
	type Input = DMatrix<f64>;
	type Status = ComputationInfo;

	fn compute(&mut self, input: DMatrix<f64>) {
		self.computed = false;
		if let Some(info) = screen(&input, true) {
			self.info = info;
			return;
		}
		let n = input.nrows();
		// zero iteration limit means run until converged
		let Some(eigen) = SymmetricEigen::try_new(input, f64::EPSILON, 0) else {
			self.info = ComputationInfo::NoConvergence;
			return;
		};
		let mut order: Vec<usize> = (0..n).collect();
		order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
		self.eigenvalues = DVector::from_iterator(n, order.iter().map(|&i| eigen.eigenvalues[i]));
		self.eigenvectors = DMatrix::from_fn(n, n, |row, col| eigen.eigenvectors[(row, order[col])]);
		self.computed = true;
		self.info = ComputationInfo::Success;
	}

	fn info(&self) -> ComputationInfo {
		self.info
	}
}
