//! Preconditioned conjugate gradient for symmetric positive definite systems.
//!
//! ```text
//! r = b - A x, p = M⁻¹ r, ρ = rᵀ p
//! until ‖r‖² < tol² ‖b‖² or the iteration limit:
//!     q = A p, α = ρ / pᵀ q
//!     x += α p, r -= α q
//!     z = M⁻¹ r, ρ' = rᵀ z, p = z + (ρ' / ρ) p, ρ = ρ'
//! ```

use algebind_bridge::{Dimensions, Factorize, IterativeControl, LinearSolve, Preconditioned, WarmStart};
use nalgebra::{DMatrix, DVector};
use parking_lot::Mutex;

use super::defaults::{IterationDefaults, iteration_defaults};
use super::preconditioner::{DiagonalPreconditioner, Preconditioner};
use crate::dense::check_rows;
use crate::error::LinalgError;
use crate::info::ComputationInfo;

/// What the last `compute` or solve left behind.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SolveReport {
	iterations: usize,
	error: f64,
	info: ComputationInfo,
}

impl SolveReport {
	const IDLE: Self = Self {
		iterations: 0,
		error: 0.0,
		info: ComputationInfo::InvalidInput,
	};
}

#[derive(Debug)]
pub struct ConjugateGradient<P = DiagonalPreconditioner> {
	matrix: Option<DMatrix<f64>>,
	preconditioner: P,
	tolerance: f64,
	max_iterations: Option<usize>,
	max_iterations_factor: usize,
	/// Solves take `&self` but still record their outcome.
	report: Mutex<SolveReport>,
}

impl<P: Preconditioner> Default for ConjugateGradient<P> {
	fn default() -> Self {
		Self::with_defaults(iteration_defaults())
	}
}

impl<P: Preconditioner> ConjugateGradient<P> {
	/// An uncomputed solver starting from `defaults` instead of the process-wide ones.
	pub fn with_defaults(defaults: IterationDefaults) -> Self {
		Self {
			matrix: None,
			preconditioner: P::default(),
			tolerance: defaults.tolerance,
			max_iterations: None,
			max_iterations_factor: defaults.max_iterations_factor,
			report: Mutex::new(SolveReport::IDLE),
		}
	}

	pub fn new(matrix: DMatrix<f64>) -> Self {
		let mut cg = Self::default();
		cg.compute(matrix);
		cg
	}

	fn ready(&self) -> Result<&DMatrix<f64>, LinalgError> {
		self.matrix.as_ref().ok_or(LinalgError::NotInitialized {
			decomposition: "ConjugateGradient",
		})
	}

	fn iterate(&self, matrix: &DMatrix<f64>, rhs: &DVector<f64>, x: &mut DVector<f64>) -> SolveReport {
		let tolerance = self.tolerance;
		let max_iterations = self.max_iterations();

		let rhs_norm2 = rhs.norm_squared();
		if rhs_norm2 == 0.0 {
			x.fill(0.0);
			return SolveReport {
				iterations: 0,
				error: 0.0,
				info: ComputationInfo::Success,
			};
		}
		let threshold = (tolerance * tolerance * rhs_norm2).max(f64::MIN_POSITIVE);

		let mut residual = rhs - matrix * &*x;
		let mut residual_norm2 = residual.norm_squared();
		let mut iterations = 0;
		if residual_norm2 >= threshold {
			let mut direction = self.preconditioner.apply(&residual);
			let mut rho = residual.dot(&direction);
			while iterations < max_iterations {
				let q = matrix * &direction;
				let curvature = direction.dot(&q);
				if curvature.abs() < f64::MIN_POSITIVE {
					break;
				}
				let alpha = rho / curvature;
				x.axpy(alpha, &direction, 1.0);
				residual.axpy(-alpha, &q, 1.0);
				residual_norm2 = residual.norm_squared();
				if residual_norm2 < threshold {
					break;
				}
				let z = self.preconditioner.apply(&residual);
				let rho_next = residual.dot(&z);
				direction = z + direction * (rho_next / rho);
				rho = rho_next;
				iterations += 1;
			}
		}

		let error = (residual_norm2 / rhs_norm2).sqrt();
		SolveReport {
			iterations,
			error,
			info: if error <= tolerance { ComputationInfo::Success } else { ComputationInfo::NoConvergence },
		}
	}
}

impl<P: Preconditioner> Dimensions for ConjugateGradient<P> {
	fn rows(&self) -> usize {
		self.matrix.as_ref().map_or(0, |m| m.nrows())
	}

	fn cols(&self) -> usize {
		self.matrix.as_ref().map_or(0, |m| m.ncols())
	}
}

impl<P: Preconditioner> Factorize for ConjugateGradient<P> {
	type Input = DMatrix<f64>;
	type Status = ComputationInfo;

	/// Takes the system matrix and prepares the preconditioner for it.
	fn compute(&mut self, input: DMatrix<f64>) {
		let report = self.report.get_mut();
		*report = SolveReport::IDLE;
		if !input.is_square() {
			self.matrix = None;
			return;
		}
		self.preconditioner.prepare(&input);
		self.matrix = Some(input);
		report.info = ComputationInfo::Success;
	}

	fn info(&self) -> ComputationInfo {
		self.report.lock().info
	}
}

impl<P: Preconditioner> IterativeControl for ConjugateGradient<P> {
	type Status = ComputationInfo;

	fn iterations(&self) -> usize {
		self.report.lock().iterations
	}

	fn tolerance(&self) -> f64 {
		self.tolerance
	}

	fn set_tolerance(&mut self, tolerance: f64) {
		self.tolerance = tolerance;
	}

	/// The explicit limit, or the per-unknown factor times the column count.
	fn max_iterations(&self) -> usize {
		self.max_iterations.unwrap_or(self.max_iterations_factor.saturating_mul(self.cols()))
	}

	fn set_max_iterations(&mut self, max_iterations: usize) {
		self.max_iterations = Some(max_iterations);
	}

	fn error(&self) -> f64 {
		self.report.lock().error
	}

	fn info(&self) -> ComputationInfo {
		self.report.lock().info
	}
}

impl<P: Preconditioner> LinearSolve for ConjugateGradient<P> {
	type Error = LinalgError;

	fn solve(&self, rhs: &DVector<f64>) -> Result<DVector<f64>, LinalgError> {
		self.solve_with_guess(rhs, &DVector::zeros(rhs.len()))
	}
}

impl<P: Preconditioner> WarmStart for ConjugateGradient<P> {
	fn solve_with_guess(&self, rhs: &DVector<f64>, guess: &DVector<f64>) -> Result<DVector<f64>, LinalgError> {
		let matrix = self.ready()?;
		check_rows(matrix.nrows(), rhs)?;
		check_rows(matrix.ncols(), guess)?;
		let mut x = guess.clone();
		let report = self.iterate(matrix, rhs, &mut x);
		tracing::trace!(iterations = report.iterations, error = report.error, info = report.info.name(), "conjugate gradient finished");
		*self.report.lock() = report;
		Ok(x)
	}
}

impl<P: Preconditioner> Preconditioned for ConjugateGradient<P> {
	type Preconditioner = P;

	fn preconditioner(&self) -> &P {
		&self.preconditioner
	}

	fn preconditioner_mut(&mut self) -> &mut P {
		&mut self.preconditioner
	}
}
