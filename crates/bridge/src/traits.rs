//! Structural capabilities a native type can satisfy.
//!
//! Fragments are generic over these traits; pairing a fragment with a type that does
//! not implement the trait it needs fails to compile.

use std::any::Any;
use std::fmt::Display;

use nalgebra::{DMatrix, DVector};

use crate::cast::FromValue;
use crate::policy::Crossing;

/// Any type that can live inside a runtime object.
pub trait Native: Any + Send + Sync {}

impl<T: Any + Send + Sync> Native for T {}

pub trait Dimensions {
	fn rows(&self) -> usize;
	fn cols(&self) -> usize;

	fn size(&self) -> usize {
		self.rows() * self.cols()
	}
}

impl Dimensions for DMatrix<f64> {
	fn rows(&self) -> usize {
		self.nrows()
	}

	fn cols(&self) -> usize {
		self.ncols()
	}
}

/// Solves against a factorization the type already holds.
pub trait LinearSolve {
	type Error: Display;

	fn solve(&self, rhs: &DVector<f64>) -> Result<DVector<f64>, Self::Error>;
}

pub trait MatrixSolve: LinearSolve {
	fn solve_matrix(&self, rhs: &DMatrix<f64>) -> Result<DMatrix<f64>, Self::Error>;
}

/// Stateful decomposition: `compute` consumes the input, `info` reports how it went.
pub trait Factorize {
	type Input: FromValue;
	type Status: Crossing;

	fn compute(&mut self, input: Self::Input);
	fn info(&self) -> Self::Status;
}

/// Iterative solver state.
pub trait IterativeControl {
	type Status: Crossing;

	fn iterations(&self) -> usize;
	fn tolerance(&self) -> f64;
	fn set_tolerance(&mut self, tolerance: f64);
	fn max_iterations(&self) -> usize;
	fn set_max_iterations(&mut self, max_iterations: usize);
	/// Residual estimate reached by the last solve.
	fn error(&self) -> f64;
	fn info(&self) -> Self::Status;
}

pub trait WarmStart: LinearSolve {
	fn solve_with_guess(&self, rhs: &DVector<f64>, guess: &DVector<f64>) -> Result<DVector<f64>, Self::Error>;
}

/// Owns a preconditioner that callers may inspect and adjust in place.
pub trait Preconditioned {
	type Preconditioner: Native;

	fn preconditioner(&self) -> &Self::Preconditioner;
	fn preconditioner_mut(&mut self) -> &mut Self::Preconditioner;
}
