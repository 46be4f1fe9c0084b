//! Dense decompositions.
//!
//! Each type follows the same lifecycle: construct empty (or directly from a matrix),
//! `compute` a factorization, then query `info` and solve. Solving before a
//! successful `compute` is [`LinalgError::NotInitialized`].
//!
//! | Type | Factorization | Solves |
//! |---|---|---|
//! | [`Llt`] | Cholesky `A = L Lᵀ` | vector and matrix |
//! | [`PartialPivLu`] | `P A = L U` | vector and matrix |
//! | [`HouseholderQr`] | `A = Q R` | square systems |
//! | [`JacobiSvd`] | `A = U Σ Vᵀ` | least squares |
//! | [`SelfAdjointEigenSolver`] | `A = V Λ Vᵀ` | none |

mod eigen;
mod llt;
mod lu;
mod qr;
mod svd;

pub use eigen::SelfAdjointEigenSolver;
pub use llt::Llt;
pub use lu::PartialPivLu;
pub use qr::HouseholderQr;
pub use svd::JacobiSvd;

use nalgebra::{DMatrix, Dim, Matrix, RawStorage};

use crate::error::LinalgError;
use crate::info::ComputationInfo;

/// Rejects right-hand sides whose row count differs from the factored matrix.
pub(crate) fn check_rows<R: Dim, C: Dim, S: RawStorage<f64, R, C>>(expected: usize, rhs: &Matrix<f64, R, C, S>) -> Result<(), LinalgError> {
	if rhs.nrows() == expected {
		Ok(())
	} else {
		Err(LinalgError::DimensionMismatch { expected, got: rhs.nrows() })
	}
}

/// Screens an input the way every decomposition does before factoring it.
pub(crate) fn screen(input: &DMatrix<f64>, needs_square: bool) -> Option<ComputationInfo> {
	if needs_square && !input.is_square() {
		return Some(ComputationInfo::InvalidInput);
	}
	if input.iter().any(|v| !v.is_finite()) {
		return Some(ComputationInfo::NumericalIssue);
	}
	None
}

/// Largest absolute column sum.
pub(crate) fn l1_norm(m: &DMatrix<f64>) -> f64 {
	m.column_iter().map(|c| c.iter().map(|v| v.abs()).sum::<f64>()).fold(0.0, f64::max)
}
