use nalgebra::DMatrix;

/// Relative precision used when a caller does not pass one.
pub const DEFAULT_PRECISION: f64 = 1e-12;

/// Fuzzy matrix equality: `‖a - b‖ <= precision * min(‖a‖, ‖b‖)` in the Frobenius norm.
///
/// Matrices of different shapes are never approximately equal. Comparing against an
/// all-zero matrix only succeeds for exact equality.
pub fn is_approx(a: &DMatrix<f64>, b: &DMatrix<f64>, precision: f64) -> bool {
	if a.shape() != b.shape() {
		return false;
	}
	(a - b).norm() <= precision * a.norm().min(b.norm())
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(1.0, 1.0 + 1e-14, DEFAULT_PRECISION, true)]
	#[case(1.0, 1.0 + 1e-6, DEFAULT_PRECISION, false)]
	#[case(1.0, 1.0 + 1e-6, 1e-3, true)]
	#[case(0.0, 0.0, DEFAULT_PRECISION, true)]
	#[case(0.0, 1e-300, DEFAULT_PRECISION, false)]
	fn test_is_approx(#[case] a: f64, #[case] b: f64, #[case] precision: f64, #[case] expected: bool) {
		let a = DMatrix::from_element(2, 2, a);
		let b = DMatrix::from_element(2, 2, b);
		assert_eq!(is_approx(&a, &b, precision), expected);
	}

	#[test]
	fn test_shape_mismatch_is_never_approx() {
		assert!(!is_approx(&DMatrix::zeros(2, 2), &DMatrix::zeros(4, 1), 1.0));
	}
}
