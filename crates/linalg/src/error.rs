/// Failures of a native solve. They reach runtime callers untranslated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinalgError {
	#[error("{decomposition} is not initialized, call compute() first")]
	NotInitialized { decomposition: &'static str },

	#[error("right-hand side has {got} row(s), expected {expected}")]
	DimensionMismatch { expected: usize, got: usize },

	#[error("{decomposition} needs a square matrix, got {rows}x{cols}")]
	NotSquare { decomposition: &'static str, rows: usize, cols: usize },

	#[error("matrix is singular")]
	Singular,
}
