use crate::policy::OwnershipPolicy;
use crate::value::ValueTypeError;

/// Errors raised to runtime callers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
	#[error("'{owner}' has no attribute '{name}'")]
	Attribute { owner: String, name: String },

	/// An argument did not convert; dispatch moves on to the next overload.
	#[error("{callable}: argument {index}: {source}")]
	ArgumentMismatch {
		callable: String,
		index: usize,
		#[source]
		source: ValueTypeError,
	},

	/// Wrong number of arguments; dispatch moves on to the next overload.
	#[error("{callable}: expected {expected} argument(s), got {got}")]
	Arity { callable: String, expected: usize, got: usize },

	#[error("{callable}: no overload accepts the given arguments ({tried} tried)")]
	NoMatchingOverload { callable: String, tried: usize },

	#[error("'{class}' cannot be constructed from the runtime")]
	NotConstructible { class: String },

	#[error("'{class}' does not hold a native {expected}")]
	NativeTypeMismatch { class: String, expected: &'static str },

	#[error("'{class}' is a read-only view")]
	ReadOnly { class: String },

	#[error("property '{name}' of '{class}' is read-only")]
	ReadOnlyProperty { class: String, name: String },

	#[error("{callable}: result violates declared {policy} policy")]
	PolicyViolation { callable: String, policy: OwnershipPolicy },

	#[error("{class}: {message}")]
	Native { class: String, message: String },
}

impl RuntimeError {
	/// True for errors that only mean "this overload does not apply".
	pub fn is_mismatch(&self) -> bool {
		matches!(self, Self::ArgumentMismatch { .. } | Self::Arity { .. })
	}

	pub fn native(class: impl Into<String>, message: impl std::fmt::Display) -> Self {
		Self::Native {
			class: class.into(),
			message: message.to_string(),
		}
	}
}
