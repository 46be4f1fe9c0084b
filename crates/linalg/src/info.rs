use algebind_bridge::policy::{Crossing, ReturnKind};
use algebind_bridge::runtime::{EnumValue, Value, ValueType, ValueTypeError};
use algebind_bridge::FromValue;

/// Outcome of the last `compute` or iterative solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComputationInfo {
	Success,
	/// The provided data did not satisfy the prerequisites.
	NumericalIssue,
	/// An iterative procedure stopped before reaching its tolerance.
	NoConvergence,
	/// The inputs were invalid, or the object was used before `compute`.
	InvalidInput,
}

impl ComputationInfo {
	pub const TYPE_NAME: &'static str = "ComputationInfo";

	pub const ALL: [Self; 4] = [Self::Success, Self::NumericalIssue, Self::NoConvergence, Self::InvalidInput];

	pub const fn name(self) -> &'static str {
		match self {
			Self::Success => "Success",
			Self::NumericalIssue => "NumericalIssue",
			Self::NoConvergence => "NoConvergence",
			Self::InvalidInput => "InvalidInput",
		}
	}

	pub const fn code(self) -> i64 {
		match self {
			Self::Success => 0,
			Self::NumericalIssue => 1,
			Self::NoConvergence => 2,
			Self::InvalidInput => 3,
		}
	}

	pub const fn doc(self) -> &'static str {
		match self {
			Self::Success => "Computation was successful.",
			Self::NumericalIssue => "The provided data did not satisfy the prerequisites.",
			Self::NoConvergence => "Iterative procedure did not converge.",
			Self::InvalidInput => "The inputs are invalid, or the algorithm has been improperly called.",
		}
	}

	pub fn from_code(code: i64) -> Option<Self> {
		Self::ALL.into_iter().find(|info| info.code() == code)
	}

	pub fn to_enum(self) -> EnumValue {
		EnumValue {
			type_name: Self::TYPE_NAME,
			variant: self.name(),
			code: self.code(),
		}
	}
}

impl Crossing for ComputationInfo {
	const KIND: ReturnKind = ReturnKind::Primitive;

	fn into_value(self) -> Value {
		Value::Enum(self.to_enum())
	}
}

/// Accepts a member of the exposed enum or its integer code.
impl FromValue for ComputationInfo {
	fn from_value(value: &Value) -> Result<Self, ValueTypeError> {
		let code = match value {
			Value::Enum(e) if e.type_name == Self::TYPE_NAME => e.code,
			Value::Int(code) => *code,
			other => return Err(ValueTypeError::new("ComputationInfo", other.get_type())),
		};
		Self::from_code(code).ok_or_else(|| ValueTypeError::new("ComputationInfo", ValueType::Int))
	}
}
