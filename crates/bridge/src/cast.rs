//! Conversions from runtime values into native arguments.

use algebind_runtime::{RuntimeError, Value, ValueType, ValueTypeError};
use nalgebra::{DMatrix, DVector};

/// A native type that can be extracted from a runtime argument.
pub trait FromValue: Sized {
	fn from_value(value: &Value) -> Result<Self, ValueTypeError>;
}

impl FromValue for f64 {
	fn from_value(value: &Value) -> Result<Self, ValueTypeError> {
		value.as_float()
	}
}

impl FromValue for i64 {
	fn from_value(value: &Value) -> Result<Self, ValueTypeError> {
		value.as_int()
	}
}

impl FromValue for usize {
	fn from_value(value: &Value) -> Result<Self, ValueTypeError> {
		let n = value.as_int()?;
		usize::try_from(n).map_err(|_| ValueTypeError::new("non-negative int", ValueType::Int))
	}
}

impl FromValue for bool {
	fn from_value(value: &Value) -> Result<Self, ValueTypeError> {
		value.as_bool()
	}
}

impl FromValue for String {
	fn from_value(value: &Value) -> Result<Self, ValueTypeError> {
		value.as_str().map(str::to_owned)
	}
}

impl FromValue for Value {
	fn from_value(value: &Value) -> Result<Self, ValueTypeError> {
		Ok(value.clone())
	}
}

/// Accepts 1-d arrays only, so a single-column matrix still selects matrix overloads.
impl FromValue for DVector<f64> {
	fn from_value(value: &Value) -> Result<Self, ValueTypeError> {
		match value {
			Value::Array(array) if array.is_vector() => Ok(DVector::from_column_slice(array.data())),
			Value::Array(_) => Err(ValueTypeError::new("vector", ValueType::Array)),
			other => Err(ValueTypeError::new("vector", other.get_type())),
		}
	}
}

/// Accepts a 2-d array, or an exposed object holding a `DMatrix<f64>`.
impl FromValue for DMatrix<f64> {
	fn from_value(value: &Value) -> Result<Self, ValueTypeError> {
		match value {
			Value::Array(array) if !array.is_vector() => Ok(DMatrix::from_column_slice(array.rows(), array.cols(), array.data())),
			Value::Object(obj) => obj
				.read(|m: &DMatrix<f64>| m.clone())
				.map_err(|_| ValueTypeError::new("matrix", ValueType::Object)),
			other => Err(ValueTypeError::new("matrix", other.get_type())),
		}
	}
}

/// Positional arguments of one call, tagged with the callable's name for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
	callable: &'a str,
	values: &'a [Value],
}

impl<'a> Args<'a> {
	pub fn new(callable: &'a str, values: &'a [Value]) -> Self {
		Self { callable, values }
	}

	pub fn callable(&self) -> &'a str {
		self.callable
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn values(&self) -> &'a [Value] {
		self.values
	}

	pub fn expect_arity(&self, expected: usize) -> Result<(), RuntimeError> {
		self.expect_range(expected, expected)
	}

	/// Accepts between `min` and `max` arguments, inclusive. Errors report `max`.
	pub fn expect_range(&self, min: usize, max: usize) -> Result<(), RuntimeError> {
		if (min..=max).contains(&self.values.len()) {
			return Ok(());
		}
		Err(RuntimeError::Arity {
			callable: self.callable.to_string(),
			expected: max,
			got: self.values.len(),
		})
	}

	/// Converts argument `index`. A missing argument is an arity error.
	pub fn get<V: FromValue>(&self, index: usize) -> Result<V, RuntimeError> {
		let value = self.values.get(index).ok_or_else(|| RuntimeError::Arity {
			callable: self.callable.to_string(),
			expected: index + 1,
			got: self.values.len(),
		})?;
		V::from_value(value).map_err(|source| RuntimeError::ArgumentMismatch {
			callable: self.callable.to_string(),
			index,
			source,
		})
	}

	/// Converts argument `index`, or returns `default` when it was not passed.
	pub fn get_or<V: FromValue>(&self, index: usize, default: V) -> Result<V, RuntimeError> {
		if index < self.values.len() { self.get(index) } else { Ok(default) }
	}
}

/// A whole argument list decoded up front, before the receiver is locked.
///
/// Mutating bindings take their arguments through this so that converting an argument
/// which borrows from the receiver never happens under the receiver's write lock.
pub trait FromArgs: Sized {
	fn from_args(args: &Args<'_>) -> Result<Self, RuntimeError>;
}

macro_rules! tuple_from_args {
	($($arity:literal => ($($ty:ident $index:tt),*)),+ $(,)?) => {
		$(
			impl<$($ty: FromValue),*> FromArgs for ($($ty,)*) {
				fn from_args(args: &Args<'_>) -> Result<Self, RuntimeError> {
					args.expect_arity($arity)?;
					Ok(($(args.get::<$ty>($index)?,)*))
				}
			}
		)+
	};
}

tuple_from_args! {
	0 => (),
	1 => (A 0),
	2 => (A 0, B 1),
	3 => (A 0, B 1, C 2),
}
