//! Runtime value model.
//!
//! Values are what crosses the boundary by copy: primitives, dense arrays, enum
//! members and lists. Exposed native instances travel as [`Value::Object`], which is
//! a shared handle and never a copy.

use std::fmt;
use std::sync::Arc;

use crate::object::Object;

/// Shape of a dense array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
	Vector(usize),
	Matrix(usize, usize),
}

impl Shape {
	pub const fn rows(self) -> usize {
		match self {
			Self::Vector(n) => n,
			Self::Matrix(rows, _) => rows,
		}
	}

	pub const fn cols(self) -> usize {
		match self {
			Self::Vector(_) => 1,
			Self::Matrix(_, cols) => cols,
		}
	}

	pub const fn len(self) -> usize {
		self.rows() * self.cols()
	}

	pub const fn is_empty(self) -> bool {
		self.len() == 0
	}
}

impl fmt::Display for Shape {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Vector(n) => write!(f, "({n},)"),
			Self::Matrix(rows, cols) => write!(f, "({rows}, {cols})"),
		}
	}
}

/// Dense column-major `f64` array, the runtime's ndarray.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
	shape: Shape,
	data: Vec<f64>,
}

impl NdArray {
	pub fn vector(data: Vec<f64>) -> Self {
		Self {
			shape: Shape::Vector(data.len()),
			data,
		}
	}

	/// Builds a matrix from column-major storage.
	///
	/// Returns `None` when `data.len() != rows * cols`.
	pub fn matrix(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
		(rows * cols == data.len()).then_some(Self {
			shape: Shape::Matrix(rows, cols),
			data,
		})
	}

	/// Builds a matrix from row slices. Ragged input yields `None`.
	pub fn from_rows(rows: &[&[f64]]) -> Option<Self> {
		let nrows = rows.len();
		let ncols = rows.first().map_or(0, |r| r.len());
		if rows.iter().any(|r| r.len() != ncols) {
			return None;
		}
		let mut data = Vec::with_capacity(nrows * ncols);
		for c in 0..ncols {
			for row in rows {
				data.push(row[c]);
			}
		}
		Self::matrix(nrows, ncols, data)
	}

	pub fn shape(&self) -> Shape {
		self.shape
	}

	pub fn rows(&self) -> usize {
		self.shape.rows()
	}

	pub fn cols(&self) -> usize {
		self.shape.cols()
	}

	pub fn is_vector(&self) -> bool {
		matches!(self.shape, Shape::Vector(_))
	}

	/// Column-major element storage.
	pub fn data(&self) -> &[f64] {
		&self.data
	}

	pub fn into_data(self) -> Vec<f64> {
		self.data
	}

	pub fn get(&self, row: usize, col: usize) -> Option<f64> {
		if row >= self.rows() || col >= self.cols() {
			return None;
		}
		self.data.get(col * self.rows() + row).copied()
	}
}

/// Member of an exposed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue {
	pub type_name: &'static str,
	pub variant: &'static str,
	pub code: i64,
}

impl fmt::Display for EnumValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.type_name, self.variant)
	}
}

#[derive(Debug, Clone)]
pub enum Value {
	None,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
	Array(NdArray),
	Enum(EnumValue),
	List(Vec<Value>),
	Object(Arc<Object>),
}

impl PartialEq for Value {
	/// Objects compare by identity, everything else by value.
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::None, Self::None) => true,
			(Self::Bool(a), Self::Bool(b)) => a == b,
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::Float(a), Self::Float(b)) => a == b,
			(Self::Str(a), Self::Str(b)) => a == b,
			(Self::Array(a), Self::Array(b)) => a == b,
			(Self::Enum(a), Self::Enum(b)) => a == b,
			(Self::List(a), Self::List(b)) => a == b,
			(Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl Value {
	pub fn get_type(&self) -> ValueType {
		match self {
			Self::None => ValueType::None,
			Self::Bool(_) => ValueType::Bool,
			Self::Int(_) => ValueType::Int,
			Self::Float(_) => ValueType::Float,
			Self::Str(_) => ValueType::Str,
			Self::Array(_) => ValueType::Array,
			Self::Enum(_) => ValueType::Enum,
			Self::List(_) => ValueType::List,
			Self::Object(_) => ValueType::Object,
		}
	}

	pub fn is_none(&self) -> bool {
		matches!(self, Self::None)
	}

	/// True for values that carry no aliasing: everything except arrays, lists and objects.
	pub fn is_primitive(&self) -> bool {
		matches!(self, Self::None | Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::Str(_) | Self::Enum(_))
	}

	pub fn as_bool(&self) -> Result<bool, ValueTypeError> {
		match self {
			Self::Bool(val) => Ok(*val),
			other => Err(ValueTypeError::new("bool", other.get_type())),
		}
	}

	pub fn as_int(&self) -> Result<i64, ValueTypeError> {
		match self {
			Self::Int(val) => Ok(*val),
			other => Err(ValueTypeError::new("int", other.get_type())),
		}
	}

	/// Ints widen to floats, matching the usual dynamic-language numeric tower.
	pub fn as_float(&self) -> Result<f64, ValueTypeError> {
		match self {
			Self::Float(val) => Ok(*val),
			Self::Int(val) => Ok(*val as f64),
			other => Err(ValueTypeError::new("float", other.get_type())),
		}
	}

	pub fn as_str(&self) -> Result<&str, ValueTypeError> {
		match self {
			Self::Str(val) => Ok(val),
			other => Err(ValueTypeError::new("str", other.get_type())),
		}
	}

	pub fn as_array(&self) -> Result<&NdArray, ValueTypeError> {
		match self {
			Self::Array(val) => Ok(val),
			other => Err(ValueTypeError::new("array", other.get_type())),
		}
	}

	pub fn as_enum(&self) -> Result<EnumValue, ValueTypeError> {
		match self {
			Self::Enum(val) => Ok(*val),
			other => Err(ValueTypeError::new("enum", other.get_type())),
		}
	}

	pub fn as_list(&self) -> Result<&[Value], ValueTypeError> {
		match self {
			Self::List(vals) => Ok(vals),
			other => Err(ValueTypeError::new("list", other.get_type())),
		}
	}

	pub fn as_object(&self) -> Result<&Arc<Object>, ValueTypeError> {
		match self {
			Self::Object(obj) => Ok(obj),
			other => Err(ValueTypeError::new("object", other.get_type())),
		}
	}

	pub fn into_object(self) -> Result<Arc<Object>, Self> {
		match self {
			Self::Object(obj) => Ok(obj),
			other => Err(other),
		}
	}
}

impl From<bool> for Value {
	fn from(val: bool) -> Self {
		Self::Bool(val)
	}
}

impl From<i64> for Value {
	fn from(val: i64) -> Self {
		Self::Int(val)
	}
}

impl From<f64> for Value {
	fn from(val: f64) -> Self {
		Self::Float(val)
	}
}

impl From<&str> for Value {
	fn from(val: &str) -> Self {
		Self::Str(val.to_owned())
	}
}

impl From<NdArray> for Value {
	fn from(val: NdArray) -> Self {
		Self::Array(val)
	}
}

impl From<Arc<Object>> for Value {
	fn from(obj: Arc<Object>) -> Self {
		Self::Object(obj)
	}
}

/// Coarse value type used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
	None,
	Bool,
	Int,
	Float,
	Str,
	Array,
	Enum,
	List,
	Object,
}

impl fmt::Display for ValueType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::None => "none",
			Self::Bool => "bool",
			Self::Int => "int",
			Self::Float => "float",
			Self::Str => "str",
			Self::Array => "array",
			Self::Enum => "enum",
			Self::List => "list",
			Self::Object => "object",
		};
		f.write_str(name)
	}
}

/// Error returned by typed accessors like [`Value::as_array`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, got {got}")]
pub struct ValueTypeError {
	expected: &'static str,
	got: ValueType,
}

impl ValueTypeError {
	pub fn new(expected: &'static str, got: ValueType) -> Self {
		Self { expected, got }
	}

	pub fn expected(&self) -> &'static str {
		self.expected
	}

	pub fn got(&self) -> ValueType {
		self.got
	}
}
