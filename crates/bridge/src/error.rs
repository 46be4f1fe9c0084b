use algebind_runtime::RuntimeError;

/// Errors raised while exposing native types.
///
/// A duplicate registration is not an error: it resolves to the existing class.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindError {
	#[error("'{name}' is not a valid binding name")]
	InvalidName { name: String },

	/// A binding needs another native type to be exposed before it.
	#[error("{needed_by} needs '{type_name}' to be exposed first")]
	UnregisteredType { type_name: &'static str, needed_by: String },

	/// A build callback tried to register the type it is building.
	#[error("registration of '{type_name}' re-entered itself")]
	Reentrant { type_name: &'static str },

	#[error("registry '{registry}' is frozen; '{type_name}' was never exposed")]
	Frozen { registry: &'static str, type_name: &'static str },

	#[error("'{scope}.{name}' is already bound to a different {kind}")]
	NameTaken { scope: String, name: String, kind: &'static str },

	#[error(transparent)]
	Runtime(#[from] RuntimeError),
}
