use algebind_bridge::policy::Crossing;
use algebind_bridge::runtime::{Attr, Module, RuntimeError};
use algebind_linalg::ComputationInfo;

/// Binds the `ComputationInfo` enum namespace and exports its members into `scope`.
///
/// An exported member never replaces an existing binding.
pub(crate) fn computation_info(scope: &Module) -> Result<(), RuntimeError> {
	let namespace = scope.def_submodule(ComputationInfo::TYPE_NAME)?;
	for info in ComputationInfo::ALL {
		namespace.set_attr(info.name(), Attr::Value(info.into_value()));
		if scope.try_bind(info.name(), Attr::Value(info.into_value())).is_err() {
			tracing::debug!(scope = scope.qualified_name(), name = info.name(), "enum member not exported, name taken");
		}
	}
	Ok(())
}
