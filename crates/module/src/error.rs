use algebind_bridge::BindError;
use algebind_bridge::runtime::RuntimeError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AssemblyError {
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error(transparent)]
	Bind(#[from] BindError),
	#[error(transparent)]
	Runtime(#[from] RuntimeError),
	#[error("alias refers to '{class}', which is not exposed")]
	UnknownAliasTarget { class: String },
}
