//! Assembly configuration, loaded from TOML.
//!
//! Every field has a default, so an empty document assembles the full module:
//!
//! ```toml
//! module = "algebind"
//! solvers = "solvers"
//! identity = "serial"
//!
//! [groups]
//! dense = true
//! iterative = true
//!
//! [[alias]]
//! class = "LLT"
//! scope = "legacy"
//! name = "Cholesky"
//! ```

use std::path::{Path, PathBuf};

use algebind_bridge::{IdentityStrategy, validate_name};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to parse assembly config: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("invalid {field} '{value}': expected an identifier")]
	InvalidName { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssemblyConfig {
	/// Root module name.
	pub module: String,
	/// Name of the submodule holding the iterative solvers.
	pub solvers: String,
	/// How `id()` identifies instances.
	pub identity: IdentityStrategy,
	pub groups: Groups,
	#[serde(rename = "alias")]
	pub aliases: Vec<Alias>,
}

impl Default for AssemblyConfig {
	fn default() -> Self {
		Self {
			module: "algebind".into(),
			solvers: "solvers".into(),
			identity: IdentityStrategy::default(),
			groups: Groups::default(),
			aliases: Vec::new(),
		}
	}
}

/// Which solver families to expose. `Matrix` and `ComputationInfo` are always exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Groups {
	pub dense: bool,
	pub iterative: bool,
}

impl Default for Groups {
	fn default() -> Self {
		Self { dense: true, iterative: true }
	}
}

/// An extra name for an exposed class, bound in a submodule of the root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Alias {
	/// Exposed class name, looked up in the root module, then in the solvers submodule.
	pub class: String,
	/// Dotted path of the target submodule, created as needed.
	pub scope: String,
	/// Name to bind. Defaults to `class`.
	#[serde(default)]
	pub name: Option<String>,
}

impl Alias {
	pub fn name(&self) -> &str {
		self.name.as_deref().unwrap_or(&self.class)
	}
}

impl AssemblyConfig {
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(source)?;
		config.validate()?;
		Ok(config)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&source)
	}

	/// Checks the names the assembler will bind. Alias targets are checked at assembly.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let check = |field: &'static str, value: &str| {
			validate_name(value).map_err(|_| ConfigError::InvalidName {
				field,
				value: value.to_string(),
			})
		};
		check("module", &self.module)?;
		check("solvers", &self.solvers)?;
		for alias in &self.aliases {
			for segment in alias.scope.split('.') {
				check("alias scope", segment)?;
			}
			check("alias name", alias.name())?;
		}
		Ok(())
	}
}
