//! Per-instance identity.
//!
//! # Strategies
//!
//! - [`IdentityStrategy::Serial`] (default): the serial the runtime assigns when the
//!   object is created. Stable for the object's lifetime and never reused, so two
//!   distinct objects never share a token even across time.
//! - [`IdentityStrategy::Address`]: the address of the native value. Native values are
//!   boxed or otherwise pinned for as long as an object refers to them, so the token is
//!   stable while the object lives. Addresses are reused after a value is freed, and a
//!   borrowed view of a field at offset zero shares its owner's address. Zero-sized
//!   natives all sit at one dangling address, so they get their serial instead, tagged
//!   with the top bit, which no user-space address carries. A relocating allocator would
//!   break this strategy entirely.
//!
//! Borrowed views are memoized per native sub-object and writability, so repeated
//! borrows of one sub-object through one binding report one token under either strategy.

use std::fmt;

use algebind_runtime::{Object, RuntimeError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityToken(u64);

impl IdentityToken {
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for IdentityToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:#x}", self.0)
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityStrategy {
	#[default]
	Serial,
	Address,
}

const ZERO_SIZED_TAG: u64 = 1 << 63;

pub fn identity_of(obj: &Object, strategy: IdentityStrategy) -> Result<IdentityToken, RuntimeError> {
	match strategy {
		IdentityStrategy::Serial => Ok(IdentityToken(obj.serial())),
		IdentityStrategy::Address if obj.native_size()? == 0 => Ok(IdentityToken(obj.serial() | ZERO_SIZED_TAG)),
		IdentityStrategy::Address => Ok(IdentityToken(obj.address()? as u64)),
	}
}
