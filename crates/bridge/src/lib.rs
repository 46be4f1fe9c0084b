//! Type exposure and ownership bridging.
//!
//! Native types are exposed to the runtime once, through a [`TypeRegistry`]. The class
//! for a type is assembled by applying capability [`Fragment`]s to a [`ClassBuilder`];
//! each binding the builder records carries an explicit ownership policy chosen by the
//! [`policy`] table. The [`link`] module aliases an exposed class under more names.
//!
//! ```
//! use algebind_bridge::fragments::{Identity, Shape};
//! use algebind_bridge::runtime::{Module, Value};
//! use algebind_bridge::{TypeRegistry, expose};
//! use nalgebra::DMatrix;
//!
//! let registry = TypeRegistry::new("example");
//! let module = Module::new("m");
//! expose::<DMatrix<f64>>(&registry, &module, "Matrix", |class| {
//! 	class.init("(rows, cols)", |args| Ok(DMatrix::zeros(args.get(0)?, args.get(1)?)));
//! 	class.apply((Shape, Identity::default()))?;
//! 	Ok(())
//! })?;
//!
//! let m = module.construct("Matrix", &[Value::Int(2), Value::Int(3)])?;
//! assert_eq!(m.call("size", &[])?, Value::Int(6));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod capability;
pub mod cast;
pub mod error;
pub mod fragment;
pub mod fragments;
pub mod identity;
pub mod link;
pub mod policy;
pub mod registry;
pub mod traits;

pub use algebind_runtime as runtime;
pub use builder::{ClassBuilder, validate_name};
pub use capability::{Capability, CapabilitySet};
pub use cast::{Args, FromArgs, FromValue};
pub use error::BindError;
pub use fragment::{FnFragment, Fragment, from_fn};
pub use identity::{IdentityStrategy, IdentityToken, identity_of};
pub use link::{LinkOutcome, expose, link, link_registered};
pub use policy::{Crossing, ReturnKind, select};
pub use registry::{ExposedType, LinkRecord, Registration, TypeRegistry};
pub use traits::{Dimensions, Factorize, IterativeControl, LinearSolve, MatrixSolve, Native, Preconditioned, WarmStart};
