//! Dynamic runtime object model.
//!
//! A minimal in-process runtime that native types are exposed into: [`Value`]s,
//! [`Class`] objects, [`Object`] instances and [`Module`] scopes. Every bound method
//! and property carries an explicit [`OwnershipPolicy`], and results are checked
//! against it after each call.
//!
//! # Key types
//!
//! | Type | Role |
//! |---|---|
//! | [`Class`] / [`ClassSpec`] | Exposed type: constructors, methods, properties |
//! | [`Object`] | Instance with owned, internally borrowed or externally borrowed storage |
//! | [`Module`] | Scope of named attributes |
//! | [`Value`] | Everything that crosses the boundary |

pub mod class;
pub mod error;
pub mod module;
pub mod native;
pub mod object;
pub mod policy;
pub mod value;

pub use class::{Class, ClassSpec, Constructor, ConstructorFn, GetterFn, Method, MethodFn, NativeBox, Property, SetterFn};
pub use error::RuntimeError;
pub use module::{Attr, Function, FunctionFn, Module};
pub use native::NativeType;
pub use object::{Object, Projection, SharedCell};
pub use policy::OwnershipPolicy;
pub use value::{EnumValue, NdArray, Shape, Value, ValueType, ValueTypeError};
