//! Runtime type descriptors and safe dynamic value access.
//!
//! Rust has no runtime reflection, so this crate provides the small subset the
//! JSON codec needs:
//!
//! - [`TypeInfo`]: a static descriptor of a type's shape (struct fields and their
//!   annotations, list/array item, map key and value, pointer target, scalar kind ...).
//! - [`Reflect`]: object-safe access to a value, cast into one of the
//!   [`ReflectRef`]/[`ReflectMut`] views such as [`Struct`] or [`List`].
//! - [`TypeTraits`]: capability records (serde bridges, custom codecs) attached to a
//!   type when its `TypeInfo` is built, so callers check capabilities once instead of
//!   per value.
//!
//! The preferred way to implement these traits is [`#[derive(Reflect)]`](derive::Reflect).
//!
//! ```
//! use vc_json_reflect::{Reflect, Typed, derive::Reflect};
//!
//! #[derive(Reflect, Default)]
//! struct Foo {
//!     #[tag(json = "ID")]
//!     id: i32,
//!     name: Option<String>,
//! }
//!
//! let info = Foo::type_info().as_struct().unwrap();
//! assert_eq!(info.field_len(), 2);
//! assert_eq!(info.field_at(0).unwrap().tag("json"), Some("ID"));
//! ```
//!
//! [`TypeInfo`]: info::TypeInfo
//! [`ReflectRef`]: ops::ReflectRef
//! [`ReflectMut`]: ops::ReflectMut
//! [`Struct`]: ops::Struct
//! [`List`]: ops::List
//! [`TypeTraits`]: traits::TypeTraits

// Generated code always refers to `::vc_json_reflect`, including inside this crate.
extern crate self as vc_json_reflect;

// -----------------------------------------------------------------------------
// Modules

mod cell;
mod reflection;

pub mod impls;
pub mod info;
pub mod ops;
pub mod traits;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use cell::{GenericTypeInfoCell, NonGenericTypeInfoCell};
pub use reflection::{Reflect, Typed};
pub use vc_json_reflect_derive as derive;
