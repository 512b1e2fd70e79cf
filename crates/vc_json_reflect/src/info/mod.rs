//! Compile-time type information.
//!
//! ## Menu
//!
//! - [`Type`]: a [`TypeId`], the type path and a zero-value constructor.
//! - [`TypeInfo`]: an enum describing the shape of a reflected type:
//!     - [`StructInfo`]: named fields ([`NamedField`]) with their raw annotations.
//!     - [`ListInfo`]: growable sequences, e.g. `Vec<T>`.
//!     - [`ArrayInfo`]: fixed-size sequences, e.g. `[T; N]`.
//!     - [`MapInfo`]: key/value containers, e.g. `HashMap<K, V>`.
//!     - [`PointerInfo`]: `Option<T>` (nullable) and `Box<T>` (never null).
//!     - [`DynamicInfo`]: `Box<dyn Reflect>`, the concrete type is only known per value.
//!     - [`ScalarInfo`]: numbers, `bool`, `String` and time, see [`ScalarKind`].
//!     - [`OpaqueInfo`]: types whose content is only reachable through [type traits].
//! - [`ReflectKind`]: a fast discriminator of `TypeInfo`.
//!
//! [`TypeId`]: core::any::TypeId
//! [type traits]: crate::traits

// -----------------------------------------------------------------------------
// Modules

mod container_info;
mod scalar_info;
mod struct_info;
mod type_info;

// -----------------------------------------------------------------------------
// Exports

pub use container_info::{ArrayInfo, DynamicInfo, ListInfo, MapInfo, PointerInfo};
pub use scalar_info::{OpaqueInfo, ScalarInfo, ScalarKind};
pub use struct_info::{NamedField, StructInfo};
pub use type_info::{ReflectKind, ReflectKindError, Type, TypeInfo, zero_check};
