//! Kind-specific views over reflected values.
//!
//! ## Menu
//!
//! - [`ReflectRef`] / [`ReflectMut`]: the result of [`Reflect::reflect_ref`] and
//!   [`Reflect::reflect_mut`], one variant per [`ReflectKind`].
//!
//! The following are subtraits of [`Reflect`], providing data access for each kind.
//!
//! - [`Struct`]: named fields, by declaration index.
//! - [`List`]: growable sequences (e.g. `Vec<i32>`).
//! - [`Array`]: fixed-size sequences (e.g. `[i32; 5]`).
//! - [`Map`]: key/value containers (e.g. `HashMap<String, f32>`).
//! - [`Pointer`]: `Option<T>` and `Box<T>`.
//! - [`Dynamic`]: `Box<dyn Reflect>`, a slot holding any reflected value.
//!
//! [`Reflect`]: crate::Reflect
//! [`Reflect::reflect_ref`]: crate::Reflect::reflect_ref
//! [`Reflect::reflect_mut`]: crate::Reflect::reflect_mut
//! [`ReflectKind`]: crate::info::ReflectKind

// -----------------------------------------------------------------------------
// Modules

mod kind;
mod list_ops;
mod map_ops;
mod pointer_ops;
mod struct_ops;

// -----------------------------------------------------------------------------
// Exports

pub use kind::{ReflectMut, ReflectRef};
pub use list_ops::{Array, List};
pub use map_ops::{Map, MapInsertError};
pub use pointer_ops::{Dynamic, Pointer};
pub use struct_ops::Struct;
