//! Reflection for foreign types.
//!
//! ## Implemented Menu
//!
//! - scalar: `bool`, `i8`-`i64`, `u8`-`u64`, `isize`, `usize`, `f32`, `f64`, `String`,
//!   `chrono::DateTime<Utc>`
//! - list: `Vec<T>`
//! - array: `[T; N]`
//! - map: `std::collections::HashMap<K, V, S>`, `hashbrown::HashMap<K, V, S>`, `BTreeMap<K, V>`
//! - pointer: `Option<T>` (nullable), `Box<T>`
//! - dynamic: `Box<dyn Reflect>`
//! - opaque: `serde_json::Value`, with serde bridges attached

// -----------------------------------------------------------------------------
// Modules

mod dynamic;
mod json_value;
mod map;
mod pointer;
mod scalar;
mod sequence;
