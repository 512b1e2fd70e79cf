//! See following macros:
//!
//! - [`Reflect`]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod impls;
mod manifest;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Reflection Derivation
///
/// `#[derive(Reflect)]` implements `Typed`, `Reflect` and, for named structs, `Struct`.
///
/// The type must implement `Default`: the default value is the zero value used as an
/// uninitialized decode destination.
///
/// ## Field Annotations
///
/// `#[tag(...)]` records raw `key = "value"` pairs on a field. They are not interpreted
/// by the reflection layer. A bare key records an empty value.
///
/// ```rust, ignore
/// #[derive(Reflect, Default)]
/// struct User {
///     #[tag(json = "ID,required", sqlx = "primaryKey")]
///     id: i64,
///     #[tag(json = "Name,omitempty", default = "value=anonymous")]
///     name: String,
/// }
/// ```
///
/// `#[reflect(embed)]` marks a field whose own fields are flattened into the owner,
/// and `#[reflect(skip)]` hides a field from reflection entirely.
///
/// Field names are recorded without the raw identifier prefix (`r#type` is `type`).
///
/// ## Type Options
///
/// ```rust, ignore
/// #[derive(Reflect, Default, PartialEq, Serialize, Deserialize)]
/// #[reflect(opaque, partial_eq, serialize, deserialize)]
/// struct Meters(f64);
/// ```
///
/// - `opaque`: do not inspect the content, the type is only reachable through type traits.
///   This is required for tuple structs and enums.
/// - `partial_eq`: register a zero check, requires `PartialEq`.
/// - `serialize` / `deserialize`: attach `TypeTraitSerialize` / `TypeTraitDeserialize`,
///   requires the matching `serde` traits.
/// - `type_trait(Path, ..)`: attach any trait implementing `FromType<Self>`.
#[proc_macro_derive(Reflect, attributes(reflect, tag))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match impls::match_reflect_impls(&ast) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}
