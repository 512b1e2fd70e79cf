//! Paths into the reflection crate, so generated code survives module moves.

use proc_macro2::TokenStream;
use quote::quote;

/// Get the correct access path to the `vc_json_reflect` crate.
///
/// 1. For crates that depend on `vc_json_reflect`, `::vc_json_reflect` is returned.
/// 2. For crates that depend on `vc_json`, `::vc_json::reflect` is returned.
/// 3. Otherwise `::vc_json_reflect` is returned, which may be incorrect.
///
/// This reads the caller's manifest, call it once per macro invocation.
pub(crate) fn vc_json_reflect() -> syn::Path {
    crate::manifest::Manifest::shared(|manifest| manifest.get_crate_path("vc_json_reflect"))
}

macro_rules! define_paths {
    ($($name:ident => $($seg:ident)::+;)*) => {$(
        #[inline(always)]
        pub(crate) fn $name(root: &syn::Path) -> TokenStream {
            quote! { #root::$($seg)::+ }
        }
    )*};
}

define_paths! {
    reflect_ => Reflect;
    typed_ => Typed;
    non_generic_cell_ => NonGenericTypeInfoCell;
    generic_cell_ => GenericTypeInfoCell;
    type_info_ => info::TypeInfo;
    struct_info_ => info::StructInfo;
    opaque_info_ => info::OpaqueInfo;
    named_field_ => info::NamedField;
    zero_check_ => info::zero_check;
    reflect_ref_ => ops::ReflectRef;
    reflect_mut_ => ops::ReflectMut;
    struct_ => ops::Struct;
    from_type_ => traits::FromType;
    serialize_trait_ => traits::TypeTraitSerialize;
    deserialize_trait_ => traits::TypeTraitDeserialize;
}
