//! Parsing of `#[reflect(...)]` and `#[tag(...)]`.

use proc_macro2::Span;
use syn::{Attribute, LitStr, Path, Token};

pub(crate) const REFLECT_ATTRIBUTE_NAME: &str = "reflect";
pub(crate) const TAG_ATTRIBUTE_NAME: &str = "tag";

// -----------------------------------------------------------------------------
// TypeAttributes

/// Type-level options, written as `#[reflect(...)]` on the item.
///
/// - `opaque`: hide the content, only type traits can reach it.
/// - `partial_eq`: the type implements `PartialEq + Default`, enables zero checks.
/// - `serialize` / `deserialize`: attach the `serde` bridges.
/// - `type_trait(A, B)`: attach `A` and `B` through `FromType<Self>`.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    pub opaque: Option<Span>,
    pub partial_eq: Option<Span>,
    pub serialize: Option<Span>,
    pub deserialize: Option<Span>,
    pub type_traits: Vec<Path>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut res = Self::default();

        for attr in attrs {
            if !attr.path().is_ident(REFLECT_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                let span = Some(meta.path.require_ident()?.span());
                if meta.path.is_ident("opaque") {
                    res.opaque = span;
                } else if meta.path.is_ident("partial_eq") {
                    res.partial_eq = span;
                } else if meta.path.is_ident("serialize") {
                    res.serialize = span;
                } else if meta.path.is_ident("deserialize") {
                    res.deserialize = span;
                } else if meta.path.is_ident("type_trait") {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    let paths = content.parse_terminated(Path::parse_mod_style, Token![,])?;
                    res.type_traits.extend(paths);
                } else {
                    return Err(meta.error(
                        "unsupported type attribute, expected one of `opaque`, `partial_eq`, \
                         `serialize`, `deserialize`, `type_trait(..)`",
                    ));
                }
                Ok(())
            })?;
        }

        Ok(res)
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// Field-level options.
///
/// - `#[reflect(skip)]`: the field is invisible to reflection.
/// - `#[reflect(embed)]`: the field's own fields are flattened into the owner.
/// - `#[tag(key = "value", flag)]`: raw annotations, a bare key has an empty value.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub skip: bool,
    pub embed: bool,
    pub tags: Vec<(String, String)>,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut res = Self::default();

        for attr in attrs {
            if attr.path().is_ident(REFLECT_ATTRIBUTE_NAME) {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("skip") {
                        res.skip = true;
                    } else if meta.path.is_ident("embed") {
                        res.embed = true;
                    } else {
                        return Err(meta.error(
                            "unsupported field attribute, expected `skip` or `embed`",
                        ));
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident(TAG_ATTRIBUTE_NAME) {
                attr.parse_nested_meta(|meta| {
                    let key = meta.path.require_ident()?.to_string();
                    let value = if meta.input.peek(Token![=]) {
                        meta.value()?.parse::<LitStr>()?.value()
                    } else {
                        String::new()
                    };
                    if res.tags.iter().any(|(k, _)| *k == key) {
                        return Err(meta.error(format_args!("duplicate tag key `{key}`")));
                    }
                    res.tags.push((key, value));
                    Ok(())
                })?;
            }
        }

        Ok(res)
    }
}
