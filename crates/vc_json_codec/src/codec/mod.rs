//! Codecs: the per-type encode/decode strategies.
//!
//! ## Menu
//!
//! - [`Codec`]: the capability every strategy implements.
//! - primitive: scalars and nullable scalars, with annotation defaults.
//! - structure: structs, embedded flattening, filters, interceptors, presence markers.
//! - slice / map / pointer / interface: composites built from their parts' codecs.
//! - inline: a struct replaced by one of its fields.
//! - custom: user overrides ([`MarshalCustom`], [`UnmarshalCustom`]) and serde bridged
//!   opaque types.
//! - deferred: the placeholder breaking construction cycles.
//!
//! Codecs are built once per (path, type) by the cache and shared between calls,
//! they hold no per-call state.

use std::sync::Arc;

use vc_json_reflect::Reflect;
use vc_json_reflect::info::TypeInfo;

use crate::cache::Cache;
use crate::tag::FieldTag;
use crate::{Decoder, Error, Session, UnmarshalSession};

mod custom;
mod deferred;
mod inline;
mod interface;
mod map;
mod pointer;
mod primitive;
mod slice;
mod structure;

pub use custom::{MarshalCustom, TypeTraitMarshal, TypeTraitUnmarshal, UnmarshalCustom};

pub(crate) use deferred::DeferredCodec;
pub(crate) use primitive::ScalarTag;
pub(crate) use structure::FieldPath;

/// A shared codec.
pub type CodecRef = Arc<dyn Codec>;

/// An encode/decode strategy for values of one type.
pub trait Codec: Send + Sync + 'static {
    /// Appends the JSON form of `value` to the session buffer.
    fn encode(&self, value: &dyn Reflect, session: &mut Session<'_>) -> Result<(), Error>;

    /// Reads one JSON value from `decoder` into `value`.
    fn decode(
        &self,
        value: &mut dyn Reflect,
        decoder: &mut Decoder<'_>,
        session: &mut UnmarshalSession<'_>,
    ) -> Result<(), Error>;
}

/// Builds the codec of `info`, preferring user overrides.
pub(crate) fn build(cache: &Cache, info: &'static TypeInfo, path: &str) -> Result<CodecRef, Error> {
    match custom::build(info, path) {
        Some(codec) => Ok(codec),
        None => build_structural(cache, info, path),
    }
}

/// Builds the codec of `info` from its shape alone.
pub(crate) fn build_structural(
    cache: &Cache,
    info: &'static TypeInfo,
    path: &str,
) -> Result<CodecRef, Error> {
    match info {
        TypeInfo::Scalar(scalar) => primitive::build(scalar, &ScalarTag::from_config(cache.config())),
        TypeInfo::Pointer(pointer) => pointer::build(cache, pointer, path, None),
        TypeInfo::List(list) => slice::build_list(cache, list, path),
        TypeInfo::Array(array) => slice::build_array(cache, array, path),
        TypeInfo::Map(map) => map::build(cache, map, path),
        TypeInfo::Dynamic(_) => Ok(interface::build(path)),
        TypeInfo::Struct(structure) => structure::build(cache, structure, path),
        TypeInfo::Opaque(opaque) => custom::build_opaque(opaque),
    }
}

/// Builds the codec of a struct field.
///
/// Annotations shaping scalar output (`default`, `format`, `nullable`) give the
/// field its own codec, others share the cached codec of the field type.
pub(crate) fn build_field(
    cache: &Cache,
    info: &'static TypeInfo,
    path: &str,
    tag: &FieldTag,
) -> Result<CodecRef, Error> {
    if tag.shapes_value() {
        let scalar_tag = ScalarTag::from_field(tag, cache.config());
        match info {
            TypeInfo::Scalar(scalar) => {
                return primitive::build(scalar, &scalar_tag).map_err(|err| retag(tag, err));
            }
            TypeInfo::Pointer(pointer) if pointer.target_info().as_scalar().is_ok() => {
                return pointer::build(cache, pointer, path, Some(&scalar_tag))
                    .map_err(|err| retag(tag, err));
            }
            _ if tag.default.is_some() => {
                return Err(Error::Tag {
                    field: tag.name.clone(),
                    reason: format!(
                        "a default value needs a scalar field, found `{}`",
                        info.type_path()
                    ),
                });
            }
            _ => {}
        }
    }
    cache.get_or_build(info, path)
}

// Default values failing to parse are annotation errors.
fn retag(tag: &FieldTag, err: Error) -> Error {
    match err {
        Error::Construction { reason, .. } => Error::Tag {
            field: tag.name.clone(),
            reason,
        },
        other => other,
    }
}

// -----------------------------------------------------------------------------
// Test helpers

#[cfg(test)]
pub(crate) mod testing {
    use vc_json_reflect::Reflect;

    use super::Codec;
    use crate::cache::Cache;
    use crate::{Decoder, Error, IOConfig, Options, Session, UnmarshalSession};

    /// Encodes `value` with `codec` into a string.
    pub fn encode(codec: &dyn Codec, value: &dyn Reflect) -> Result<String, Error> {
        let cache = Cache::new(IOConfig::new());
        let options = Options::new();
        let mut buf = Vec::new();
        codec.encode(value, &mut Session::new(&mut buf, &cache, &options))?;
        Ok(String::from_utf8(buf).unwrap())
    }

    /// Decodes `json` into `value` with `codec`, requiring the whole input to be read.
    pub fn decode(codec: &dyn Codec, value: &mut dyn Reflect, json: &str) -> Result<(), Error> {
        let cache = Cache::new(IOConfig::new());
        let options = Options::new();
        let mut decoder = Decoder::new(json.as_bytes());
        codec.decode(value, &mut decoder, &mut UnmarshalSession::new(&cache, &options))?;
        decoder.finish()
    }
}
