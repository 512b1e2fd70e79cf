use std::sync::Arc;

use vc_json_reflect::Reflect;
use vc_json_reflect::info::{PointerInfo, TypeInfo};
use vc_json_reflect::ops::{ReflectMut, ReflectRef};

use crate::cache::Cache;
use crate::codec::{Codec, CodecRef, ScalarTag, primitive};
use crate::{Decoder, Error, Session, UnmarshalSession};

/// The codec of `Option<T>` and `Box<T>`: an absent target is `null`.
struct PointerCodec {
    type_path: &'static str,
    target: CodecRef,
}

impl Codec for PointerCodec {
    fn encode(&self, value: &dyn Reflect, session: &mut Session<'_>) -> Result<(), Error> {
        let ReflectRef::Pointer(pointer) = value.reflect_ref() else {
            return Err(Error::mismatch(self.type_path, value.reflect_type_info().type_path()));
        };
        match pointer.target() {
            Some(target) => self.target.encode(target, session),
            None => {
                session.buffer().extend_from_slice(b"null");
                Ok(())
            }
        }
    }

    fn decode(
        &self,
        value: &mut dyn Reflect,
        decoder: &mut Decoder<'_>,
        session: &mut UnmarshalSession<'_>,
    ) -> Result<(), Error> {
        let type_path = value.reflect_type_info().type_path();
        let ReflectMut::Pointer(pointer) = value.reflect_mut() else {
            return Err(Error::mismatch(self.type_path, type_path));
        };
        if decoder.try_null()? {
            pointer.set_null();
            return Ok(());
        }
        self.target.decode(pointer.target_or_default(), decoder, session)
    }
}

/// Builds the codec of a pointer.
///
/// Scalar targets are built in place with `tag` so field annotations reach them,
/// `Option` of a scalar gets a dedicated codec.
pub(crate) fn build(
    cache: &Cache,
    pointer: &'static PointerInfo,
    path: &str,
    tag: Option<&ScalarTag>,
) -> Result<CodecRef, Error> {
    let target = match pointer.target_info() {
        TypeInfo::Scalar(scalar) => {
            let config_tag;
            let tag = match tag {
                Some(tag) => tag,
                None => {
                    config_tag = ScalarTag::from_config(cache.config());
                    &config_tag
                }
            };
            if let Some(codec) = primitive::build_nullable(pointer, scalar, tag)? {
                return Ok(codec);
            }
            primitive::build(scalar, tag)?
        }
        info => cache.get_or_build(info, path)?,
    };
    Ok(Arc::new(PointerCodec {
        type_path: pointer.ty().path(),
        target,
    }))
}

// -----------------------------------------------------------------------------
// Tests
