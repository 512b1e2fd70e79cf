use std::sync::Arc;

use vc_json_reflect::Reflect;
use vc_json_reflect::ops::{ReflectMut, ReflectRef};

use crate::codec::{Codec, CodecRef};
use crate::{Decoder, Error, Session, UnmarshalSession};

/// The codec of `Box<dyn Reflect>`.
///
/// Encoding looks up the codec of the boxed value's concrete type, decoding
/// always produces a [`serde_json::Value`].
struct InterfaceCodec {
    path: Box<str>,
}

impl Codec for InterfaceCodec {
    fn encode(&self, value: &dyn Reflect, session: &mut Session<'_>) -> Result<(), Error> {
        let ReflectRef::Dynamic(dynamic) = value.reflect_ref() else {
            return Err(Error::mismatch(
                "Box<dyn Reflect>",
                value.reflect_type_info().type_path(),
            ));
        };
        let inner = dynamic.inner();
        let codec = session
            .cache()
            .get_or_build(inner.reflect_type_info(), &self.path)
            .map_err(|err| match err {
                Error::Construction { type_path, reason } => Error::Encode { type_path, reason },
                other => other,
            })?;
        codec.encode(inner, session)
    }

    fn decode(
        &self,
        value: &mut dyn Reflect,
        decoder: &mut Decoder<'_>,
        _: &mut UnmarshalSession<'_>,
    ) -> Result<(), Error> {
        let type_path = value.reflect_type_info().type_path();
        let ReflectMut::Dynamic(dynamic) = value.reflect_mut() else {
            return Err(Error::mismatch("Box<dyn Reflect>", type_path));
        };
        dynamic.replace(Box::new(decoder.read_value()?));
        Ok(())
    }
}

pub(crate) fn build(path: &str) -> CodecRef {
    Arc::new(InterfaceCodec { path: path.into() })
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use vc_json_reflect::Reflect;

    use super::build;
    use crate::Error;
    use crate::codec::testing::{decode, encode};

    #[derive(vc_json_reflect::derive::Reflect, Default)]
    #[reflect(opaque)]
    struct Handle(u8);

    #[test]
    fn concrete_type_per_value() {
        let codec = build("");

        let value: Box<dyn Reflect> = Box::new(vec![1_i32, 2]);
        assert_eq!(encode(&*codec, &value).unwrap(), "[1,2]");

        let value: Box<dyn Reflect> = Box::new(Some("a".to_owned()));
        assert_eq!(encode(&*codec, &value).unwrap(), r#""a""#);

        let value: Box<dyn Reflect> = Box::new(Value::Null);
        assert_eq!(encode(&*codec, &value).unwrap(), "null");
    }

    #[test]
    fn decode_generic() {
        let codec = build("");

        let mut value: Box<dyn Reflect> = Box::new(0_i32);
        decode(&*codec, &mut value, r#"{"a":[1,true]}"#).unwrap();
        let decoded = value.take::<Value>().unwrap();
        assert_eq!(decoded, json!({"a": [1, true]}));
    }

    #[test]
    fn unsupported_concrete_type() {
        let codec = build("");
        let value: Box<dyn Reflect> = Box::new(Handle(3));
        let err = encode(&*codec, &value).unwrap_err();
        assert!(matches!(err, Error::Encode { .. }), "{err}");
    }
}
