use std::sync::Arc;

use vc_json_reflect::Reflect;
use vc_json_reflect::info::{MapInfo, ScalarKind, TypeInfo};
use vc_json_reflect::ops::{ReflectMut, ReflectRef};

use crate::cache::Cache;
use crate::codec::primitive::{ScalarValue, with_scalar_type};
use crate::codec::{Codec, CodecRef};
use crate::{DecodeError, Decoder, Error, Session, UnmarshalSession, writer};

// -----------------------------------------------------------------------------
// Keys

/// Writes a map key as a JSON string.
type WriteKey = fn(&dyn Reflect, &mut Vec<u8>) -> Result<(), Error>;

/// Parses the text of a JSON key into a map key.
type ParseKey = fn(&str) -> Result<Box<dyn Reflect>, String>;

fn write_string_key(key: &dyn Reflect, buf: &mut Vec<u8>) -> Result<(), Error> {
    match key.downcast_ref::<String>() {
        Some(key) => {
            writer::write_str(buf, key);
            Ok(())
        }
        None => Err(Error::mismatch("String", key.reflect_type_info().type_path())),
    }
}

fn write_quoted_key<T: ScalarValue>(key: &dyn Reflect, buf: &mut Vec<u8>) -> Result<(), Error> {
    let Some(key) = key.downcast_ref::<T>() else {
        return Err(Error::mismatch(
            core::any::type_name::<T>(),
            key.reflect_type_info().type_path(),
        ));
    };
    buf.push(b'"');
    key.write(buf, None)?;
    buf.push(b'"');
    Ok(())
}

fn parse_key<T: ScalarValue>(text: &str) -> Result<Box<dyn Reflect>, String> {
    T::parse(text, None).map(|key| Box::new(key) as Box<dyn Reflect>)
}

// -----------------------------------------------------------------------------
// MapCodec

/// The codec of key/value containers, written as a JSON object.
///
/// Keys are strings, integers, booleans or floats; non-string keys are quoted.
/// Decoding merges into the existing entries, `null` clears them.
struct MapCodec {
    type_path: &'static str,
    write_key: WriteKey,
    parse_key: ParseKey,
    value: CodecRef,
}

impl Codec for MapCodec {
    fn encode(&self, value: &dyn Reflect, session: &mut Session<'_>) -> Result<(), Error> {
        let ReflectRef::Map(map) = value.reflect_ref() else {
            return Err(Error::mismatch(self.type_path, value.reflect_type_info().type_path()));
        };
        session.buffer().push(b'{');
        for (index, (key, value)) in map.iter().enumerate() {
            let buf = session.buffer();
            if index > 0 {
                buf.push(b',');
            }
            (self.write_key)(key, buf)?;
            buf.push(b':');
            self.value.encode(value, session)?;
        }
        session.buffer().push(b'}');
        Ok(())
    }

    fn decode(
        &self,
        value: &mut dyn Reflect,
        decoder: &mut Decoder<'_>,
        session: &mut UnmarshalSession<'_>,
    ) -> Result<(), Error> {
        let type_path = value.reflect_type_info().type_path();
        let ReflectMut::Map(map) = value.reflect_mut() else {
            return Err(Error::mismatch(self.type_path, type_path));
        };
        if decoder.try_null()? {
            map.clear();
            return Ok(());
        }
        decoder.begin_object()?;
        let mut first = true;
        while let Some(text) = decoder.next_key(first)? {
            first = false;
            let key = (self.parse_key)(&text).map_err(|e| {
                DecodeError::wrap(&text, decoder.error(format_args!("invalid map key: {e}")))
            })?;
            let slot = map
                .insert_default(key)
                .map_err(|e| DecodeError::wrap(&text, decoder.error(e)))?;
            self.value
                .decode(slot, decoder, session)
                .map_err(|err| DecodeError::wrap(&text, err))?;
        }
        Ok(())
    }
}

/// Builds the codec of a map from the cached codec of its values.
pub(crate) fn build(cache: &Cache, map: &'static MapInfo, path: &str) -> Result<CodecRef, Error> {
    let type_path = map.ty().path();
    let TypeInfo::Scalar(key) = map.key_info() else {
        return Err(Error::construction(
            type_path,
            format_args!("unsupported map key `{}`", map.key_info().type_path()),
        ));
    };
    let (write_key, parse_key): (WriteKey, ParseKey) = match key.kind() {
        ScalarKind::Time => {
            return Err(Error::construction(type_path, "time map keys are not supported"));
        }
        ScalarKind::String => (write_string_key as WriteKey, parse_key::<String> as ParseKey),
        kind => with_scalar_type!(kind, |T| {
            if !key.ty().is::<T>() {
                return Err(Error::construction(
                    type_path,
                    format_args!("map key `{}` is not a `{kind}`", key.ty().path()),
                ));
            }
            (write_quoted_key::<T> as WriteKey, parse_key::<T> as ParseKey)
        }),
    };

    Ok(Arc::new(MapCodec {
        type_path,
        write_key,
        parse_key,
        value: cache.get_or_build(map.value_info(), path)?,
    }))
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use chrono::{DateTime, Utc};
    use vc_json_reflect::Typed;

    use super::build;
    use crate::cache::Cache;
    use crate::codec::testing::{decode, encode};
    use crate::{Error, IOConfig};

    #[test]
    fn integer_keys() {
        let cache = Cache::new(IOConfig::new());
        let info = <BTreeMap<i32, String>>::type_info().as_map().unwrap();
        let codec = build(&cache, info, "").unwrap();

        let value = BTreeMap::from([(1, "x".to_owned()), (2, "y".to_owned())]);
        let json = encode(&*codec, &value).unwrap();
        assert_eq!(json, r#"{"1":"x","2":"y"}"#);
        assert_eq!(encode(&*codec, &BTreeMap::<i32, String>::new()).unwrap(), "{}");

        let mut decoded = BTreeMap::new();
        decode(&*codec, &mut decoded, &json).unwrap();
        assert_eq!(decoded, value);

        let Err(Error::Decode(err)) = decode(&*codec, &mut decoded, r#"{"1":"z","one":"x"}"#)
        else {
            panic!("expected a decode error");
        };
        assert_eq!(err.path(), "one");
        assert!(matches!(err.cause(), Error::Syntax { .. }));
    }

    #[test]
    fn decode_merges() {
        let cache = Cache::new(IOConfig::new());
        let info = <HashMap<String, f64>>::type_info().as_map().unwrap();
        let codec = build(&cache, info, "").unwrap();

        let mut value = HashMap::from([("a".to_owned(), 1.0), ("b".to_owned(), 2.0)]);
        decode(&*codec, &mut value, r#"{"b":3.5,"c":4}"#).unwrap();
        assert_eq!(value.len(), 3);
        assert_eq!(value["a"], 1.0);
        assert_eq!(value["b"], 3.5);
        assert_eq!(value["c"], 4.0);

        let Err(Error::Decode(err)) = decode(&*codec, &mut value, r#"{"d":"x"}"#) else {
            panic!("expected a decode error");
        };
        assert_eq!(err.path(), "d");

        decode(&*codec, &mut value, "null").unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn nested_values() {
        let cache = Cache::new(IOConfig::new());
        let info = <BTreeMap<bool, Vec<u8>>>::type_info().as_map().unwrap();
        let codec = build(&cache, info, "").unwrap();

        let value = BTreeMap::from([(false, vec![]), (true, vec![1_u8])]);
        assert_eq!(encode(&*codec, &value).unwrap(), r#"{"false":[],"true":[1]}"#);
    }

    #[test]
    fn unsupported_keys() {
        let cache = Cache::new(IOConfig::new());
        let info = <BTreeMap<DateTime<Utc>, i32>>::type_info().as_map().unwrap();
        assert!(matches!(build(&cache, info, ""), Err(Error::Construction { .. })));
    }
}
