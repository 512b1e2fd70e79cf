use std::sync::Arc;

use vc_json_reflect::Reflect;
use vc_json_reflect::info::{ArrayInfo, ListInfo};
use vc_json_reflect::ops::{ReflectMut, ReflectRef};

use crate::cache::Cache;
use crate::codec::{Codec, CodecRef};
use crate::{DecodeError, Decoder, Error, Session, UnmarshalSession};

// -----------------------------------------------------------------------------
// List

/// The codec of growable sequences.
///
/// Decoding replaces the content, `null` leaves the list empty.
struct SliceCodec {
    type_path: &'static str,
    item: CodecRef,
}

impl Codec for SliceCodec {
    fn encode(&self, value: &dyn Reflect, session: &mut Session<'_>) -> Result<(), Error> {
        let ReflectRef::List(list) = value.reflect_ref() else {
            return Err(Error::mismatch(self.type_path, value.reflect_type_info().type_path()));
        };
        session.buffer().push(b'[');
        for index in 0..list.len() {
            if index > 0 {
                session.buffer().push(b',');
            }
            if let Some(item) = list.get(index) {
                self.item.encode(item, session)?;
            }
        }
        session.buffer().push(b']');
        Ok(())
    }

    fn decode(
        &self,
        value: &mut dyn Reflect,
        decoder: &mut Decoder<'_>,
        session: &mut UnmarshalSession<'_>,
    ) -> Result<(), Error> {
        let type_path = value.reflect_type_info().type_path();
        let ReflectMut::List(list) = value.reflect_mut() else {
            return Err(Error::mismatch(self.type_path, type_path));
        };
        list.clear();
        if decoder.try_null()? {
            return Ok(());
        }
        decoder.begin_array()?;
        let mut index = 0;
        while decoder.next_item(index == 0)? {
            let item = list.push_default();
            self.item
                .decode(item, decoder, session)
                .map_err(|err| DecodeError::wrap(&format!("[{index}]"), err))?;
            index += 1;
        }
        Ok(())
    }
}

/// Builds the codec of a list from the cached codec of its items.
pub(crate) fn build_list(
    cache: &Cache,
    list: &'static ListInfo,
    path: &str,
) -> Result<CodecRef, Error> {
    Ok(Arc::new(SliceCodec {
        type_path: list.ty().path(),
        item: cache.get_or_build(list.item_info(), path)?,
    }))
}

// -----------------------------------------------------------------------------
// Array

/// The codec of fixed-size sequences.
///
/// Missing items keep their value, extra items are read and dropped.
struct ArrayCodec {
    type_path: &'static str,
    item: CodecRef,
}

impl Codec for ArrayCodec {
    fn encode(&self, value: &dyn Reflect, session: &mut Session<'_>) -> Result<(), Error> {
        let ReflectRef::Array(array) = value.reflect_ref() else {
            return Err(Error::mismatch(self.type_path, value.reflect_type_info().type_path()));
        };
        session.buffer().push(b'[');
        for index in 0..array.len() {
            if index > 0 {
                session.buffer().push(b',');
            }
            if let Some(item) = array.get(index) {
                self.item.encode(item, session)?;
            }
        }
        session.buffer().push(b']');
        Ok(())
    }

    fn decode(
        &self,
        value: &mut dyn Reflect,
        decoder: &mut Decoder<'_>,
        session: &mut UnmarshalSession<'_>,
    ) -> Result<(), Error> {
        let type_path = value.reflect_type_info().type_path();
        let ReflectMut::Array(array) = value.reflect_mut() else {
            return Err(Error::mismatch(self.type_path, type_path));
        };
        if decoder.try_null()? {
            return Ok(());
        }
        decoder.begin_array()?;
        let mut index = 0;
        while decoder.next_item(index == 0)? {
            match array.get_mut(index) {
                Some(item) => self
                    .item
                    .decode(item, decoder, session)
                    .map_err(|err| DecodeError::wrap(&format!("[{index}]"), err))?,
                _ => {
                    decoder.skip_value()?;
                }
            }
            index += 1;
        }
        Ok(())
    }
}

/// Builds the codec of a fixed-size array.
pub(crate) fn build_array(
    cache: &Cache,
    array: &'static ArrayInfo,
    path: &str,
) -> Result<CodecRef, Error> {
    Ok(Arc::new(ArrayCodec {
        type_path: array.ty().path(),
        item: cache.get_or_build(array.item_info(), path)?,
    }))
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use vc_json_reflect::Typed;

    use super::{build_array, build_list};
    use crate::cache::Cache;
    use crate::codec::testing::{decode, encode};
    use crate::{Error, IOConfig};

    #[test]
    fn string_list() {
        let cache = Cache::new(IOConfig::new());
        let codec = build_list(&cache, <Vec<String>>::type_info().as_list().unwrap(), "").unwrap();

        let value = vec!["a".to_owned(), "b".to_owned()];
        let json = encode(&*codec, &value).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
        assert_eq!(encode(&*codec, &Vec::<String>::new()).unwrap(), "[]");

        let mut decoded = vec!["stale".to_owned()];
        decode(&*codec, &mut decoded, &json).unwrap();
        assert_eq!(decoded, value);
        decode(&*codec, &mut decoded, "null").unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn item_errors_carry_index() {
        let cache = Cache::new(IOConfig::new());
        let codec = build_list(&cache, <Vec<Vec<u8>>>::type_info().as_list().unwrap(), "").unwrap();

        let mut value = Vec::<Vec<u8>>::new();
        let Err(Error::Decode(err)) = decode(&*codec, &mut value, "[[1],[2,300]]") else {
            panic!("expected a decode error");
        };
        assert_eq!(err.path(), "[1][1]");
    }

    #[test]
    fn fixed_array() {
        let cache = Cache::new(IOConfig::new());
        let codec = build_array(&cache, <[i32; 3]>::type_info().as_array().unwrap(), "").unwrap();

        assert_eq!(encode(&*codec, &[1, 2, 3]).unwrap(), "[1,2,3]");

        let mut value = [9, 9, 9];
        decode(&*codec, &mut value, "[1,2]").unwrap();
        assert_eq!(value, [1, 2, 9]);
        decode(&*codec, &mut value, "[4,5,6,7,[8]]").unwrap();
        assert_eq!(value, [4, 5, 6]);
    }
}
