use core::any::type_name;
use std::sync::{Arc, OnceLock};

use vc_json_reflect::info::{OpaqueInfo, TypeInfo};
use vc_json_reflect::traits::{FromType, TypeTraitDeserialize, TypeTraitSerialize};
use vc_json_reflect::{Reflect, Typed};

use crate::cache::Cache;
use crate::codec::{self, Codec, CodecRef};
use crate::{Decoder, Error, Session, UnmarshalSession};

// -----------------------------------------------------------------------------
// Capabilities

/// A type writing its own JSON form.
///
/// Attach it with `#[reflect(type_trait(TypeTraitMarshal))]`; the decode
/// direction keeps the structural codec unless [`UnmarshalCustom`] is attached too.
pub trait MarshalCustom {
    /// Appends exactly one JSON value to [`Session::buffer`].
    fn marshal_json(&self, session: &mut Session<'_>) -> Result<(), Error>;
}

/// A type reading its own JSON form.
///
/// # Examples
///
/// ```
/// use vc_json_codec::codec::{TypeTraitUnmarshal, UnmarshalCustom};
/// use vc_json_codec::{Decoder, Error, IOConfig, Marshaller, Options, UnmarshalSession};
/// use vc_json_reflect::derive::Reflect;
///
/// #[derive(Reflect, Default)]
/// #[reflect(type_trait(TypeTraitUnmarshal))]
/// struct Total {
///     sum: i64,
/// }
///
/// impl UnmarshalCustom for Total {
///     fn unmarshal_json(
///         &mut self,
///         decoder: &mut Decoder<'_>,
///         _: &mut UnmarshalSession<'_>,
///     ) -> Result<(), Error> {
///         decoder.begin_array()?;
///         let mut first = true;
///         while decoder.next_item(first)? {
///             first = false;
///             self.sum += decoder.read_i64()?;
///         }
///         Ok(())
///     }
/// }
///
/// let marshaller = Marshaller::new(IOConfig::new());
/// let mut total = Total::default();
/// marshaller.unmarshal(b"[1,2,3]", &mut total, &Options::new()).unwrap();
///
/// assert_eq!(total.sum, 6);
/// // Encoding falls back to the fields.
/// assert_eq!(marshaller.marshal(&total, &Options::new()).unwrap(), br#"{"sum":6}"#);
/// ```
pub trait UnmarshalCustom {
    /// Reads exactly one JSON value from `decoder`.
    fn unmarshal_json(
        &mut self,
        decoder: &mut Decoder<'_>,
        session: &mut UnmarshalSession<'_>,
    ) -> Result<(), Error>;
}

/// The [`MarshalCustom`] implementation of a type, stored in its type traits.
#[derive(Clone)]
pub struct TypeTraitMarshal {
    fun: fn(&dyn Reflect, &mut Session<'_>) -> Result<(), Error>,
}

impl<T: MarshalCustom + Typed> FromType<T> for TypeTraitMarshal {
    fn from_type() -> Self {
        Self {
            fun: |value, session| match value.downcast_ref::<T>() {
                Some(value) => value.marshal_json(session),
                None => Err(Error::mismatch(
                    type_name::<T>(),
                    value.reflect_type_info().type_path(),
                )),
            },
        }
    }
}

impl TypeTraitMarshal {
    /// Calls `T`'s [`MarshalCustom`], failing on type mismatch.
    #[inline]
    pub fn marshal(&self, value: &dyn Reflect, session: &mut Session<'_>) -> Result<(), Error> {
        (self.fun)(value, session)
    }
}

/// The [`UnmarshalCustom`] implementation of a type, stored in its type traits.
#[derive(Clone)]
pub struct TypeTraitUnmarshal {
    fun: fn(&mut dyn Reflect, &mut Decoder<'_>, &mut UnmarshalSession<'_>) -> Result<(), Error>,
}

impl<T: UnmarshalCustom + Typed> FromType<T> for TypeTraitUnmarshal {
    fn from_type() -> Self {
        Self {
            fun: |value, decoder, session| {
                let type_path = value.reflect_type_info().type_path();
                match value.downcast_mut::<T>() {
                    Some(value) => value.unmarshal_json(decoder, session),
                    None => Err(Error::mismatch(type_name::<T>(), type_path)),
                }
            },
        }
    }
}

impl TypeTraitUnmarshal {
    /// Calls `T`'s [`UnmarshalCustom`], failing on type mismatch.
    #[inline]
    pub fn unmarshal(
        &self,
        value: &mut dyn Reflect,
        decoder: &mut Decoder<'_>,
        session: &mut UnmarshalSession<'_>,
    ) -> Result<(), Error> {
        (self.fun)(value, decoder, session)
    }
}

// -----------------------------------------------------------------------------
// CustomCodec

/// Delegates to the user overrides of a type.
///
/// A direction without override uses the structural codec, built on first use.
struct CustomCodec {
    info: &'static TypeInfo,
    path: Box<str>,
    marshal: Option<TypeTraitMarshal>,
    unmarshal: Option<TypeTraitUnmarshal>,
    fallback: OnceLock<CodecRef>,
}

impl CustomCodec {
    fn fallback(&self, cache: &Cache) -> Result<&CodecRef, Error> {
        if let Some(codec) = self.fallback.get() {
            return Ok(codec);
        }
        let codec = codec::build_structural(cache, self.info, &self.path)?;
        Ok(self.fallback.get_or_init(|| codec))
    }
}

impl Codec for CustomCodec {
    fn encode(&self, value: &dyn Reflect, session: &mut Session<'_>) -> Result<(), Error> {
        match &self.marshal {
            Some(marshal) => marshal.marshal(value, session),
            None => self.fallback(session.cache())?.encode(value, session),
        }
    }

    fn decode(
        &self,
        value: &mut dyn Reflect,
        decoder: &mut Decoder<'_>,
        session: &mut UnmarshalSession<'_>,
    ) -> Result<(), Error> {
        match &self.unmarshal {
            Some(unmarshal) => unmarshal.unmarshal(value, decoder, session),
            None => self.fallback(session.cache())?.decode(value, decoder, session),
        }
    }
}

/// Builds a [`CustomCodec`] if the type carries an override.
pub(crate) fn build(info: &'static TypeInfo, path: &str) -> Option<CodecRef> {
    let traits = info.type_traits();
    let marshal = traits.get::<TypeTraitMarshal>().cloned();
    let unmarshal = traits.get::<TypeTraitUnmarshal>().cloned();
    if marshal.is_none() && unmarshal.is_none() {
        return None;
    }
    Some(Arc::new(CustomCodec {
        info,
        path: path.into(),
        marshal,
        unmarshal,
        fallback: OnceLock::new(),
    }))
}

// -----------------------------------------------------------------------------
// OpaqueCodec

/// The codec of an opaque type, bridged through its serde implementation.
struct OpaqueCodec {
    type_path: &'static str,
    serialize: Option<TypeTraitSerialize>,
    deserialize: Option<TypeTraitDeserialize>,
}

impl Codec for OpaqueCodec {
    fn encode(&self, value: &dyn Reflect, session: &mut Session<'_>) -> Result<(), Error> {
        let Some(serialize) = &self.serialize else {
            return Err(Error::encode(self.type_path, "type is not serializable"));
        };
        let mut serializer = serde_json::Serializer::new(session.buffer());
        serialize
            .serialize(value, &mut serializer)
            .map_err(|e| Error::encode(self.type_path, e))
    }

    fn decode(
        &self,
        value: &mut dyn Reflect,
        decoder: &mut Decoder<'_>,
        _: &mut UnmarshalSession<'_>,
    ) -> Result<(), Error> {
        let Some(deserialize) = &self.deserialize else {
            return Err(decoder.error(format_args!("`{}` is not deserializable", self.type_path)));
        };
        let offset = decoder.offset();
        let raw = decoder.skip_value()?;
        let mut deserializer = serde_json::Deserializer::from_slice(raw);
        deserialize
            .deserialize_into(value, &mut deserializer)
            .map_err(|e| Error::Syntax {
                offset,
                message: e.to_string(),
            })
    }
}

/// Builds the codec of an opaque type from its serde traits.
pub(crate) fn build_opaque(opaque: &OpaqueInfo) -> Result<CodecRef, Error> {
    let traits = opaque.type_traits();
    let serialize = traits.get::<TypeTraitSerialize>().cloned();
    let deserialize = traits.get::<TypeTraitDeserialize>().cloned();
    if serialize.is_none() && deserialize.is_none() {
        return Err(Error::construction(
            opaque.ty().path(),
            "opaque type has no JSON form, reflect it with `serialize`/`deserialize` \
             or attach a custom codec",
        ));
    }
    Ok(Arc::new(OpaqueCodec {
        type_path: opaque.ty().path(),
        serialize,
        deserialize,
    }))
}

// -----------------------------------------------------------------------------
// Tests
