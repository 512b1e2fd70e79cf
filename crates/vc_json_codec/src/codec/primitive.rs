use core::any::type_name;
use core::fmt::Write;
use core::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use vc_json_reflect::Reflect;
use vc_json_reflect::info::{PointerInfo, ScalarInfo};

use crate::codec::{Codec, CodecRef};
use crate::tag::{FieldFlags, FieldTag};
use crate::{Decoder, Error, IOConfig, Session, UnmarshalSession, writer};

// -----------------------------------------------------------------------------
// ScalarTag

/// The parts of a field annotation that shape a scalar codec.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ScalarTag<'a> {
    /// Literal written in place of the zero value.
    pub default: Option<&'a str>,
    /// Time layout, RFC 3339 if absent.
    pub layout: Option<&'a str>,
    /// Write the zero value as `null`.
    pub nullable: bool,
}

impl<'a> ScalarTag<'a> {
    pub fn from_config(config: &'a IOConfig) -> Self {
        Self {
            default: None,
            layout: config.time_layout(),
            nullable: false,
        }
    }

    pub fn from_field(tag: &'a FieldTag, config: &'a IOConfig) -> Self {
        Self {
            default: tag.default.as_deref(),
            layout: tag.format.as_deref().or(config.time_layout()),
            nullable: tag.has(FieldFlags::NULLABLE),
        }
    }
}

// -----------------------------------------------------------------------------
// ScalarValue

/// A scalar type with a fixed JSON form.
pub(crate) trait ScalarValue: Reflect + Default + PartialEq + Sized {
    fn write(&self, buf: &mut Vec<u8>, layout: Option<&str>) -> Result<(), Error>;

    fn read(decoder: &mut Decoder<'_>, layout: Option<&str>) -> Result<Self, Error>;

    /// Parses an annotation value.
    fn parse(text: &str, layout: Option<&str>) -> Result<Self, String>;
}

fn out_of_range(offset: usize, value: impl core::fmt::Display, ty: &str) -> Error {
    Error::Syntax {
        offset,
        message: format!("integer `{value}` out of range for {ty}"),
    }
}

macro_rules! impl_integer {
    ($read:ident: $($ty:ty),*) => {$(
        impl ScalarValue for $ty {
            #[inline]
            fn write(&self, buf: &mut Vec<u8>, _: Option<&str>) -> Result<(), Error> {
                writer::write_int(buf, *self);
                Ok(())
            }

            fn read(decoder: &mut Decoder<'_>, _: Option<&str>) -> Result<Self, Error> {
                let start = decoder.offset();
                let value = decoder.$read()?;
                <$ty>::try_from(value).map_err(|_| out_of_range(start, value, stringify!($ty)))
            }

            fn parse(text: &str, _: Option<&str>) -> Result<Self, String> {
                text.parse().map_err(|e| format!("{e}"))
            }
        }
    )*};
}

impl_integer!(read_i64: i8, i16, i32, i64, isize);
impl_integer!(read_u64: u8, u16, u32, u64, usize);

impl ScalarValue for f32 {
    #[inline]
    fn write(&self, buf: &mut Vec<u8>, _: Option<&str>) -> Result<(), Error> {
        writer::write_f32(buf, *self)
    }

    fn read(decoder: &mut Decoder<'_>, _: Option<&str>) -> Result<Self, Error> {
        let start = decoder.offset();
        let value = decoder.read_f64()?;
        let narrowed = value as f32;
        if narrowed.is_finite() {
            Ok(narrowed)
        } else {
            Err(Error::Syntax {
                offset: start,
                message: format!("number `{value}` out of range for f32"),
            })
        }
    }

    fn parse(text: &str, _: Option<&str>) -> Result<Self, String> {
        text.parse().map_err(|e| format!("{e}"))
    }
}

impl ScalarValue for f64 {
    #[inline]
    fn write(&self, buf: &mut Vec<u8>, _: Option<&str>) -> Result<(), Error> {
        writer::write_f64(buf, *self)
    }

    #[inline]
    fn read(decoder: &mut Decoder<'_>, _: Option<&str>) -> Result<Self, Error> {
        decoder.read_f64()
    }

    fn parse(text: &str, _: Option<&str>) -> Result<Self, String> {
        text.parse().map_err(|e| format!("{e}"))
    }
}

impl ScalarValue for bool {
    #[inline]
    fn write(&self, buf: &mut Vec<u8>, _: Option<&str>) -> Result<(), Error> {
        writer::write_bool(buf, *self);
        Ok(())
    }

    #[inline]
    fn read(decoder: &mut Decoder<'_>, _: Option<&str>) -> Result<Self, Error> {
        decoder.read_bool()
    }

    fn parse(text: &str, _: Option<&str>) -> Result<Self, String> {
        text.parse().map_err(|e| format!("{e}"))
    }
}

impl ScalarValue for String {
    #[inline]
    fn write(&self, buf: &mut Vec<u8>, _: Option<&str>) -> Result<(), Error> {
        writer::write_str(buf, self);
        Ok(())
    }

    #[inline]
    fn read(decoder: &mut Decoder<'_>, _: Option<&str>) -> Result<Self, Error> {
        decoder.read_string().map(|s| s.into_owned())
    }

    fn parse(text: &str, _: Option<&str>) -> Result<Self, String> {
        Ok(text.to_owned())
    }
}

impl ScalarValue for DateTime<Utc> {
    fn write(&self, buf: &mut Vec<u8>, layout: Option<&str>) -> Result<(), Error> {
        let text = match layout {
            None => self.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Some(layout) => {
                let mut text = String::new();
                write!(text, "{}", self.format(layout)).map_err(|_| {
                    Error::encode(type_name::<Self>(), format_args!("invalid time layout `{layout}`"))
                })?;
                text
            }
        };
        writer::write_str(buf, &text);
        Ok(())
    }

    fn read(decoder: &mut Decoder<'_>, layout: Option<&str>) -> Result<Self, Error> {
        let start = decoder.offset();
        let text = decoder.read_string()?;
        parse_time(&text, layout).map_err(|e| Error::Syntax {
            offset: start,
            message: format!("invalid time `{text}`: {e}"),
        })
    }

    fn parse(text: &str, layout: Option<&str>) -> Result<Self, String> {
        parse_time(text, layout)
    }
}

/// Parses a time in `layout`, or RFC 3339 if absent.
///
/// Layouts without an offset are read as UTC, layouts without a time as midnight.
fn parse_time(text: &str, layout: Option<&str>) -> Result<DateTime<Utc>, String> {
    let parsed = match layout {
        None => DateTime::parse_from_rfc3339(text).map(|t| t.with_timezone(&Utc)),
        Some(layout) => DateTime::parse_from_str(text, layout)
            .map(|t| t.with_timezone(&Utc))
            .or_else(|_| NaiveDateTime::parse_from_str(text, layout).map(|t| t.and_utc()))
            .or_else(|_| {
                NaiveDate::parse_from_str(text, layout).map(|d| d.and_time(NaiveTime::MIN).and_utc())
            }),
    };
    parsed.map_err(|e| e.to_string())
}

// -----------------------------------------------------------------------------
// Codecs

/// The codec of a scalar value.
///
/// The zero value is written from a pre-formatted literal: the annotated default,
/// `null` for nullable fields, or the natural zero.
struct ScalarCodec<T> {
    zero: Box<[u8]>,
    layout: Option<Box<str>>,
    marker: PhantomData<fn() -> T>,
}

impl<T: ScalarValue> ScalarCodec<T> {
    fn new(tag: &ScalarTag) -> Result<Self, Error> {
        let mut zero = Vec::new();
        let written = match tag.default {
            Some(text) => T::parse(text, tag.layout)
                .map_err(|e| {
                    Error::construction(
                        type_name::<T>(),
                        format_args!("invalid default value `{text}`: {e}"),
                    )
                })?
                .write(&mut zero, tag.layout),
            None if tag.nullable => {
                zero.extend_from_slice(b"null");
                Ok(())
            }
            None => T::default().write(&mut zero, tag.layout),
        };
        written.map_err(|e| Error::construction(type_name::<T>(), e))?;

        Ok(Self {
            zero: zero.into_boxed_slice(),
            layout: tag.layout.map(Box::from),
            marker: PhantomData,
        })
    }

    #[inline]
    fn write(&self, value: &T, buf: &mut Vec<u8>) -> Result<(), Error> {
        if *value == T::default() {
            buf.extend_from_slice(&self.zero);
            Ok(())
        } else {
            value.write(buf, self.layout.as_deref())
        }
    }

    #[inline]
    fn read(&self, decoder: &mut Decoder<'_>) -> Result<T, Error> {
        T::read(decoder, self.layout.as_deref())
    }
}

impl<T: ScalarValue> Codec for ScalarCodec<T> {
    fn encode(&self, value: &dyn Reflect, session: &mut Session<'_>) -> Result<(), Error> {
        match value.downcast_ref::<T>() {
            Some(value) => self.write(value, session.buffer()),
            None => Err(Error::mismatch(type_name::<T>(), value.reflect_type_info().type_path())),
        }
    }

    fn decode(
        &self,
        value: &mut dyn Reflect,
        decoder: &mut Decoder<'_>,
        _: &mut UnmarshalSession<'_>,
    ) -> Result<(), Error> {
        if decoder.try_null()? {
            return Ok(());
        }
        let type_path = value.reflect_type_info().type_path();
        let Some(slot) = value.downcast_mut::<T>() else {
            return Err(Error::mismatch(type_name::<T>(), type_path));
        };
        *slot = self.read(decoder)?;
        Ok(())
    }
}

/// The codec of `Option<T>` for a scalar `T`.
///
/// `None` is written as the annotated default if any, `null` otherwise.
struct NullableScalarCodec<T> {
    absent: Box<[u8]>,
    inner: ScalarCodec<T>,
}

impl<T: ScalarValue> NullableScalarCodec<T> {
    fn new(tag: &ScalarTag) -> Result<Self, Error> {
        let absent = match tag.default {
            Some(_) => ScalarCodec::<T>::new(tag)?.zero,
            None => Box::from(b"null".as_slice()),
        };
        let inner = ScalarCodec::new(&ScalarTag {
            default: None,
            nullable: false,
            layout: tag.layout,
        })?;
        Ok(Self { absent, inner })
    }
}

impl<T: ScalarValue> Codec for NullableScalarCodec<T> {
    fn encode(&self, value: &dyn Reflect, session: &mut Session<'_>) -> Result<(), Error> {
        match value.downcast_ref::<Option<T>>() {
            Some(Some(value)) => self.inner.write(value, session.buffer()),
            Some(None) => {
                session.buffer().extend_from_slice(&self.absent);
                Ok(())
            }
            None => Err(Error::mismatch(
                type_name::<Option<T>>(),
                value.reflect_type_info().type_path(),
            )),
        }
    }

    fn decode(
        &self,
        value: &mut dyn Reflect,
        decoder: &mut Decoder<'_>,
        _: &mut UnmarshalSession<'_>,
    ) -> Result<(), Error> {
        let type_path = value.reflect_type_info().type_path();
        let Some(slot) = value.downcast_mut::<Option<T>>() else {
            return Err(Error::mismatch(type_name::<Option<T>>(), type_path));
        };
        *slot = if decoder.try_null()? {
            None
        } else {
            Some(self.inner.read(decoder)?)
        };
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Builders

// Runs `$body` with `$ty` aliased to the Rust type of a scalar kind.
macro_rules! with_scalar_type {
    ($kind:expr, |$ty:ident| $body:expr) => {
        match $kind {
            ::vc_json_reflect::info::ScalarKind::Bool => { type $ty = bool; $body }
            ::vc_json_reflect::info::ScalarKind::I8 => { type $ty = i8; $body }
            ::vc_json_reflect::info::ScalarKind::I16 => { type $ty = i16; $body }
            ::vc_json_reflect::info::ScalarKind::I32 => { type $ty = i32; $body }
            ::vc_json_reflect::info::ScalarKind::I64 => { type $ty = i64; $body }
            ::vc_json_reflect::info::ScalarKind::Isize => { type $ty = isize; $body }
            ::vc_json_reflect::info::ScalarKind::U8 => { type $ty = u8; $body }
            ::vc_json_reflect::info::ScalarKind::U16 => { type $ty = u16; $body }
            ::vc_json_reflect::info::ScalarKind::U32 => { type $ty = u32; $body }
            ::vc_json_reflect::info::ScalarKind::U64 => { type $ty = u64; $body }
            ::vc_json_reflect::info::ScalarKind::Usize => { type $ty = usize; $body }
            ::vc_json_reflect::info::ScalarKind::F32 => { type $ty = f32; $body }
            ::vc_json_reflect::info::ScalarKind::F64 => { type $ty = f64; $body }
            ::vc_json_reflect::info::ScalarKind::String => { type $ty = String; $body }
            ::vc_json_reflect::info::ScalarKind::Time => { type $ty = ::chrono::DateTime<::chrono::Utc>; $body }
        }
    };
}

pub(crate) use with_scalar_type;

/// Builds the codec of a scalar type.
pub(crate) fn build(scalar: &ScalarInfo, tag: &ScalarTag) -> Result<CodecRef, Error> {
    with_scalar_type!(scalar.kind(), |T| {
        if !scalar.ty().is::<T>() {
            return Err(kind_mismatch(scalar));
        }
        Ok(Arc::new(ScalarCodec::<T>::new(tag)?))
    })
}

/// Builds the codec of `Option<T>` for a scalar `T`.
///
/// Returns `None` for other pointers to a scalar.
pub(crate) fn build_nullable(
    pointer: &PointerInfo,
    scalar: &ScalarInfo,
    tag: &ScalarTag,
) -> Result<Option<CodecRef>, Error> {
    with_scalar_type!(scalar.kind(), |T| {
        if !scalar.ty().is::<T>() {
            return Err(kind_mismatch(scalar));
        }
        if !pointer.ty().is::<Option<T>>() {
            return Ok(None);
        }
        Ok(Some(Arc::new(NullableScalarCodec::<T>::new(tag)?)))
    })
}

fn kind_mismatch(scalar: &ScalarInfo) -> Error {
    Error::construction(
        scalar.ty().path(),
        format_args!("type is declared as a `{}` scalar but is not one", scalar.kind()),
    )
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use vc_json_reflect::Typed;

    use super::{ScalarTag, build, build_nullable};
    use crate::Error;
    use crate::codec::CodecRef;
    use crate::codec::testing::{decode, encode};

    fn scalar<T: Typed>(tag: ScalarTag) -> CodecRef {
        build(T::type_info().as_scalar().unwrap(), &tag).unwrap()
    }

    fn nullable<T: Typed + Default>(tag: ScalarTag) -> CodecRef {
        let info = <Option<T>>::type_info().as_pointer().unwrap();
        let target = info.target_info().as_scalar().unwrap();
        build_nullable(info, target, &tag).unwrap().unwrap()
    }

    #[test]
    fn numbers_and_zero() {
        let codec = scalar::<i32>(ScalarTag::default());
        assert_eq!(encode(&*codec, &0_i32).unwrap(), "0");
        assert_eq!(encode(&*codec, &-42_i32).unwrap(), "-42");

        let mut value = 0_i32;
        decode(&*codec, &mut value, " 17 ").unwrap();
        assert_eq!(value, 17);
        decode(&*codec, &mut value, "null").unwrap();
        assert_eq!(value, 17);

        let codec = scalar::<u8>(ScalarTag::default());
        let mut value = 0_u8;
        let err = decode(&*codec, &mut value, "300").unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));

        let codec = scalar::<f64>(ScalarTag::default());
        assert_eq!(encode(&*codec, &2.5_f64).unwrap(), "2.5");
    }

    #[test]
    fn default_value_replaces_zero() {
        let tag = ScalarTag {
            default: Some("7"),
            ..ScalarTag::default()
        };
        let codec = scalar::<i64>(tag);
        assert_eq!(encode(&*codec, &0_i64).unwrap(), "7");
        assert_eq!(encode(&*codec, &3_i64).unwrap(), "3");

        let tag = ScalarTag {
            default: Some("seven"),
            ..ScalarTag::default()
        };
        let err = build(i64::type_info().as_scalar().unwrap(), &tag);
        assert!(matches!(err, Err(Error::Construction { .. })));
    }

    #[test]
    fn nullable_zero() {
        let tag = ScalarTag {
            nullable: true,
            ..ScalarTag::default()
        };
        let codec = scalar::<String>(tag);
        assert_eq!(encode(&*codec, &String::new()).unwrap(), "null");
        assert_eq!(encode(&*codec, &"a\"b".to_owned()).unwrap(), r#""a\"b""#);
    }

    #[test]
    fn nullable_pointer() {
        let codec = nullable::<i32>(ScalarTag::default());
        assert_eq!(encode(&*codec, &None::<i32>).unwrap(), "null");
        assert_eq!(encode(&*codec, &Some(0_i32)).unwrap(), "0");
        assert_eq!(encode(&*codec, &Some(12_i32)).unwrap(), "12");

        let mut value = Some(3_i32);
        decode(&*codec, &mut value, "null").unwrap();
        assert_eq!(value, None);
        decode(&*codec, &mut value, "5").unwrap();
        assert_eq!(value, Some(5));

        let tag = ScalarTag {
            default: Some("7"),
            ..ScalarTag::default()
        };
        let codec = nullable::<i32>(tag);
        assert_eq!(encode(&*codec, &None::<i32>).unwrap(), "7");

        let info = <Box<i32>>::type_info().as_pointer().unwrap();
        let target = info.target_info().as_scalar().unwrap();
        assert!(build_nullable(info, target, &ScalarTag::default()).unwrap().is_none());
    }

    #[test]
    fn time_layouts() {
        let time = Utc.with_ymd_and_hms(2024, 3, 9, 10, 30, 0).unwrap();

        let codec = scalar::<DateTime<Utc>>(ScalarTag::default());
        assert_eq!(encode(&*codec, &time).unwrap(), r#""2024-03-09T10:30:00Z""#);
        let mut value = DateTime::<Utc>::default();
        decode(&*codec, &mut value, r#""2024-03-09T11:30:00+01:00""#).unwrap();
        assert_eq!(value, time);

        let tag = ScalarTag {
            layout: Some("%Y-%m-%d"),
            ..ScalarTag::default()
        };
        let codec = scalar::<DateTime<Utc>>(tag);
        assert_eq!(encode(&*codec, &time).unwrap(), r#""2024-03-09""#);
        decode(&*codec, &mut value, r#""2024-03-10""#).unwrap();
        assert_eq!(value, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());

        let err = decode(&*codec, &mut value, r#""10/03/2024""#).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn mismatched_value() {
        let codec = scalar::<i32>(ScalarTag::default());
        assert!(matches!(encode(&*codec, &1_i64), Err(Error::Encode { .. })));
    }
}
