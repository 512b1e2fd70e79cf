//! Low level JSON literal writers.

use std::io::Write;

use crate::Error;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Writes `value` as a quoted, escaped JSON string.
///
/// `"` and `\` are backslash-escaped, control characters are written as
/// `\u00XX`, and U+2028/U+2029 as `\u2028`/`\u2029` so the output stays safe
/// inside a script context.
pub fn write_str(buf: &mut Vec<u8>, value: &str) {
    let bytes = value.as_bytes();
    buf.reserve(bytes.len() + 2);
    buf.push(b'"');

    let mut start = 0;
    let mut index = 0;
    while index < bytes.len() {
        let byte = bytes[index];
        let escape: Option<&[u8]> = match byte {
            b'"' => Some(b"\\\""),
            b'\\' => Some(b"\\\\"),
            0x00..=0x1f => None,
            0xe2 if bytes.get(index + 1) == Some(&0x80)
                && matches!(bytes.get(index + 2), Some(0xa8 | 0xa9)) =>
            {
                buf.extend_from_slice(&bytes[start..index]);
                buf.extend_from_slice(if bytes[index + 2] == 0xa8 {
                    b"\\u2028"
                } else {
                    b"\\u2029"
                });
                index += 3;
                start = index;
                continue;
            }
            _ => {
                index += 1;
                continue;
            }
        };

        buf.extend_from_slice(&bytes[start..index]);
        match escape {
            Some(seq) => buf.extend_from_slice(seq),
            None => buf.extend_from_slice(&[
                b'\\',
                b'u',
                b'0',
                b'0',
                HEX[(byte >> 4) as usize],
                HEX[(byte & 0xf) as usize],
            ]),
        }
        index += 1;
        start = index;
    }

    buf.extend_from_slice(&bytes[start..]);
    buf.push(b'"');
}

/// Writes an integer in base 10.
#[inline]
pub fn write_int(buf: &mut Vec<u8>, value: impl int::Integer) {
    value.write_to(buf);
}

/// Writes a `bool` literal.
#[inline]
pub fn write_bool(buf: &mut Vec<u8>, value: bool) {
    buf.extend_from_slice(if value { b"true" } else { b"false" });
}

/// Writes an `f64` in its shortest round-trip form.
///
/// Values outside `[1e-6, 1e21)` use an exponent, e.g. `1e+21` and `1.5e-7`.
/// NaN and infinities have no JSON representation and are rejected.
pub fn write_f64(buf: &mut Vec<u8>, value: f64) -> Result<(), Error> {
    if !value.is_finite() {
        return Err(Error::encode("f64", format_args!("unsupported value `{value}`")));
    }
    let abs = value.abs();
    if abs != 0.0 && !(1e-6..1e21).contains(&abs) {
        write_exponent(buf, format_args!("{value:e}"));
    } else {
        // Writing into a `Vec` cannot fail.
        let _ = write!(buf, "{value}");
    }
    Ok(())
}

/// Writes an `f32` in its shortest round-trip form, see [`write_f64`].
pub fn write_f32(buf: &mut Vec<u8>, value: f32) -> Result<(), Error> {
    if !value.is_finite() {
        return Err(Error::encode("f32", format_args!("unsupported value `{value}`")));
    }
    let abs = value.abs();
    if abs != 0.0 && !(1e-6..1e21).contains(&abs) {
        write_exponent(buf, format_args!("{value:e}"));
    } else {
        let _ = write!(buf, "{value}");
    }
    Ok(())
}

// `1e21` -> `1e+21`, negative exponents are kept as is.
fn write_exponent(buf: &mut Vec<u8>, formatted: core::fmt::Arguments<'_>) {
    let start = buf.len();
    let _ = buf.write_fmt(formatted);
    if let Some(pos) = buf[start..].iter().position(|b| *b == b'e')
        && buf.get(start + pos + 1) != Some(&b'-')
    {
        buf.insert(start + pos + 1, b'+');
    }
}

mod int {
    /// Integers written without going through `core::fmt`.
    pub trait Integer: Copy {
        fn write_to(self, buf: &mut Vec<u8>);
    }

    macro_rules! impl_integer {
        (unsigned: $($ty:ty),*) => {$(
            impl Integer for $ty {
                #[inline]
                fn write_to(self, buf: &mut Vec<u8>) {
                    write_u64(buf, self as u64);
                }
            }
        )*};
        (signed: $($ty:ty),*) => {$(
            impl Integer for $ty {
                #[inline]
                fn write_to(self, buf: &mut Vec<u8>) {
                    if self < 0 {
                        buf.push(b'-');
                    }
                    write_u64(buf, (self as i64).unsigned_abs());
                }
            }
        )*};
    }

    impl_integer!(unsigned: u8, u16, u32, u64, usize);
    impl_integer!(signed: i8, i16, i32, i64, isize);

    fn write_u64(buf: &mut Vec<u8>, mut value: u64) {
        let mut digits = [0_u8; 20];
        let mut pos = digits.len();
        loop {
            pos -= 1;
            digits[pos] = b'0' + (value % 10) as u8;
            value /= 10;
            if value == 0 {
                break;
            }
        }
        buf.extend_from_slice(&digits[pos..]);
    }
}

pub use int::Integer;

// -----------------------------------------------------------------------------
// Tests
