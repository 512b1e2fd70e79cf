//! A pull-style JSON token reader over a byte slice.

use std::borrow::Cow;

use crate::Error;

/// Nesting limit of objects and arrays, the same as `serde_json`'s.
const MAX_DEPTH: usize = 128;

/// A pull-style JSON token reader.
///
/// Codecs drive the decoder with the shape they expect. Strings without escapes
/// are borrowed from the input. Opening more than 128 nested objects and arrays
/// is a syntax error.
///
/// ```
/// use vc_json_codec::Decoder;
///
/// let mut decoder = Decoder::new(br#" {"a": [1, 2.5], "b": null} "#);
///
/// decoder.begin_object().unwrap();
/// assert_eq!(decoder.next_key(true).unwrap().as_deref(), Some("a"));
/// decoder.begin_array().unwrap();
/// assert!(decoder.next_item(true).unwrap());
/// assert_eq!(decoder.read_i64().unwrap(), 1);
/// assert!(decoder.next_item(false).unwrap());
/// assert_eq!(decoder.read_f64().unwrap(), 2.5);
/// assert!(!decoder.next_item(false).unwrap());
///
/// assert_eq!(decoder.next_key(false).unwrap().as_deref(), Some("b"));
/// assert!(decoder.try_null().unwrap());
/// assert_eq!(decoder.next_key(false).unwrap(), None);
/// decoder.finish().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder reading `data` from the start.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            depth: 0,
        }
    }

    /// Returns the current byte offset.
    #[inline]
    pub const fn offset(&self) -> usize {
        self.pos
    }

    /// Returns the next significant byte without consuming it.
    #[inline]
    pub fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.data.get(self.pos).copied()
    }

    /// Consumes a `null` literal if it is the next token.
    pub fn try_null(&mut self) -> Result<bool, Error> {
        if self.peek() == Some(b'n') {
            self.expect_literal(b"null")?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Reads a `true` or `false` literal.
    pub fn read_bool(&mut self) -> Result<bool, Error> {
        match self.peek() {
            Some(b't') => self.expect_literal(b"true").map(|_| true),
            Some(b'f') => self.expect_literal(b"false").map(|_| false),
            _ => Err(self.unexpected("boolean")),
        }
    }

    /// Reads an integer that fits an `i64`.
    pub fn read_i64(&mut self) -> Result<i64, Error> {
        let start = self.pos;
        let (text, integral) = self.read_number()?;
        if !integral {
            return Err(self.error_at(start, format_args!("expected integer, found `{text}`")));
        }
        text.parse()
            .map_err(|_| self.error_at(start, format_args!("integer `{text}` out of range")))
    }

    /// Reads a non-negative integer that fits an `u64`.
    pub fn read_u64(&mut self) -> Result<u64, Error> {
        let start = self.pos;
        let (text, integral) = self.read_number()?;
        if !integral {
            return Err(self.error_at(start, format_args!("expected integer, found `{text}`")));
        }
        text.parse()
            .map_err(|_| self.error_at(start, format_args!("integer `{text}` out of range")))
    }

    /// Reads any number as an `f64`.
    pub fn read_f64(&mut self) -> Result<f64, Error> {
        let start = self.pos;
        let (text, _) = self.read_number()?;
        text.parse()
            .map_err(|_| self.error_at(start, format_args!("invalid number `{text}`")))
    }

    /// Reads a string, unescaping it if needed.
    pub fn read_string(&mut self) -> Result<Cow<'a, str>, Error> {
        if self.peek() != Some(b'"') {
            return Err(self.unexpected("string"));
        }
        self.pos += 1;
        let start = self.pos;

        loop {
            match self.data.get(self.pos) {
                None => return Err(self.error_at(self.pos, "unterminated string")),
                Some(b'"') => {
                    let text = core::str::from_utf8(&self.data[start..self.pos])
                        .map_err(|_| self.error_at(start, "invalid UTF-8 in string"))?;
                    self.pos += 1;
                    return Ok(Cow::Borrowed(text));
                }
                Some(b'\\') => break,
                Some(0x00..=0x1f) => {
                    return Err(self.error_at(self.pos, "control character in string"));
                }
                Some(_) => self.pos += 1,
            }
        }

        let mut out = self.data[start..self.pos].to_vec();
        loop {
            match self.data.get(self.pos) {
                None => return Err(self.error_at(self.pos, "unterminated string")),
                Some(b'"') => {
                    self.pos += 1;
                    return String::from_utf8(out)
                        .map(Cow::Owned)
                        .map_err(|_| self.error_at(start, "invalid UTF-8 in string"));
                }
                Some(b'\\') => {
                    self.pos += 1;
                    self.read_escape(&mut out)?;
                }
                Some(0x00..=0x1f) => {
                    return Err(self.error_at(self.pos, "control character in string"));
                }
                Some(byte) => {
                    out.push(*byte);
                    self.pos += 1;
                }
            }
        }
    }

    /// Consumes the `{` opening an object.
    pub fn begin_object(&mut self) -> Result<(), Error> {
        self.expect_byte(b'{', "object")?;
        self.descend()
    }

    /// Reads the next key of an object, or consumes its closing `}`.
    ///
    /// `first` must be `true` for the first call after [`begin_object`](Self::begin_object).
    pub fn next_key(&mut self, first: bool) -> Result<Option<Cow<'a, str>>, Error> {
        match self.peek() {
            Some(b'}') => {
                self.pos += 1;
                self.depth = self.depth.saturating_sub(1);
                return Ok(None);
            }
            Some(b',') if !first => self.pos += 1,
            _ if first => {}
            _ => return Err(self.unexpected("`,` or `}`")),
        }
        let key = self.read_string()?;
        self.expect_byte(b':', "`:`")?;
        Ok(Some(key))
    }

    /// Consumes the `[` opening an array.
    pub fn begin_array(&mut self) -> Result<(), Error> {
        self.expect_byte(b'[', "array")?;
        self.descend()
    }

    /// Returns `true` if another item follows, or consumes the closing `]`.
    ///
    /// `first` must be `true` for the first call after [`begin_array`](Self::begin_array).
    pub fn next_item(&mut self, first: bool) -> Result<bool, Error> {
        match self.peek() {
            Some(b']') => {
                self.pos += 1;
                self.depth = self.depth.saturating_sub(1);
                Ok(false)
            }
            Some(b',') if !first => {
                self.pos += 1;
                Ok(true)
            }
            Some(_) if first => Ok(true),
            _ => Err(self.unexpected("`,` or `]`")),
        }
    }

    /// Skips one complete value and returns its raw bytes.
    pub fn skip_value(&mut self) -> Result<&'a [u8], Error> {
        self.skip_whitespace();
        let start = self.pos;
        self.skip_nested()?;
        Ok(&self.data[start..self.pos])
    }

    /// Reads one complete value into a generic [`serde_json::Value`].
    pub fn read_value(&mut self) -> Result<serde_json::Value, Error> {
        self.skip_whitespace();
        let start = self.pos;
        let raw = self.skip_value()?;
        serde_json::from_slice(raw).map_err(|e| self.error_at(start, e))
    }

    /// Checks that only whitespace remains.
    pub fn finish(&mut self) -> Result<(), Error> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.error_at(self.pos, "trailing characters")),
        }
    }

    /// Builds a syntax error at the current offset.
    pub fn error(&self, message: impl core::fmt::Display) -> Error {
        self.error_at(self.pos, message)
    }

    // -------------------------------------------------------------------------
    // Internal

    fn descend(&mut self) -> Result<(), Error> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\n' | b'\r' | b'\t') = self.data.get(self.pos) {
            self.pos += 1;
        }
    }

    fn error_at(&self, offset: usize, message: impl core::fmt::Display) -> Error {
        Error::Syntax {
            offset,
            message: message.to_string(),
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        match self.data.get(self.pos) {
            Some(byte) => self.error_at(
                self.pos,
                format_args!("expected {expected}, found `{}`", byte.escape_ascii()),
            ),
            None => self.error_at(self.pos, format_args!("expected {expected}, found end of input")),
        }
    }

    fn expect_byte(&mut self, byte: u8, expected: &str) -> Result<(), Error> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_literal(&mut self, literal: &[u8]) -> Result<(), Error> {
        if self.data[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(self.error_at(self.pos, "invalid literal"))
        }
    }

    fn read_number(&mut self) -> Result<(&'a str, bool), Error> {
        self.skip_whitespace();
        let start = self.pos;
        let mut integral = true;

        if self.data.get(self.pos) == Some(&b'-') {
            self.pos += 1;
        }
        match self.data.get(self.pos) {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(self.unexpected("number")),
        }
        if self.data.get(self.pos) == Some(&b'.') {
            integral = false;
            self.pos += 1;
            if !self.data.get(self.pos).is_some_and(u8::is_ascii_digit) {
                return Err(self.unexpected("digit"));
            }
            self.skip_digits();
        }
        if let Some(b'e' | b'E') = self.data.get(self.pos) {
            integral = false;
            self.pos += 1;
            if let Some(b'+' | b'-') = self.data.get(self.pos) {
                self.pos += 1;
            }
            if !self.data.get(self.pos).is_some_and(u8::is_ascii_digit) {
                return Err(self.unexpected("digit"));
            }
            self.skip_digits();
        }

        // The span only holds ASCII digits and signs.
        let text = core::str::from_utf8(&self.data[start..self.pos])
            .map_err(|_| self.error_at(start, "invalid number"))?;
        Ok((text, integral))
    }

    fn skip_digits(&mut self) {
        while self.data.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
    }

    fn read_escape(&mut self, out: &mut Vec<u8>) -> Result<(), Error> {
        let Some(&byte) = self.data.get(self.pos) else {
            return Err(self.error_at(self.pos, "unterminated escape"));
        };
        self.pos += 1;
        let simple = match byte {
            b'"' => b'"',
            b'\\' => b'\\',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => {
                let ch = self.read_unicode_escape()?;
                let mut tmp = [0_u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut tmp).as_bytes());
                return Ok(());
            }
            _ => return Err(self.error_at(self.pos - 1, "invalid escape")),
        };
        out.push(simple);
        Ok(())
    }

    fn read_unicode_escape(&mut self) -> Result<char, Error> {
        let high = self.read_hex4()?;
        let code = if (0xd800..0xdc00).contains(&high) {
            if !self.data[self.pos..].starts_with(b"\\u") {
                return Err(self.error_at(self.pos, "unpaired surrogate"));
            }
            self.pos += 2;
            let low = self.read_hex4()?;
            if !(0xdc00..0xe000).contains(&low) {
                return Err(self.error_at(self.pos, "unpaired surrogate"));
            }
            0x10000 + ((high - 0xd800) << 10) + (low - 0xdc00)
        } else {
            high
        };
        char::from_u32(code).ok_or_else(|| self.error_at(self.pos, "invalid unicode escape"))
    }

    fn read_hex4(&mut self) -> Result<u32, Error> {
        let Some(digits) = self.data.get(self.pos..self.pos + 4) else {
            return Err(self.error_at(self.pos, "unterminated escape"));
        };
        let mut code = 0;
        for digit in digits {
            let value = (*digit as char)
                .to_digit(16)
                .ok_or_else(|| self.error_at(self.pos, "invalid unicode escape"))?;
            code = code * 16 + value;
        }
        self.pos += 4;
        Ok(code)
    }

    fn skip_nested(&mut self) -> Result<(), Error> {
        match self.peek() {
            Some(b'{') => {
                self.begin_object()?;
                let mut first = true;
                while self.next_key(first)?.is_some() {
                    first = false;
                    self.skip_nested()?;
                }
                Ok(())
            }
            Some(b'[') => {
                self.begin_array()?;
                let mut first = true;
                while self.next_item(first)? {
                    first = false;
                    self.skip_nested()?;
                }
                Ok(())
            }
            Some(b'"') => self.read_string().map(|_| ()),
            Some(b't') => self.expect_literal(b"true"),
            Some(b'f') => self.expect_literal(b"false"),
            Some(b'n') => self.expect_literal(b"null"),
            Some(b'-' | b'0'..=b'9') => self.read_number().map(|_| ()),
            _ => Err(self.unexpected("value")),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::Decoder;
    use crate::Error;

    #[test]
    fn strings() {
        let mut decoder = Decoder::new(br#""plain""#);
        assert!(matches!(decoder.read_string().unwrap(), Cow::Borrowed("plain")));

        let mut decoder = Decoder::new(r#""a\"b\\c\né😀""#.as_bytes());
        assert_eq!(decoder.read_string().unwrap(), "a\"b\\c\né😀");

        let mut decoder = Decoder::new(br#""\ud83d""#);
        assert!(matches!(decoder.read_string(), Err(Error::Syntax { .. })));

        let mut decoder = Decoder::new(b"\"a\nb\"");
        assert!(decoder.read_string().is_err());
    }

    #[test]
    fn numbers() {
        let mut decoder = Decoder::new(b"-12");
        assert_eq!(decoder.read_i64().unwrap(), -12);

        let mut decoder = Decoder::new(b"1.5");
        assert!(decoder.read_i64().is_err());

        let mut decoder = Decoder::new(b"-1");
        assert!(decoder.read_u64().is_err());

        let mut decoder = Decoder::new(b"1e3");
        assert_eq!(decoder.read_f64().unwrap(), 1000.0);

        let mut decoder = Decoder::new(b"01");
        assert_eq!(decoder.read_i64().unwrap(), 0);
        assert!(decoder.finish().is_err());
    }

    #[test]
    fn skip_and_read_values() {
        let mut decoder = Decoder::new(br#"{"a":[1,{"b":null}],"c":"d"} 7"#);
        assert_eq!(decoder.skip_value().unwrap(), br#"{"a":[1,{"b":null}],"c":"d"}"#);
        assert_eq!(decoder.read_value().unwrap(), serde_json::json!(7));
        decoder.finish().unwrap();

        let mut decoder = Decoder::new(br#"{"a" 1}"#);
        let err = decoder.skip_value().unwrap_err();
        assert!(matches!(err, Error::Syntax { offset: 5, .. }));
    }

    #[test]
    fn separators() {
        let mut decoder = Decoder::new(b"[1 2]");
        decoder.begin_array().unwrap();
        assert!(decoder.next_item(true).unwrap());
        decoder.read_i64().unwrap();
        assert!(decoder.next_item(false).is_err());

        let mut decoder = Decoder::new(b"[,1]");
        decoder.begin_array().unwrap();
        assert!(decoder.next_item(true).unwrap());
        assert!(decoder.read_i64().is_err());
    }

    #[test]
    fn nesting_limit() {
        let shallow = format!("{}{}", "[".repeat(128), "]".repeat(128));
        let mut decoder = Decoder::new(shallow.as_bytes());
        decoder.skip_value().unwrap();
        decoder.finish().unwrap();

        let deep = format!("{}{}", "[".repeat(129), "]".repeat(129));
        let mut decoder = Decoder::new(deep.as_bytes());
        let err = decoder.skip_value().unwrap_err();
        assert!(matches!(err, Error::Syntax { offset: 129, .. }));

        // Typed reads and skipped values share one depth.
        let nested = format!("{}{}", "{\"a\":".repeat(127), "[[]]");
        let mut decoder = Decoder::new(nested.as_bytes());
        for _ in 0..127 {
            decoder.begin_object().unwrap();
            assert!(decoder.next_key(true).unwrap().is_some());
        }
        assert!(decoder.skip_value().is_err());
    }
}
