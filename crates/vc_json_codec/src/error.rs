use core::fmt;

use thiserror::Error;

/// A boxed error returned by interceptors.
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

// -----------------------------------------------------------------------------
// Error

/// Errors raised while building a codec, encoding or decoding.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A type cannot be represented, raised when its codec is first built.
    ///
    /// Construction failures are not cached, the next call builds again.
    #[error("cannot build codec for `{type_path}`: {reason}")]
    Construction {
        type_path: &'static str,
        reason: String,
    },

    /// A field annotation is malformed.
    #[error("invalid annotation on field `{field}`: {reason}")]
    Tag { field: String, reason: String },

    /// A value cannot be written.
    #[error("cannot encode `{type_path}`: {reason}")]
    Encode {
        type_path: &'static str,
        reason: String,
    },

    /// A value cannot be read, carrying the path of the offending field.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The input is not well-formed JSON, or does not fit the destination type.
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// A caller supplied interceptor failed.
    #[error("interceptor at `{path}` failed: {source}")]
    Interceptor {
        path: String,
        #[source]
        source: BoxError,
    },
}

impl Error {
    #[inline]
    pub(crate) fn construction(type_path: &'static str, reason: impl fmt::Display) -> Self {
        Self::Construction {
            type_path,
            reason: format!("{reason}"),
        }
    }

    #[inline]
    pub(crate) fn encode(type_path: &'static str, reason: impl fmt::Display) -> Self {
        Self::Encode {
            type_path,
            reason: format!("{reason}"),
        }
    }

    #[inline]
    pub(crate) fn mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::Encode {
            type_path: found,
            reason: format!("expected a `{expected}`"),
        }
    }
}

// -----------------------------------------------------------------------------
// DecodeError

/// A decode failure qualified by the path of the field being read.
///
/// Nested failures are folded into one error whose path is the full breadcrumb,
/// `a.b` for struct fields and `a[1]` for list items.
///
/// ```
/// use vc_json_codec::{DecodeError, Error};
///
/// let inner = Error::Syntax { offset: 3, message: "expected number".into() };
/// let err = DecodeError::wrap("[1]", inner);
/// let err = DecodeError::wrap("items", Error::Decode(err));
///
/// assert_eq!(err.path(), "items[1]");
/// assert_eq!(
///     err.to_string(),
///     "failed to unmarshal items[1]: syntax error at offset 3: expected number",
/// );
/// ```
#[derive(Debug, Error)]
#[error("failed to unmarshal {path}: {cause}")]
pub struct DecodeError {
    path: String,
    #[source]
    cause: Box<Error>,
}

impl DecodeError {
    /// Qualifies `cause` with a path `segment`.
    ///
    /// If `cause` is itself a [`DecodeError`], the segments are joined and its
    /// cause is kept.
    pub fn wrap(segment: &str, cause: Error) -> Self {
        match cause {
            Error::Decode(inner) => {
                let mut path = String::with_capacity(segment.len() + inner.path.len() + 1);
                path.push_str(segment);
                if !segment.is_empty() && !inner.path.is_empty() && !inner.path.starts_with('[') {
                    path.push('.');
                }
                path.push_str(&inner.path);
                Self {
                    path,
                    cause: inner.cause,
                }
            }
            other => Self {
                path: segment.into(),
                cause: Box::new(other),
            },
        }
    }

    /// Returns the breadcrumb of the offending field.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the underlying failure.
    #[inline]
    pub fn cause(&self) -> &Error {
        &self.cause
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{DecodeError, Error};

    fn syntax() -> Error {
        Error::Syntax {
            offset: 0,
            message: "unexpected end".into(),
        }
    }

    #[test]
    fn nested_paths_join() {
        let err = DecodeError::wrap("name", syntax());
        let err = DecodeError::wrap("[0]", Error::Decode(err));
        let err = DecodeError::wrap("children", Error::Decode(err));
        let err = DecodeError::wrap("root", Error::Decode(err));

        assert_eq!(err.path(), "root.children[0].name");
        assert!(matches!(err.cause(), Error::Syntax { .. }));
    }

    #[test]
    fn message_carries_path() {
        let err = Error::Decode(DecodeError::wrap("id", syntax()));
        assert_eq!(
            err.to_string(),
            "failed to unmarshal id: syntax error at offset 0: unexpected end"
        );
    }
}
