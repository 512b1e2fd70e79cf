//! Per-call state: output buffer, filters, interceptors and caller context.

use core::any::Any;
use core::fmt;

use foldhash::fast::FixedState;
use hashbrown::{HashMap, HashSet};
use vc_json_reflect::Reflect;

use crate::cache::Cache;
use crate::{BoxError, Decoder};

// -----------------------------------------------------------------------------
// Filter

/// A field allow-list for the struct found at one output path.
///
/// Only the listed fields of that struct are written; a filter listing no
/// fields writes `{}`. Names are matched against both output names and
/// field names.
///
/// ```
/// use vc_json_codec::Filter;
///
/// let filter = Filter::new("owner", ["Id", "Name"]);
/// assert_eq!(filter.path(), "owner");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    path: String,
    fields: Vec<String>,
}

impl Filter {
    /// Creates a filter for the struct at `path`, `""` being the root value.
    pub fn new<I, S>(path: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// The allowed field names at one path.
#[derive(Debug, Default)]
pub(crate) struct FieldSet(HashSet<String, FixedState>);

impl FieldSet {
    #[inline]
    pub fn allows(&self, out_name: &str, field_name: &str) -> bool {
        self.0.contains(out_name) || self.0.contains(field_name)
    }
}

// -----------------------------------------------------------------------------
// Interceptors

/// Replaces the encoded value of one field.
///
/// Returns the raw JSON bytes written after the field's key.
pub type MarshalInterceptor = Box<dyn Fn(&Options) -> Result<Vec<u8>, BoxError> + Send + Sync>;

/// Replaces the decoding of one field.
///
/// Must consume exactly one JSON value from the decoder.
pub type UnmarshalInterceptor = Box<
    dyn Fn(&mut dyn Reflect, &mut Decoder<'_>, &Options) -> Result<(), BoxError> + Send + Sync,
>;

// -----------------------------------------------------------------------------
// Options

/// Per-call options of [`Marshaller::marshal`] and [`Marshaller::unmarshal`].
///
/// Paths use output names joined with `.`, e.g. `owner.name`. Items of lists
/// and maps share the path of their container.
///
/// ```
/// use vc_json_codec::{Filter, Options};
///
/// struct RequestId(u64);
///
/// let options = Options::new()
///     .with_filters([Filter::new("", ["Id"])])
///     .with_marshal_interceptor("Secret", |_| Ok(b"\"***\"".to_vec()))
///     .with_context(RequestId(7));
///
/// assert_eq!(options.context::<RequestId>().map(|r| r.0), Some(7));
/// assert!(options.context::<String>().is_none());
/// ```
///
/// [`Marshaller::marshal`]: crate::Marshaller::marshal
/// [`Marshaller::unmarshal`]: crate::Marshaller::unmarshal
#[derive(Default)]
pub struct Options {
    filters: HashMap<String, FieldSet, FixedState>,
    marshal_interceptors: HashMap<String, MarshalInterceptor, FixedState>,
    unmarshal_interceptors: HashMap<String, UnmarshalInterceptor, FixedState>,
    context: Vec<Box<dyn Any + Send + Sync>>,
}

impl Options {
    /// Creates empty options.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds field allow-lists. Filters sharing a path are merged.
    pub fn with_filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        for filter in filters {
            self.filters
                .entry(filter.path)
                .or_default()
                .0
                .extend(filter.fields);
        }
        self
    }

    /// Replaces the encoded value of the field at `path`.
    pub fn with_marshal_interceptor<F>(mut self, path: impl Into<String>, interceptor: F) -> Self
    where
        F: Fn(&Options) -> Result<Vec<u8>, BoxError> + Send + Sync + 'static,
    {
        self.marshal_interceptors
            .insert(path.into(), Box::new(interceptor));
        self
    }

    /// Replaces the decoding of the field at `path`.
    pub fn with_unmarshal_interceptor<F>(mut self, path: impl Into<String>, interceptor: F) -> Self
    where
        F: Fn(&mut dyn Reflect, &mut Decoder<'_>, &Options) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.unmarshal_interceptors
            .insert(path.into(), Box::new(interceptor));
        self
    }

    /// Attaches a caller value visible to interceptors and custom codecs.
    pub fn with_context<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.context.push(Box::new(value));
        self
    }

    /// Returns the first attached context value of type `T`.
    pub fn context<T: Any>(&self) -> Option<&T> {
        self.context.iter().find_map(|value| (**value).downcast_ref::<T>())
    }

    #[inline]
    pub(crate) fn filter(&self, path: &str) -> Option<&FieldSet> {
        self.filters.get(path)
    }

    #[inline]
    pub(crate) fn marshal_interceptor(&self, path: &str) -> Option<&MarshalInterceptor> {
        self.marshal_interceptors.get(path)
    }

    #[inline]
    pub(crate) fn unmarshal_interceptor(&self, path: &str) -> Option<&UnmarshalInterceptor> {
        self.unmarshal_interceptors.get(path)
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("filters", &self.filters)
            .field("marshal_interceptors", &self.marshal_interceptors.keys())
            .field("unmarshal_interceptors", &self.unmarshal_interceptors.keys())
            .field("context", &self.context.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Sessions

/// The state of one encode call.
///
/// Codecs append to [`buffer`](Self::buffer). The output path is only tracked
/// when filters or interceptors may need it.
pub struct Session<'a> {
    buf: &'a mut Vec<u8>,
    cache: &'a Cache,
    options: &'a Options,
    path: String,
    track: bool,
}

impl<'a> Session<'a> {
    pub(crate) fn new(buf: &'a mut Vec<u8>, cache: &'a Cache, options: &'a Options) -> Self {
        Self {
            buf,
            cache,
            options,
            path: String::new(),
            track: !options.filters.is_empty() || !options.marshal_interceptors.is_empty(),
        }
    }

    /// Returns the output buffer.
    #[inline]
    pub fn buffer(&mut self) -> &mut Vec<u8> {
        self.buf
    }

    /// Returns the options of this call.
    #[inline]
    pub fn options(&self) -> &'a Options {
        self.options
    }

    /// Returns the output path of the value being written.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub(crate) fn cache(&self) -> &'a Cache {
        self.cache
    }

    #[inline]
    pub(crate) fn enter(&mut self, segment: &str) -> usize {
        enter(&mut self.path, self.track, segment)
    }

    #[inline]
    pub(crate) fn leave(&mut self, mark: usize) {
        self.path.truncate(mark);
    }
}

/// The state of one decode call.
pub struct UnmarshalSession<'a> {
    cache: &'a Cache,
    options: &'a Options,
    path: String,
    track: bool,
}

impl<'a> UnmarshalSession<'a> {
    pub(crate) fn new(cache: &'a Cache, options: &'a Options) -> Self {
        Self {
            cache,
            options,
            path: String::new(),
            track: !options.unmarshal_interceptors.is_empty(),
        }
    }

    /// Returns the options of this call.
    #[inline]
    pub fn options(&self) -> &'a Options {
        self.options
    }

    /// Returns the output path of the value being read.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub(crate) fn cache(&self) -> &'a Cache {
        self.cache
    }

    #[inline]
    pub(crate) fn enter(&mut self, segment: &str) -> usize {
        enter(&mut self.path, self.track, segment)
    }

    #[inline]
    pub(crate) fn leave(&mut self, mark: usize) {
        self.path.truncate(mark);
    }
}

fn enter(path: &mut String, track: bool, segment: &str) -> usize {
    let mark = path.len();
    if track {
        if !path.is_empty() {
            path.push('.');
        }
        path.push_str(segment);
    }
    mark
}

/// Joins an output path and a field name.
pub(crate) fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_owned()
    } else {
        format!("{parent}.{name}")
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Filter, Options, join_path};

    #[test]
    fn filters_merge() {
        let options = Options::new().with_filters([
            Filter::new("", ["a"]),
            Filter::new("", ["b"]),
            Filter::new("", ["a"]),
            Filter::new("child", Vec::<String>::new()),
        ]);

        let root = options.filter("").unwrap();
        assert!(root.allows("a", "x"));
        assert!(root.allows("x", "b"));
        assert!(!root.allows("c", "c"));

        let child = options.filter("child").unwrap();
        assert!(!child.allows("a", "a"));
        assert!(options.filter("other").is_none());
    }

    #[test]
    fn paths() {
        assert_eq!(join_path("", "a"), "a");
        assert_eq!(join_path("a", "b"), "a.b");
    }
}
