//! Field annotation parsing.
//!
//! Annotations are the raw `#[tag(key = "value")]` strings kept on each
//! [`NamedField`]. They are parsed once, when the owning struct's codec is built:
//!
//! - `json = "name,omitempty,inline"`, a name of `-` alone excludes the field.
//! - `jsonx = "inline"` or `jsonx = "transient"`.
//! - `set_marker = "true"` marks the presence-marker field.
//! - `default = "value=7,format=%Y-%m-%d,nullable=true,required=true,name=Out,embedded=true,ignorecaseformatter=true"`.

use bitflags::bitflags;
use vc_json_reflect::info::NamedField;

use crate::{Error, IOConfig};

bitflags! {
    /// Normalized per-field switches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct FieldFlags: u8 {
        /// Skip the field when its value is empty.
        const OMIT_EMPTY          = 1 << 0;
        /// The field replaces the object wrapping of its struct.
        const INLINE              = 1 << 1;
        /// The field records which sibling keys were present.
        const MARKER              = 1 << 2;
        /// A zero value is written as `null`.
        const NULLABLE            = 1 << 3;
        /// Decoding an object without this key fails.
        const REQUIRED            = 1 << 4;
        /// The fields of this struct-typed field are flattened into the parent.
        const EMBEDDED            = 1 << 5;
        /// The case format does not rename this field.
        const IGNORE_CASE_FORMAT  = 1 << 6;
    }
}

/// A parsed field annotation.
#[derive(Debug, Clone)]
pub(crate) struct FieldTag {
    /// Resolved output name.
    pub name: String,
    /// `true` if the name comes from an annotation rather than the field itself.
    pub renamed: bool,
    pub flags: FieldFlags,
    /// The `value=` of the `default` annotation.
    pub default: Option<String>,
    /// The `format=` of the `default` annotation.
    pub format: Option<String>,
}

impl FieldTag {
    /// Parses the annotations of `field`.
    ///
    /// Returns `Ok(None)` when the field takes no part in encoding or decoding.
    pub fn parse(field: &NamedField, config: &IOConfig) -> Result<Option<Self>, Error> {
        let mut flags = FieldFlags::empty();
        let mut name: Option<String> = None;
        let mut default = None;
        let mut format = None;

        if let Some(json) = field.tag("json") {
            if json == "-" {
                return Ok(None);
            }
            let mut segments = json.split(',');
            if let Some(first) = segments.next()
                && !first.is_empty()
            {
                name = Some(first.to_owned());
            }
            for option in segments {
                match option.trim() {
                    "omitempty" => flags |= FieldFlags::OMIT_EMPTY,
                    "inline" => flags |= FieldFlags::INLINE,
                    _ => {}
                }
            }
        }

        if let Some(extra) = field.tag("jsonx") {
            for option in extra.split(',') {
                match option.trim() {
                    "inline" => flags |= FieldFlags::INLINE,
                    "transient" => return Ok(None),
                    _ => {}
                }
            }
        }

        if let Some(marker) = field.tag("set_marker")
            && parse_bool(field, "set_marker", marker)?
        {
            flags |= FieldFlags::MARKER;
        }

        if let Some(attrs) = field.tag("default") {
            for segment in attrs.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let Some((key, value)) = segment.split_once('=') else {
                    return Err(tag_error(
                        field,
                        format_args!("malformed segment `{segment}`, expected `key=value`"),
                    ));
                };
                let (key, value) = (key.trim(), value.trim());
                match key {
                    "value" => default = Some(value.to_owned()),
                    "format" => format = Some(value.to_owned()),
                    "name" => {
                        if name.is_none() && !value.is_empty() {
                            name = Some(value.to_owned());
                        }
                    }
                    "nullable" => flags.set(FieldFlags::NULLABLE, parse_bool(field, key, value)?),
                    "required" => flags.set(FieldFlags::REQUIRED, parse_bool(field, key, value)?),
                    "embedded" => flags.set(FieldFlags::EMBEDDED, parse_bool(field, key, value)?),
                    "ignorecaseformatter" => flags.set(
                        FieldFlags::IGNORE_CASE_FORMAT,
                        parse_bool(field, key, value)?,
                    ),
                    _ => {}
                }
            }
        }

        if name.is_none() && !field.name().starts_with(char::is_alphabetic) {
            return Ok(None);
        }

        if config.omit_empty() {
            flags |= FieldFlags::OMIT_EMPTY;
        }
        if field.is_embedded() {
            flags |= FieldFlags::EMBEDDED;
        }

        let renamed = name.is_some();
        let name = match name {
            Some(name) => name,
            None => match config.case_format() {
                Some(case) if !flags.contains(FieldFlags::IGNORE_CASE_FORMAT) => {
                    case.format(field.name())
                }
                _ => field.name().to_owned(),
            },
        };

        Ok(Some(Self {
            name,
            renamed,
            flags,
            default,
            format,
        }))
    }

    #[inline]
    pub fn has(&self, flag: FieldFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Returns `true` if the field's own fields are flattened into its parent.
    #[inline]
    pub fn is_flattened(&self) -> bool {
        self.has(FieldFlags::EMBEDDED) && !self.renamed
    }

    /// Returns `true` if the field's scalar codec depends on this annotation.
    #[inline]
    pub fn shapes_value(&self) -> bool {
        self.default.is_some() || self.format.is_some() || self.has(FieldFlags::NULLABLE)
    }
}

fn parse_bool(field: &NamedField, key: &str, value: &str) -> Result<bool, Error> {
    match value {
        "" | "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(tag_error(
            field,
            format_args!("`{key}` expects `true` or `false`, found `{value}`"),
        )),
    }
}

fn tag_error(field: &NamedField, reason: core::fmt::Arguments<'_>) -> Error {
    Error::Tag {
        field: field.name().to_owned(),
        reason: reason.to_string(),
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use vc_json_reflect::info::NamedField;

    use super::{FieldFlags, FieldTag};
    use crate::{CaseFormat, Error, IOConfig};

    fn field(name: &'static str, tags: &'static [(&'static str, &'static str)]) -> NamedField {
        NamedField::new::<i32>(name, 0).with_tags(tags)
    }

    fn parse(field: &NamedField) -> Option<FieldTag> {
        FieldTag::parse(field, &IOConfig::new()).unwrap()
    }

    #[test]
    fn json_name_and_options() {
        let tag = parse(&field("id", &[("json", "ID,omitempty")])).unwrap();
        assert_eq!(tag.name, "ID");
        assert!(tag.renamed);
        assert!(tag.has(FieldFlags::OMIT_EMPTY));
        assert!(!tag.has(FieldFlags::INLINE));

        let tag = parse(&field("raw", &[("json", ",inline")])).unwrap();
        assert_eq!(tag.name, "raw");
        assert!(!tag.renamed);
        assert!(tag.has(FieldFlags::INLINE));
    }

    #[test]
    fn excluded_fields() {
        assert!(parse(&field("id", &[("json", "-")])).is_none());
        assert!(parse(&field("id", &[("jsonx", "transient")])).is_none());
        assert!(parse(&field("_id", &[])).is_none());

        let tag = parse(&field("_id", &[("json", "Id")])).unwrap();
        assert_eq!(tag.name, "Id");
    }

    #[test]
    fn default_grammar() {
        let tag = parse(&field(
            "created",
            &[("default", "value=2024-01-02,format=%Y-%m-%d,nullable=true,required=true")],
        ))
        .unwrap();
        assert_eq!(tag.default.as_deref(), Some("2024-01-02"));
        assert_eq!(tag.format.as_deref(), Some("%Y-%m-%d"));
        assert!(tag.has(FieldFlags::NULLABLE));
        assert!(tag.shapes_value());

        let err = FieldTag::parse(&field("id", &[("default", "value")]), &IOConfig::new());
        assert!(matches!(err, Err(Error::Tag { .. })));

        let err = FieldTag::parse(&field("id", &[("default", "nullable=yes")]), &IOConfig::new());
        assert!(matches!(err, Err(Error::Tag { .. })));
    }

    #[test]
    fn case_format_and_overrides() {
        let config = IOConfig::new()
            .with_case_format(CaseFormat::UpperCamel)
            .with_omit_empty(true);

        let tag = FieldTag::parse(&field("user_id", &[]), &config).unwrap().unwrap();
        assert_eq!(tag.name, "UserId");
        assert!(tag.has(FieldFlags::OMIT_EMPTY));

        let tag = FieldTag::parse(&field("user_id", &[("default", "name=uid")]), &config)
            .unwrap()
            .unwrap();
        assert_eq!(tag.name, "uid");

        let tag = FieldTag::parse(
            &field("user_id", &[("default", "ignorecaseformatter=true")]),
            &config,
        )
        .unwrap()
        .unwrap();
        assert_eq!(tag.name, "user_id");
    }

    #[test]
    fn marker_flag() {
        let tag = parse(&field("has", &[("set_marker", "true")])).unwrap();
        assert!(tag.has(FieldFlags::MARKER));

        let tag = parse(&field("has", &[("set_marker", "false")])).unwrap();
        assert!(!tag.has(FieldFlags::MARKER));
    }
}
