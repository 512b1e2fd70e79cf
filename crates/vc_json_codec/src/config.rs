//! Construction-time configuration of a [`Marshaller`](crate::Marshaller).

use core::fmt;

// -----------------------------------------------------------------------------
// CaseFormat

/// The renaming applied to field names that carry no explicit output name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseFormat {
    /// `user_id` -> `UserId`
    UpperCamel,
    /// `user_id` -> `userId`
    LowerCamel,
    /// `user_id` -> `USER_ID`
    UpperUnderscore,
    /// `user_id` -> `user_id`
    LowerUnderscore,
    /// `user_id` -> `USERID`
    Upper,
    /// `user_id` -> `userid`
    Lower,
    /// `user_id` -> `User Id`
    Title,
}

impl CaseFormat {
    /// Renames a field name.
    ///
    /// Words are split on `_` and on lower-to-upper case transitions.
    ///
    /// ```
    /// use vc_json_codec::CaseFormat;
    ///
    /// assert_eq!(CaseFormat::UpperCamel.format("user_id"), "UserId");
    /// assert_eq!(CaseFormat::LowerCamel.format("user_id"), "userId");
    /// assert_eq!(CaseFormat::UpperUnderscore.format("userId"), "USER_ID");
    /// assert_eq!(CaseFormat::Title.format("first_name"), "First Name");
    /// ```
    pub fn format(self, name: &str) -> String {
        let words = split_words(name);
        let mut out = String::with_capacity(name.len() + words.len());
        for (index, word) in words.iter().enumerate() {
            match self {
                Self::UpperCamel => push_capitalized(&mut out, word),
                Self::LowerCamel => {
                    if index == 0 {
                        out.push_str(&word.to_lowercase());
                    } else {
                        push_capitalized(&mut out, word);
                    }
                }
                Self::UpperUnderscore | Self::LowerUnderscore => {
                    if index > 0 {
                        out.push('_');
                    }
                    if self == Self::UpperUnderscore {
                        out.push_str(&word.to_uppercase());
                    } else {
                        out.push_str(&word.to_lowercase());
                    }
                }
                Self::Upper => out.push_str(&word.to_uppercase()),
                Self::Lower => out.push_str(&word.to_lowercase()),
                Self::Title => {
                    if index > 0 {
                        out.push(' ');
                    }
                    push_capitalized(&mut out, word);
                }
            }
        }
        out
    }
}

impl fmt::Display for CaseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UpperCamel => "UpperCamel",
            Self::LowerCamel => "LowerCamel",
            Self::UpperUnderscore => "UpperUnderscore",
            Self::LowerUnderscore => "LowerUnderscore",
            Self::Upper => "Upper",
            Self::Lower => "Lower",
            Self::Title => "Title",
        };
        f.pad(name)
    }
}

fn split_words(name: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut prev_lower = false;
    for (index, ch) in name.char_indices() {
        if ch == '_' {
            if start < index {
                words.push(&name[start..index]);
            }
            start = index + ch.len_utf8();
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && start < index {
            words.push(&name[start..index]);
            start = index;
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
    }
    if start < name.len() {
        words.push(&name[start..]);
    }
    words
}

fn push_capitalized(out: &mut String, word: &str) {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(&chars.as_str().to_lowercase());
    }
}

// -----------------------------------------------------------------------------
// IOConfig

/// Rendering options forwarded into every codec construction.
///
/// The same type may render differently under two `IOConfig`s, so each
/// [`Marshaller`](crate::Marshaller) owns exactly one.
///
/// ```
/// use vc_json_codec::{CaseFormat, IOConfig};
///
/// let config = IOConfig::new()
///     .with_case_format(CaseFormat::LowerCamel)
///     .with_omit_empty(true)
///     .with_exclude(["Owner.Password"]);
///
/// assert!(config.is_excluded("owner.password"));
/// assert!(config.has_exclusions_below("Owner"));
/// assert!(!config.has_exclusions_below("Items"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct IOConfig {
    case_format: Option<CaseFormat>,
    omit_empty: bool,
    // Lower-cased output paths.
    exclude: Vec<String>,
    time_layout: Option<String>,
}

impl IOConfig {
    /// Creates a config that keeps field names, emits every field and formats
    /// time as RFC 3339.
    #[inline]
    pub const fn new() -> Self {
        Self {
            case_format: None,
            omit_empty: false,
            exclude: Vec::new(),
            time_layout: None,
        }
    }

    /// Renames fields without an explicit output name.
    #[inline]
    pub fn with_case_format(mut self, format: CaseFormat) -> Self {
        self.case_format = Some(format);
        self
    }

    /// Omits empty values of every field, as if each was tagged `omitempty`.
    #[inline]
    pub fn with_omit_empty(mut self, omit_empty: bool) -> Self {
        self.omit_empty = omit_empty;
        self
    }

    /// Drops the fields at the given output paths, e.g. `owner.password`.
    ///
    /// Paths are matched case-insensitively.
    pub fn with_exclude<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude
            .extend(paths.into_iter().map(|p| p.as_ref().to_lowercase()));
        self
    }

    /// Sets the default `chrono` strftime layout for time values.
    #[inline]
    pub fn with_time_layout(mut self, layout: impl Into<String>) -> Self {
        self.time_layout = Some(layout.into());
        self
    }

    #[inline]
    pub fn case_format(&self) -> Option<CaseFormat> {
        self.case_format
    }

    #[inline]
    pub fn omit_empty(&self) -> bool {
        self.omit_empty
    }

    #[inline]
    pub fn time_layout(&self) -> Option<&str> {
        self.time_layout.as_deref()
    }

    /// Returns `true` if the field at `path` is excluded.
    pub fn is_excluded(&self, path: &str) -> bool {
        !self.exclude.is_empty() && {
            let path = path.to_lowercase();
            self.exclude.iter().any(|e| *e == path)
        }
    }

    /// Returns `true` if any excluded path lies strictly below `path`.
    ///
    /// Every exclusion lies below the root path `""`.
    pub fn has_exclusions_below(&self, path: &str) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        if path.is_empty() {
            return true;
        }
        let path = path.to_lowercase();
        self.exclude.iter().any(|e| {
            e.len() > path.len() && e.starts_with(path.as_str()) && e.as_bytes()[path.len()] == b'.'
        })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{CaseFormat, IOConfig};

    #[test]
    fn case_formats() {
        let cases = [
            (CaseFormat::UpperCamel, "UserId"),
            (CaseFormat::LowerCamel, "userId"),
            (CaseFormat::UpperUnderscore, "USER_ID"),
            (CaseFormat::LowerUnderscore, "user_id"),
            (CaseFormat::Upper, "USERID"),
            (CaseFormat::Lower, "userid"),
            (CaseFormat::Title, "User Id"),
        ];
        for (format, expected) in cases {
            assert_eq!(format.format("user_id"), expected, "{format}");
        }
        assert_eq!(CaseFormat::LowerUnderscore.format("userID"), "user_id");
        assert_eq!(CaseFormat::UpperCamel.format("id"), "Id");
        assert_eq!(CaseFormat::UpperCamel.format("_"), "");
    }

    #[test]
    fn exclusions() {
        let config = IOConfig::new().with_exclude(["a.b.c", "x"]);

        assert!(config.is_excluded("A.B.C"));
        assert!(config.is_excluded("x"));
        assert!(!config.is_excluded("a.b"));

        assert!(config.has_exclusions_below(""));
        assert!(config.has_exclusions_below("a"));
        assert!(config.has_exclusions_below("a.b"));
        assert!(!config.has_exclusions_below("a.b.c"));
        assert!(!config.has_exclusions_below("ab"));
        assert!(!IOConfig::new().has_exclusions_below(""));
    }
}
