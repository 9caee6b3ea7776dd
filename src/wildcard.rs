//! LIKE-pattern conversion. `%` matches any run of characters and `_` matches
//!  exactly one; everything else is literal.

use crate::translate::Error;

/// A regex that can't match any input, not even the empty string.
pub const NEVER_MATCH: &str = r"[^\s\S]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildcardPolicy {
    /// The store understands `%` and `_` itself; the pattern is passed through.
    Native,
    /// Whole-field regex match: the output is wrapped in `^...$`.
    Anchored,
    /// Regex sub-match ("contains" semantics), no anchors.
    Unanchored,
}

impl WildcardPolicy {
    pub fn translate(&self, pattern: Option<&str>) -> String {
        match (self, pattern) {
            (Self::Native, pattern) => pattern.unwrap_or_default().to_string(),
            (Self::Anchored, None) => NEVER_MATCH.to_string(),
            (Self::Unanchored, None) => String::new(),
            (_, Some("")) => String::new(),
            (Self::Anchored, Some(pattern)) => format!("^{}$", like_to_regex(pattern)),
            (Self::Unanchored, Some(pattern)) => like_to_regex(pattern),
        }
    }

    pub fn is_regex(&self) -> bool {
        !matches!(self, Self::Native)
    }
}

fn like_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 4);
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '%' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                // a run of `%` is still a single "any sequence"
                while chars.next_if_eq(&'%').is_some() {}
                out.push_str(".*");
            }
            '_' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push('.');
            }
            c => literal.push(c),
        }
    }
    out.push_str(&regex::escape(&literal));
    out
}

/// Wraps a plain value in `%` according to the kind of match a derived query
///  asked for (`NameContaining`, `NameStartingWith`...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum StringMatch {
    #[default]
    Default,
    Contains,
    StartsWith,
    EndsWith,
}

impl StringMatch {
    pub fn wrap(&self, value: Option<&str>) -> Result<String, Error> {
        let value = value.ok_or(Error::NullMatchValue(*self))?;
        Ok(match self {
            Self::Default => value.to_string(),
            Self::Contains => format!("%{value}%"),
            Self::StartsWith => format!("{value}%"),
            Self::EndsWith => format!("%{value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn anchored() {
        let p = WildcardPolicy::Anchored;
        assert_eq!(p.translate(Some("Max_")), "^Max.$");
        assert_eq!(p.translate(Some("Max%")), "^Max.*$");
        assert_eq!(p.translate(None), NEVER_MATCH);

        let re = Regex::new(&p.translate(Some("Max_"))).expect("valid regex");
        assert!(re.is_match("Maxi"));
        assert!(!re.is_match("Max"));
        assert!(!re.is_match("Maxim"));
    }

    #[test]
    fn unanchored() {
        let p = WildcardPolicy::Unanchored;
        assert_eq!(p.translate(Some("")), "");
        assert_eq!(p.translate(None), "");
        assert_eq!(p.translate(Some("%Ota%")), ".*Ota.*");
        assert_eq!(p.translate(Some("Ota_")), "Ota.");
        assert_eq!(p.translate(Some("%%Ota")), ".*Ota");
        assert_eq!(p.translate(Some("__")), "..");
    }

    #[test]
    fn metacharacters_are_literal() {
        let p = WildcardPolicy::Unanchored;
        assert_eq!(p.translate(Some(".+")), r"\.\+");

        let re = Regex::new(&WildcardPolicy::Anchored.translate(Some("a.b%"))).expect("valid");
        assert!(re.is_match("a.bcd"));
        assert!(!re.is_match("axbcd"));
    }

    #[test]
    fn native_passthrough() {
        let p = WildcardPolicy::Native;
        assert_eq!(p.translate(Some("%Ota_")), "%Ota_");
        assert_eq!(p.translate(None), "");
        assert!(!p.is_regex());
    }

    #[test]
    fn string_match_wrapping() {
        assert_eq!(StringMatch::Contains.wrap(Some("Ota")).unwrap(), "%Ota%");
        assert_eq!(StringMatch::StartsWith.wrap(Some("Ota")).unwrap(), "Ota%");
        assert_eq!(StringMatch::EndsWith.wrap(Some("Ota")).unwrap(), "%Ota");
        assert_eq!(StringMatch::Default.wrap(Some("Ota")).unwrap(), "Ota");
    }

    #[test]
    fn string_match_rejects_null() {
        for m in [
            StringMatch::Default,
            StringMatch::Contains,
            StringMatch::StartsWith,
            StringMatch::EndsWith,
        ] {
            assert_eq!(m.wrap(None), Err(Error::NullMatchValue(m)));
        }
    }
}
