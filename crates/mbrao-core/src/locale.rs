//! Locale-keyed values and the filtering rules shared by every localized field
//!
//! A localized field is either a single string valid for every locale, or a
//! mapping from locale keys to strings. A key may list several locales
//! separated by commas (`"en,it"`), and the `*` key applies to every locale
//! that has no dedicated entry.

use crate::error::{MbraoError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Locale key matching every locale
pub const ALL_LOCALES: &str = "*";

/// Normalize a list of requested locales
///
/// Splits comma-separated entries, trims whitespace, drops empty entries and
/// removes duplicates while keeping the first occurrence.
pub fn sanitize_locales<I, S>(locales: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sanitized: Vec<String> = Vec::new();
    for entry in locales {
        for locale in split_locale_key(entry.as_ref()) {
            if !sanitized.iter().any(|l| l == locale) {
                sanitized.push(locale.to_string());
            }
        }
    }
    sanitized
}

fn split_locale_key(key: &str) -> impl Iterator<Item = &str> {
    key.split(',').map(str::trim).filter(|l| !l.is_empty())
}

/// A value that may vary by locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    /// The same text for every locale
    Single(String),
    /// Locale key → text
    Localized(BTreeMap<String, String>),
}

impl Default for LocalizedText {
    fn default() -> Self {
        Self::Single(String::new())
    }
}

impl From<&str> for LocalizedText {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for LocalizedText {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<BTreeMap<String, String>> for LocalizedText {
    fn from(value: BTreeMap<String, String>) -> Self {
        Self::Localized(value)
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for LocalizedText {
    fn from(entries: [(K, V); N]) -> Self {
        Self::Localized(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl LocalizedText {
    /// Build a localized value from untyped metadata
    ///
    /// Strings, numbers and booleans become a single value; objects become a
    /// locale mapping (null entries are skipped). Anything else yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Single(s.clone())),
            Value::Number(n) => Some(Self::Single(n.to_string())),
            Value::Bool(b) => Some(Self::Single(b.to_string())),
            Value::Object(map) => Some(Self::Localized(
                map.iter()
                    .filter_map(|(k, v)| scalar_to_string(v).map(|s| (k.trim().to_string(), s)))
                    .collect(),
            )),
            Value::Null | Value::Array(_) => None,
        }
    }

    /// Whether there is no text at all
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(s) => s.is_empty(),
            Self::Localized(map) => map.values().all(String::is_empty),
        }
    }

    /// Whether the value varies by locale
    pub fn is_localized(&self) -> bool {
        matches!(self, Self::Localized(_))
    }

    /// Every locale that has a dedicated entry, `*` included
    pub fn available_locales(&self) -> Vec<String> {
        match self {
            Self::Single(_) => vec![ALL_LOCALES.to_string()],
            Self::Localized(map) => sanitize_locales(map.keys()),
        }
    }

    /// The value used when no locale is requested
    ///
    /// A single value, the `*` entry, or the only entry of the mapping.
    pub fn default_value(&self) -> Option<&str> {
        match self {
            Self::Single(s) => Some(s),
            Self::Localized(map) => map
                .get(ALL_LOCALES)
                .or_else(|| if map.len() == 1 { map.values().next() } else { None })
                .map(String::as_str),
        }
    }

    /// Look up the text for a single locale, falling back to `*`
    pub fn lookup(&self, locale: &str) -> Option<&str> {
        match self {
            Self::Single(s) => Some(s),
            Self::Localized(map) => map
                .iter()
                .find(|(key, _)| split_locale_key(key).any(|l| l == locale))
                .or_else(|| map.get_key_value(ALL_LOCALES))
                .map(|(_, v)| v.as_str()),
        }
    }

    /// Filter the value for the requested locales
    ///
    /// Each requested locale resolves to its own entry or to `*`. Requesting
    /// `*` (or nothing) selects every entry. A single match is returned as
    /// [`Filtered::Single`]; several as [`Filtered::Many`] keyed by locale.
    /// Fails with [`MbraoError::LocaleNotFound`] when nothing matches.
    pub fn filter<S: AsRef<str>>(&self, locales: &[S]) -> Result<Filtered> {
        let map = match self {
            Self::Single(s) => return Ok(Filtered::Single(s.clone())),
            Self::Localized(map) => map,
        };

        let requested = sanitize_locales(locales);
        let mut selected = BTreeMap::new();

        if requested.is_empty() || requested.iter().any(|l| l == ALL_LOCALES) {
            for (key, value) in map {
                for locale in split_locale_key(key) {
                    selected.insert(locale.to_string(), value.clone());
                }
            }
        } else {
            for locale in &requested {
                if let Some(value) = self.lookup(locale) {
                    selected.insert(locale.clone(), value.to_string());
                }
            }
        }

        match selected.len() {
            0 => Err(MbraoError::LocaleNotFound {
                requested,
                available: self.available_locales(),
            }),
            1 => Ok(Filtered::Single(
                selected.into_values().next().unwrap_or_default(),
            )),
            _ => Ok(Filtered::Many(selected)),
        }
    }

    /// Text for exactly one locale
    pub fn for_locale(&self, locale: &str) -> Result<String> {
        self.lookup(locale)
            .map(str::to_string)
            .ok_or_else(|| MbraoError::LocaleNotFound {
                requested: vec![locale.to_string()],
                available: self.available_locales(),
            })
    }

    /// Apply `f` to every text, keeping the locale keys
    pub fn map_text(&self, mut f: impl FnMut(&str) -> String) -> Self {
        match self {
            Self::Single(s) => Self::Single(f(s)),
            Self::Localized(map) => {
                Self::Localized(map.iter().map(|(k, v)| (k.clone(), f(v))).collect())
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Result of filtering a [`LocalizedText`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Filtered {
    /// Exactly one value matched
    Single(String),
    /// Locale → value, when several locales matched
    Many(BTreeMap<String, String>),
}

impl Filtered {
    /// The single value, if only one matched
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(s) => Some(s),
            Self::Many(_) => None,
        }
    }

    /// Consume into the single value, if only one matched
    pub fn into_single(self) -> Option<String> {
        match self {
            Self::Single(s) => Some(s),
            Self::Many(_) => None,
        }
    }
}

impl fmt::Display for Filtered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(s) => f.write_str(s),
            Self::Many(map) => {
                let mut first = true;
                for (locale, value) in map {
                    if !first {
                        f.write_str("\n")?;
                    }
                    write!(f, "[{locale}] {value}")?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn greeting() -> LocalizedText {
        LocalizedText::from([("en", "Hi"), ("*", "Hola")])
    }

    #[test]
    fn test_filter_falls_back_to_wildcard() {
        let title = greeting();
        assert_eq!(title.filter(&["fr"]).unwrap(), Filtered::Single("Hola".into()));
        assert_eq!(title.filter(&["en"]).unwrap(), Filtered::Single("Hi".into()));
    }

    #[test]
    fn test_filter_unlisted_locale_without_wildcard() {
        let title = LocalizedText::from([("en", "Hi"), ("it", "Ciao")]);
        let err = title.filter(&["fr"]).unwrap_err();
        match err {
            MbraoError::LocaleNotFound { requested, available } => {
                assert_eq!(requested, vec!["fr"]);
                assert_eq!(available, vec!["en", "it"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_filter_multiple_locales() {
        let title = LocalizedText::from([("en", "Hi"), ("it", "Ciao")]);
        let filtered = title.filter(&["en", "it", "fr"]).unwrap();

        let Filtered::Many(map) = filtered else {
            panic!("expected several values");
        };
        assert_eq!(map.len(), 2);
        assert_eq!(map["en"], "Hi");
        assert_eq!(map["it"], "Ciao");
    }

    #[test]
    fn test_filter_comma_separated_keys() {
        let body = LocalizedText::from([("en,it", "Shared"), ("fr", "Partagé")]);
        assert_eq!(body.for_locale("it").unwrap(), "Shared");
        assert_eq!(body.for_locale("fr").unwrap(), "Partagé");
        assert_eq!(body.available_locales(), vec!["en", "it", "fr"]);
    }

    #[test]
    fn test_filter_wildcard_request_selects_everything() {
        let title = greeting();
        let Filtered::Many(map) = title.filter(&["*"]).unwrap() else {
            panic!("expected several values");
        };
        assert_eq!(map["en"], "Hi");
        assert_eq!(map["*"], "Hola");
    }

    #[test]
    fn test_single_value_ignores_locales() {
        let title = LocalizedText::from("Hello");
        assert_eq!(title.filter(&["jp"]).unwrap().as_single(), Some("Hello"));
        assert_eq!(title.default_value(), Some("Hello"));
    }

    #[test]
    fn test_from_value() {
        assert_eq!(
            LocalizedText::from_value(&json!("Title")),
            Some(LocalizedText::from("Title"))
        );
        assert_eq!(
            LocalizedText::from_value(&json!({"en": "Title", "it": null})),
            Some(LocalizedText::from([("en", "Title")]))
        );
        assert_eq!(LocalizedText::from_value(&json!(["a"])), None);
        assert_eq!(LocalizedText::from_value(&Value::Null), None);
    }

    #[test]
    fn test_sanitize_locales() {
        assert_eq!(
            sanitize_locales(["en, it", "en", " ", "fr"]),
            vec!["en", "it", "fr"]
        );
    }
}
