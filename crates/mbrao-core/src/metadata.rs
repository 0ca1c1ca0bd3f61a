//! Metadata mappings and the normalization applied to them
//!
//! Parsing engines produce a [`Metadata`] mapping from the raw metadata
//! section. The helpers here turn loosely-typed values (YAML scalars, comma
//! separated lists, date strings) into the shapes [`Content::create`] expects.
//!
//! [`Content::create`]: crate::content::Content::create

use crate::error::{MbraoError, Result};
use crate::validation::{is_email, is_url};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// String-keyed metadata mapping
pub type Metadata = BTreeMap<String, Value>;

/// Keys holding timestamps
pub const DATE_KEYS: &[&str] = &["date", "created_at", "updated_at"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Truthiness of an untyped option value
///
/// Only `null` and `false` are false; numbers, strings and collections are
/// true regardless of their contents.
pub fn truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

/// Interpret a metadata flag such as `published: yes`
pub fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "on" | "1" => Some(true),
            "false" | "no" | "n" | "off" | "0" => Some(false),
            _ => None,
        },
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parse a timestamp from a string or a unix epoch number
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (with optional offset) and plain
/// `YYYY-MM-DD` dates. Naive values are taken as UTC.
pub fn parse_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_datetime_str(s),
        Value::Number(n) => n.as_i64().and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        _ => None,
    }
}

fn parse_datetime_str(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Split a tag value into individual tags
///
/// Strings are split on commas; arrays are flattened the same way. Empty
/// entries are dropped. Duplicates are kept, [`TagSet`] removes them.
///
/// [`TagSet`]: crate::content::TagSet
pub fn parse_tags(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Number(n) => vec![n.to_string()],
        Value::Array(items) => items.iter().flat_map(parse_tags).collect(),
        _ => Vec::new(),
    }
}

/// Normalize a freshly parsed metadata mapping
///
/// - keys are trimmed
/// - `tags` becomes an array of strings
/// - timestamps become RFC 3339 strings (unparsable ones are kept as-is)
/// - `author.email` / `author.website` are dropped when invalid
pub fn normalize_metadata(raw: Metadata) -> Metadata {
    let mut normalized = Metadata::new();

    for (key, value) in raw {
        let key = key.trim().to_string();
        let value = match key.as_str() {
            "tags" => Value::Array(parse_tags(&value).into_iter().map(Value::String).collect()),
            k if DATE_KEYS.contains(&k) => match parse_datetime(&value) {
                Some(dt) => Value::String(dt.to_rfc3339()),
                None => {
                    if !value.is_null() {
                        tracing::warn!(key = %k, value = %value, "Unparsable date in metadata, keeping raw value");
                    }
                    value
                }
            },
            "author" => normalize_author(value),
            _ => value,
        };
        normalized.insert(key, value);
    }

    normalized
}

fn normalize_author(value: Value) -> Value {
    let Value::Object(mut author) = value else {
        return value;
    };

    let invalid_email = author
        .get("email")
        .is_some_and(|email| !email.as_str().is_some_and(is_email));
    if invalid_email {
        if let Some(email) = author.remove("email") {
            tracing::warn!(email = %email, "Dropping invalid author email");
        }
    }

    let invalid_website = author
        .get("website")
        .is_some_and(|site| !site.as_str().is_some_and(is_url));
    if invalid_website {
        if let Some(website) = author.remove("website") {
            tracing::warn!(website = %website, "Dropping invalid author website");
        }
    }

    Value::Object(author)
}

/// Convert a YAML document into a metadata mapping
///
/// An empty document yields an empty mapping; any other non-mapping document
/// is rejected.
pub fn metadata_from_yaml(document: serde_yaml::Value) -> Result<Metadata> {
    match document {
        serde_yaml::Value::Null => Ok(Metadata::new()),
        serde_yaml::Value::Mapping(mapping) => Ok(mapping
            .into_iter()
            .map(|(k, v)| (yaml_key_to_string(&k), yaml_to_json(v)))
            .collect()),
        serde_yaml::Value::Tagged(tagged) => metadata_from_yaml(tagged.value),
        other => Err(MbraoError::invalid_metadata(format!(
            "expected a mapping, found {}",
            yaml_kind(&other)
        ))),
    }
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

fn yaml_key_to_string(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => Value::Object(
            mapping
                .into_iter()
                .map(|(k, v)| (yaml_key_to_string(&k), yaml_to_json(v)))
                .collect::<Map<String, Value>>(),
        ),
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn test_truthy_follows_loose_semantics() {
        assert!(truthy(&json!(2)));
        assert!(truthy(&json!(0)));
        assert!(truthy(&json!("")));
        assert!(!truthy(&json!(false)));
        assert!(!truthy(&Value::Null));
    }

    #[test]
    fn test_parse_datetime_formats() {
        let dt = parse_datetime(&json!("2013-06-10 10:20:30")).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2013, 6, 10));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (10, 20, 30));

        let dt = parse_datetime(&json!("2013-06-10T10:20:30+02:00")).unwrap();
        assert_eq!(dt.hour(), 8);

        let dt = parse_datetime(&json!("2013-06-10")).unwrap();
        assert_eq!(dt.hour(), 0);

        assert!(parse_datetime(&json!(1_370_859_630)).is_some());
        assert!(parse_datetime(&json!("not a date")).is_none());
        assert!(parse_datetime(&json!([])).is_none());
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags(&json!("a, b,, c")), vec!["a", "b", "c"]);
        assert_eq!(parse_tags(&json!(["a", "b, c", 3])), vec!["a", "b", "c", "3"]);
        assert!(parse_tags(&Value::Null).is_empty());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool(&json!("yes")), Some(true));
        assert_eq!(parse_bool(&json!("off")), Some(false));
        assert_eq!(parse_bool(&json!(0)), Some(false));
        assert_eq!(parse_bool(&json!("maybe")), None);
    }

    #[test]
    fn test_normalize_metadata() {
        let mut raw = Metadata::new();
        raw.insert(" tags ".to_string(), json!("rust, parsing"));
        raw.insert("date".to_string(), json!("2013-06-10"));
        raw.insert(
            "author".to_string(),
            json!({"name": "Shogun", "email": "invalid", "website": "http://cowtech.it"}),
        );
        raw.insert("custom".to_string(), json!(42));

        let normalized = normalize_metadata(raw);

        assert_eq!(normalized["tags"], json!(["rust", "parsing"]));
        assert_eq!(normalized["date"], json!("2013-06-10T00:00:00+00:00"));
        assert_eq!(
            normalized["author"],
            json!({"name": "Shogun", "website": "http://cowtech.it"})
        );
        assert_eq!(normalized["custom"], json!(42));
    }

    #[test]
    fn test_metadata_from_yaml() {
        let doc: serde_yaml::Value = serde_yaml::from_str("title: Hello\n1: one\ntrue: yes").unwrap();
        let metadata = metadata_from_yaml(doc).unwrap();
        assert_eq!(metadata["title"], json!("Hello"));
        assert_eq!(metadata["1"], json!("one"));
        assert_eq!(metadata["true"], json!("yes"));

        let empty: serde_yaml::Value = serde_yaml::from_str("").unwrap();
        assert!(metadata_from_yaml(empty).unwrap().is_empty());

        let list: serde_yaml::Value = serde_yaml::from_str("- a\n- b").unwrap();
        assert!(matches!(
            metadata_from_yaml(list),
            Err(MbraoError::InvalidMetadata(_))
        ));
    }
}
