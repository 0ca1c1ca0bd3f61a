//! The normalized content record produced by parsing

use crate::error::{MbraoError, Result};
use crate::locale::{sanitize_locales, Filtered, LocalizedText, ALL_LOCALES};
use crate::metadata::{parse_bool, parse_datetime, parse_tags, Metadata};
use crate::validation::{is_email, is_url};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// Metadata keys that map onto [`Content`] fields
pub const CONTENT_KEYS: &[&str] = &[
    "uid",
    "locales",
    "title",
    "summary",
    "body",
    "more",
    "tags",
    "author",
    "date",
    "published",
    "created_at",
    "updated_at",
];

/// Ordered set of tags
///
/// Keeps insertion order and ignores duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag, returning whether it was new
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if tag.is_empty() || self.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    /// Check whether a tag is present
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no tags
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the tags as a slice
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl<S: Into<String>> Extend<S> for TagSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for tag in iter {
            self.insert(tag);
        }
    }
}

/// Author of a piece of content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// Stable identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Display name
    pub name: String,
    /// Contact email, only kept when valid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Personal website, only kept when valid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Avatar URL, only kept when valid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Every other author field
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl Author {
    /// Create an author with just a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build an author from untyped metadata
    ///
    /// A string is taken as the name. A mapping is read field by field;
    /// invalid `email`, `website` and `image` values are dropped.
    pub fn create(value: &Value) -> Option<Self> {
        match value {
            Value::String(name) if !name.trim().is_empty() => Some(Self::new(name.trim())),
            Value::Object(map) => {
                let mut author = Self::default();
                for (key, value) in map {
                    match key.as_str() {
                        "uid" => author.uid = value_to_string(value),
                        "name" => author.name = value_to_string(value).unwrap_or_default(),
                        "email" => author.email = validated(key, value, is_email),
                        "website" => author.website = validated(key, value, is_url),
                        "image" => author.image = validated(key, value, is_url),
                        _ => {
                            author.metadata.insert(key.clone(), value.clone());
                        }
                    }
                }
                Some(author)
            }
            _ => None,
        }
    }
}

fn validated(field: &str, value: &Value, check: fn(&str) -> bool) -> Option<String> {
    match value.as_str() {
        Some(s) if check(s) => Some(s.to_string()),
        _ => {
            if !value.is_null() {
                tracing::warn!(field = %field, value = %value, "Dropping invalid author field");
            }
            None
        }
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A parsed piece of content
///
/// Built once by a parsing engine through [`Content::create`]. Localized
/// fields are read through the `*_for` accessors, which check that the
/// content is enabled for the requested locales before filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Stable identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Locales the content is enabled for; empty means every locale
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locales: Vec<String>,
    /// Title
    #[serde(default)]
    pub title: LocalizedText,
    /// Short summary
    #[serde(default, skip_serializing_if = "LocalizedText::is_empty")]
    pub summary: LocalizedText,
    /// Main body
    #[serde(default)]
    pub body: LocalizedText,
    /// Text of a "read more" link
    #[serde(default, skip_serializing_if = "LocalizedText::is_empty")]
    pub more: LocalizedText,
    /// Tags
    #[serde(default, skip_serializing_if = "TagSet::is_empty")]
    pub tags: TagSet,
    /// Author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    /// Publication date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    /// Whether the content is published
    #[serde(default = "default_published")]
    pub published: bool,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Every metadata field without a dedicated slot
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,

    /// Memoized rendered form
    #[serde(skip)]
    rendered: OnceLock<String>,
}

fn default_published() -> bool {
    true
}

impl Default for Content {
    fn default() -> Self {
        Self {
            uid: None,
            locales: Vec::new(),
            title: LocalizedText::default(),
            summary: LocalizedText::default(),
            body: LocalizedText::default(),
            more: LocalizedText::default(),
            tags: TagSet::new(),
            author: None,
            date: None,
            published: true,
            created_at: None,
            updated_at: None,
            metadata: Metadata::new(),
            rendered: OnceLock::new(),
        }
    }
}

impl Content {
    /// Create an empty, published content
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a content from normalized metadata and a body
    ///
    /// Recognized keys (see [`CONTENT_KEYS`]) fill the dedicated fields;
    /// every other key lands in [`Content::metadata`]. A `body` key in the
    /// metadata is ignored in favor of the `body` argument.
    pub fn create(metadata: Metadata, body: impl Into<String>) -> Self {
        let mut content = Self::new();
        content.body = LocalizedText::Single(body.into());

        for (key, value) in metadata {
            match key.as_str() {
                "uid" => content.uid = value_to_string(&value),
                "locales" => content.locales = sanitize_locales(parse_tags(&value)),
                "title" => content.title = LocalizedText::from_value(&value).unwrap_or_default(),
                "summary" => {
                    content.summary = LocalizedText::from_value(&value).unwrap_or_default()
                }
                "more" => content.more = LocalizedText::from_value(&value).unwrap_or_default(),
                "tags" => content.tags = parse_tags(&value).into_iter().collect(),
                "author" => content.author = Author::create(&value),
                "date" => content.date = parse_datetime(&value),
                "published" => content.published = parse_bool(&value).unwrap_or(true),
                "created_at" => content.created_at = parse_datetime(&value),
                "updated_at" => content.updated_at = parse_datetime(&value),
                "body" => {
                    tracing::debug!("Ignoring body key in metadata");
                }
                _ => {
                    content.metadata.insert(key, value);
                }
            }
        }

        content
    }

    /// Whether the content is enabled for at least one of the locales
    ///
    /// Content without locales, or enabled for `*`, is enabled everywhere;
    /// an empty request always succeeds.
    pub fn is_enabled_for_locales<S: AsRef<str>>(&self, locales: &[S]) -> bool {
        let requested = sanitize_locales(locales);
        requested.is_empty()
            || self.locales.is_empty()
            || self.locales.iter().any(|l| l == ALL_LOCALES)
            || requested
                .iter()
                .any(|l| l == ALL_LOCALES || self.locales.contains(l))
    }

    fn ensure_enabled<S: AsRef<str>>(&self, locales: &[S]) -> Result<()> {
        if self.is_enabled_for_locales(locales) {
            Ok(())
        } else {
            Err(MbraoError::UnavailableLocalization {
                requested: sanitize_locales(locales),
                enabled: self.locales.clone(),
            })
        }
    }

    /// Title filtered for the locales
    pub fn title_for<S: AsRef<str>>(&self, locales: &[S]) -> Result<Filtered> {
        self.ensure_enabled(locales)?;
        self.title.filter(locales)
    }

    /// Summary filtered for the locales
    pub fn summary_for<S: AsRef<str>>(&self, locales: &[S]) -> Result<Filtered> {
        self.ensure_enabled(locales)?;
        self.summary.filter(locales)
    }

    /// Body filtered for the locales
    pub fn body_for<S: AsRef<str>>(&self, locales: &[S]) -> Result<Filtered> {
        self.ensure_enabled(locales)?;
        self.body.filter(locales)
    }

    /// "Read more" text filtered for the locales
    pub fn more_for<S: AsRef<str>>(&self, locales: &[S]) -> Result<Filtered> {
        self.ensure_enabled(locales)?;
        self.more.filter(locales)
    }

    /// Whether the content is published and not dated in the future
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.published && self.date.map_or(true, |date| date <= now)
    }

    /// Drop the body, keeping everything else
    pub fn clear_body(&mut self) {
        self.body = LocalizedText::default();
        self.rendered = OnceLock::new();
    }

    /// Drop every metadata-derived field, keeping only the body
    pub fn clear_metadata(&mut self) {
        let body = std::mem::take(&mut self.body);
        *self = Self {
            body,
            ..Self::default()
        };
    }

    /// The memoized rendered form, if any
    pub fn rendered(&self) -> Option<&str> {
        self.rendered.get().map(String::as_str)
    }

    /// Memoize the rendered form on first call
    ///
    /// `render` only runs if nothing has been memoized yet.
    pub fn rendered_or_try_init(&self, render: impl FnOnce() -> Result<String>) -> Result<&str> {
        if let Some(rendered) = self.rendered.get() {
            return Ok(rendered);
        }
        let rendered = render()?;
        Ok(self.rendered.get_or_init(|| rendered))
    }
}
