//! Option types for parse and render calls
//!
//! Callers build [`ParseOptions`] / [`RenderOptions`] with every field
//! optional. The parser fills the gaps from its configuration and hands the
//! engines the sanitized [`EngineParseOptions`] / [`EngineRenderOptions`].

use crate::engine::EngineName;
use crate::metadata::{truthy, Metadata};
use serde_json::Value;
use std::collections::BTreeMap;

/// Values a rendering engine may interpolate
pub type Locals = BTreeMap<String, Value>;

/// Options of a parse call as given by the caller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOptions {
    /// Whether to extract metadata (default: true)
    pub metadata: Option<bool>,
    /// Whether to keep the body (default: true)
    pub content: Option<bool>,
    /// Parsing engine (default: the parser's configured engine)
    pub engine: Option<EngineName>,
    /// Engine-specific options, passed through untouched
    pub extra: Metadata,
}

impl ParseOptions {
    /// Options with every field defaulted
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific parsing engine
    pub fn with_engine(mut self, engine: impl Into<EngineName>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    /// Enable or disable metadata extraction
    pub fn with_metadata(mut self, metadata: bool) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Keep or discard the body
    pub fn with_content(mut self, content: bool) -> Self {
        self.content = Some(content);
        self
    }

    /// Add an engine-specific option
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Read options from an untyped mapping
    ///
    /// `metadata` and `content` are coerced by truthiness (so `content: 2` is
    /// `true`), `engine` is canonicalized, and every other key is kept as an
    /// engine-specific option. Non-mapping values yield the defaults.
    pub fn from_value(value: &Value) -> Self {
        let mut options = Self::new();
        let Value::Object(map) = value else {
            return options;
        };

        for (key, value) in map {
            match key.trim() {
                "metadata" => options.metadata = Some(truthy(value)),
                "content" => options.content = Some(truthy(value)),
                "engine" => options.engine = value.as_str().and_then(EngineName::parse),
                other => {
                    options.extra.insert(other.to_string(), value.clone());
                }
            }
        }

        options
    }

    /// Fill the gaps, using `default_engine` when no engine was given
    pub fn sanitize(self, default_engine: &EngineName) -> EngineParseOptions {
        EngineParseOptions {
            metadata: self.metadata.unwrap_or(true),
            content: self.content.unwrap_or(true),
            engine: self.engine.unwrap_or_else(|| default_engine.clone()),
            extra: self.extra,
        }
    }
}

/// Sanitized parse options, as seen by parsing engines
#[derive(Debug, Clone, PartialEq)]
pub struct EngineParseOptions {
    /// Whether to extract metadata
    pub metadata: bool,
    /// Whether to keep the body
    pub content: bool,
    /// Parsing engine handling the call
    pub engine: EngineName,
    /// Engine-specific options
    pub extra: Metadata,
}

impl EngineParseOptions {
    /// Default options for an engine
    pub fn new(engine: impl Into<EngineName>) -> Self {
        ParseOptions::new().sanitize(&engine.into())
    }

    /// Engine-specific option
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// String-keyed view: `metadata`, `content`, `engine` plus every extra
    pub fn to_map(&self) -> Metadata {
        let mut map = self.extra.clone();
        map.insert("metadata".to_string(), Value::Bool(self.metadata));
        map.insert("content".to_string(), Value::Bool(self.content));
        map.insert(
            "engine".to_string(),
            Value::String(self.engine.as_str().to_string()),
        );
        map
    }
}

/// Options of a render call as given by the caller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    /// Rendering engine (default: the parser's configured engine)
    pub engine: Option<EngineName>,
    /// Locale to render the body for
    pub locale: Option<String>,
    /// Engine-specific options, passed through untouched
    pub extra: Metadata,
}

impl RenderOptions {
    /// Options with every field defaulted
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific rendering engine
    pub fn with_engine(mut self, engine: impl Into<EngineName>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    /// Render the body for a locale
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Add an engine-specific option
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Read options from an untyped mapping
    pub fn from_value(value: &Value) -> Self {
        let mut options = Self::new();
        let Value::Object(map) = value else {
            return options;
        };

        for (key, value) in map {
            match key.trim() {
                "engine" => options.engine = value.as_str().and_then(EngineName::parse),
                "locale" => {
                    options.locale = value
                        .as_str()
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .map(str::to_string)
                }
                other => {
                    options.extra.insert(other.to_string(), value.clone());
                }
            }
        }

        options
    }

    /// Fill the gaps, using `default_engine` when no engine was given
    pub fn sanitize(self, default_engine: &EngineName) -> EngineRenderOptions {
        EngineRenderOptions {
            engine: self.engine.unwrap_or_else(|| default_engine.clone()),
            locale: self.locale,
            default_locale: None,
            extra: self.extra,
        }
    }
}

/// Sanitized render options, as seen by rendering engines
#[derive(Debug, Clone, PartialEq)]
pub struct EngineRenderOptions {
    /// Rendering engine handling the call
    pub engine: EngineName,
    /// Locale to render the body for
    pub locale: Option<String>,
    /// Caller's default locale, used when `locale` is absent
    pub default_locale: Option<String>,
    /// Engine-specific options
    pub extra: Metadata,
}

impl EngineRenderOptions {
    /// Default options for an engine
    pub fn new(engine: impl Into<EngineName>) -> Self {
        RenderOptions::new().sanitize(&engine.into())
    }

    /// Engine-specific option
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Requested locale, falling back to the default locale
    pub fn effective_locale(&self) -> Option<&str> {
        self.locale.as_deref().or(self.default_locale.as_deref())
    }

    /// String-keyed view: `engine`, `locale` when set, plus every extra
    pub fn to_map(&self) -> Metadata {
        let mut map = self.extra.clone();
        map.insert(
            "engine".to_string(),
            Value::String(self.engine.as_str().to_string()),
        );
        if let Some(locale) = &self.locale {
            map.insert("locale".to_string(), Value::String(locale.clone()));
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_options_defaults() {
        let options = ParseOptions::new().sanitize(&EngineName::new("plain_text"));
        assert_eq!(
            serde_json::to_value(options.to_map()).unwrap(),
            json!({"metadata": true, "content": true, "engine": "plain_text"})
        );
    }

    #[test]
    fn test_parse_options_from_loose_mapping() {
        let options = ParseOptions::from_value(&json!({
            "engine": "BlankParser",
            "content": 2,
            "other": "OK",
        }))
        .sanitize(&EngineName::new("plain_text"));

        assert_eq!(
            serde_json::to_value(options.to_map()).unwrap(),
            json!({"metadata": true, "content": true, "engine": "blank_parser", "other": "OK"})
        );

        let options = ParseOptions::from_value(&json!({"metadata": false, "content": null}))
            .sanitize(&EngineName::new("plain_text"));
        assert!(!options.metadata);
        assert!(!options.content);
    }

    #[test]
    fn test_parse_options_non_mapping() {
        assert_eq!(ParseOptions::from_value(&json!([1, 2])), ParseOptions::new());
    }

    #[test]
    fn test_render_options() {
        let options = RenderOptions::new().sanitize(&EngineName::new("html_pipeline"));
        assert_eq!(
            serde_json::to_value(options.to_map()).unwrap(),
            json!({"engine": "html_pipeline"})
        );

        let options = RenderOptions::from_value(&json!({"engine": "blank_rendered", "locale": "it"}))
            .sanitize(&EngineName::new("html_pipeline"));
        assert_eq!(options.engine.as_str(), "blank_rendered");
        assert_eq!(options.locale.as_deref(), Some("it"));
    }

    #[test]
    fn test_render_options_default_locale() {
        let mut options = RenderOptions::new().sanitize(&EngineName::new("html_pipeline"));
        assert_eq!(options.effective_locale(), None);

        options.default_locale = Some("it".to_string());
        assert_eq!(options.effective_locale(), Some("it"));
        assert_eq!(
            serde_json::to_value(options.to_map()).unwrap(),
            json!({"engine": "html_pipeline"})
        );

        options.locale = Some("en".to_string());
        assert_eq!(options.effective_locale(), Some("en"));
    }
}
