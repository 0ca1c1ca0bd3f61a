//! Engine contracts
//!
//! Parsing engines turn raw input into [`Content`]; rendering engines turn
//! [`Content`] into output. Both are looked up by [`EngineName`] within their
//! [`EngineRole`] namespace, so the same short name can mean different
//! engines per role.

use crate::content::Content;
use crate::error::{MbraoError, Result};
use crate::locale::LocalizedText;
use crate::metadata::Metadata;
use crate::options::{EngineParseOptions, EngineRenderOptions, Locals};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Capability namespace of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineRole {
    /// Turns raw input into content
    Parsing,
    /// Turns content into output
    Rendering,
}

impl EngineRole {
    /// Lowercase role name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parsing => "parsing",
            Self::Rendering => "rendering",
        }
    }
}

impl fmt::Display for EngineRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical, snake_case engine name
///
/// `PlainText`, `plain-text`, `plain text` and `:plain_text` all become
/// `plain_text`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EngineName(String);

impl EngineName {
    /// Canonicalize a name
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(canonicalize(name.as_ref()))
    }

    /// Canonicalize a name, treating blank input as absent
    pub fn parse(name: impl AsRef<str>) -> Option<Self> {
        let name = Self::new(name);
        if name.0.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Canonical name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// CamelCase type name derived from the canonical name (`PlainText`)
    pub fn type_name(&self) -> String {
        self.0
            .split('_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect()
    }
}

fn canonicalize(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches(':');
    let mut out = String::with_capacity(trimmed.len() + 4);
    let mut prev_lower_or_digit = false;
    let mut prev_upper = false;
    let mut chars = trimmed.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_uppercase() {
            // `HTMLPipeline`: the last capital of a run starts a new word
            let ends_acronym = prev_upper && chars.peek().is_some_and(|n| n.is_lowercase());
            if prev_lower_or_digit || ends_acronym {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_lower_or_digit = false;
            prev_upper = true;
        } else if c == '-' || c == '_' || c.is_whitespace() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower_or_digit = false;
            prev_upper = false;
        } else {
            out.push(c);
            prev_lower_or_digit = c.is_lowercase() || c.is_ascii_digit();
            prev_upper = false;
        }
    }

    out.trim_end_matches('_').to_string()
}

impl fmt::Display for EngineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EngineName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EngineName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<EngineName> for String {
    fn from(value: EngineName) -> Self {
        value.0
    }
}

impl AsRef<str> for EngineName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Contract of every parsing engine
///
/// Engines either implement the two pipeline stages
/// ([`separate_components`](Self::separate_components) and
/// [`parse_metadata`](Self::parse_metadata)) and inherit the default
/// [`parse`](Self::parse), or override `parse` with a single-pass
/// implementation. Stages an engine does not provide report
/// [`MbraoError::Unimplemented`].
///
/// Engine instances are cached and shared across threads; any internal state
/// must be synchronized by the engine itself.
pub trait ParsingEngine: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Split raw input into the unparsed metadata section and the body
    ///
    /// Without a metadata section the first element is empty and the body is
    /// the whole input.
    fn separate_components(
        &self,
        _raw: &str,
        _options: &EngineParseOptions,
    ) -> Result<(String, String)> {
        Err(MbraoError::unimplemented(self.name(), "separate_components"))
    }

    /// Turn the raw metadata section into a normalized mapping
    fn parse_metadata(&self, _raw: &str, _options: &EngineParseOptions) -> Result<Metadata> {
        Err(MbraoError::unimplemented(self.name(), "parse_metadata"))
    }

    /// Filter a content body by locale using engine-specific markers
    fn filter_content(
        &self,
        _content: &Content,
        _locales: &[String],
        _options: &EngineParseOptions,
    ) -> Result<LocalizedText> {
        Err(MbraoError::unimplemented(self.name(), "filter_content"))
    }

    /// Parse raw input into content
    ///
    /// With `metadata` disabled the whole input becomes the body and no
    /// separation happens; with `content` disabled the body is discarded
    /// after separation.
    fn parse(&self, raw: &str, options: &EngineParseOptions) -> Result<Content> {
        let (metadata_raw, body) = if options.metadata {
            self.separate_components(raw, options)?
        } else {
            (String::new(), raw.to_string())
        };

        let metadata = if metadata_raw.trim().is_empty() {
            Metadata::new()
        } else {
            self.parse_metadata(&metadata_raw, options)?
        };

        let body = if options.content { body } else { String::new() };
        Ok(Content::create(metadata, body))
    }
}

/// Contract of every rendering engine
pub trait RenderingEngine: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Render content, interpolating `locals` where the engine supports it
    fn render(
        &self,
        content: &Content,
        options: &EngineRenderOptions,
        locals: &Locals,
    ) -> Result<String>;
}

/// An engine returned by the registry, tagged with its role
#[derive(Clone)]
pub enum ResolvedEngine {
    /// Parsing engine
    Parsing(Arc<dyn ParsingEngine>),
    /// Rendering engine
    Rendering(Arc<dyn RenderingEngine>),
}

impl ResolvedEngine {
    /// Role of the engine
    pub fn role(&self) -> EngineRole {
        match self {
            Self::Parsing(_) => EngineRole::Parsing,
            Self::Rendering(_) => EngineRole::Rendering,
        }
    }

    /// Engine name
    pub fn name(&self) -> &str {
        match self {
            Self::Parsing(engine) => engine.name(),
            Self::Rendering(engine) => engine.name(),
        }
    }

    /// The parsing engine, if this is one
    pub fn into_parsing(self) -> Option<Arc<dyn ParsingEngine>> {
        match self {
            Self::Parsing(engine) => Some(engine),
            Self::Rendering(_) => None,
        }
    }

    /// The rendering engine, if this is one
    pub fn into_rendering(self) -> Option<Arc<dyn RenderingEngine>> {
        match self {
            Self::Rendering(engine) => Some(engine),
            Self::Parsing(_) => None,
        }
    }
}

impl fmt::Debug for ResolvedEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedEngine")
            .field("role", &self.role())
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("plain_text", "plain_text")]
    #[test_case("PlainText", "plain_text")]
    #[test_case("plain-text", "plain_text")]
    #[test_case(" plain text ", "plain_text")]
    #[test_case(":plain_text", "plain_text")]
    #[test_case("HTMLPipeline", "html_pipeline")]
    #[test_case("HTML", "html")]
    #[test_case("ParseHTML", "parse_html")]
    #[test_case("MyHTMLEngine", "my_html_engine")]
    #[test_case("html_pipeline", "html_pipeline")]
    #[test_case("Markdown2", "markdown2")]
    fn test_canonical_names(input: &str, expected: &str) {
        assert_eq!(EngineName::new(input).as_str(), expected);
    }

    #[test]
    fn test_blank_names_are_absent() {
        assert_eq!(EngineName::parse(""), None);
        assert_eq!(EngineName::parse("  "), None);
        assert_eq!(EngineName::parse(":"), None);
        assert_eq!(
            EngineName::parse("PlainText"),
            Some(EngineName::new("plain_text"))
        );
    }

    #[test]
    fn test_type_name() {
        assert_eq!(EngineName::new("plain_text").type_name(), "PlainText");
        assert_eq!(EngineName::new("html_pipeline").type_name(), "HtmlPipeline");
    }

    struct StagesOnly;

    impl ParsingEngine for StagesOnly {
        fn name(&self) -> &str {
            "stages_only"
        }
    }

    #[test]
    fn test_missing_stage_is_reported() {
        let err = StagesOnly
            .parse("anything", &EngineParseOptions::new("stages_only"))
            .unwrap_err();
        assert!(matches!(
            err,
            MbraoError::Unimplemented {
                capability: "separate_components",
                ..
            }
        ));

        let err = StagesOnly
            .filter_content(&Content::new(), &[], &EngineParseOptions::new("stages_only"))
            .unwrap_err();
        assert!(matches!(
            err,
            MbraoError::Unimplemented {
                capability: "filter_content",
                ..
            }
        ));
    }
}
