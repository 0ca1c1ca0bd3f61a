//! `plain_text` parsing engine
//!
//! Input may start with a metadata section in either form:
//!
//! ```text
//! {{metadata}}
//! title: Hello
//! {{/metadata}}
//! Body
//! ```
//!
//! ```text
//! ---
//! title: Hello
//! ---
//! Body
//! ```
//!
//! The metadata is YAML. The body may contain locale sections,
//! `{{content: en,it}}...{{/content}}`, selected by
//! [`filter_content`](PlainTextEngine::filter_content); `{{content: !it}}`
//! matches every locale except the listed ones.

use crate::content::Content;
use crate::engine::ParsingEngine;
use crate::error::{MbraoError, Result};
use crate::locale::{sanitize_locales, Filtered, LocalizedText, ALL_LOCALES};
use crate::metadata::{metadata_from_yaml, normalize_metadata, Metadata};
use crate::options::EngineParseOptions;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn metadata_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A\s*\{\{metadata\}\}(.*?)\{\{/metadata\}\}(?:\r?\n)?")
            .expect("metadata block regex is valid")
    })
}

fn front_matter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A\s*---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)")
            .expect("front matter regex is valid")
    })
}

fn content_section_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\{\{content:\s*([^}]*)\}\}(.*?)\{\{/content\}\}")
            .expect("content section regex is valid")
    })
}

/// Parsing engine for text with a YAML metadata header
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextEngine;

impl PlainTextEngine {
    /// Registration name
    pub const NAME: &'static str = "plain_text";

    /// Create the engine
    pub fn new() -> Self {
        Self
    }

    /// Keep the locale sections of `text` that match `locales`
    ///
    /// Text outside sections is always kept. An empty request or `*` keeps
    /// every section.
    pub fn filter_sections(text: &str, locales: &[String]) -> String {
        let all = locales.is_empty() || locales.iter().any(|l| l == ALL_LOCALES);

        content_section_regex()
            .replace_all(text, |caps: &Captures| {
                let body = caps.get(2).map_or("", |m| m.as_str());
                let selector = caps.get(1).map_or("", |m| m.as_str()).trim();

                if all || section_matches(selector, locales) {
                    body.to_string()
                } else {
                    String::new()
                }
            })
            .into_owned()
    }
}

fn section_matches(selector: &str, requested: &[String]) -> bool {
    let (negated, list) = match selector.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, selector),
    };
    let section_locales = sanitize_locales([list]);

    if negated {
        !requested.iter().any(|l| section_locales.contains(l))
    } else {
        section_locales
            .iter()
            .any(|l| l == ALL_LOCALES || requested.contains(l))
    }
}

impl ParsingEngine for PlainTextEngine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn separate_components(
        &self,
        raw: &str,
        _options: &EngineParseOptions,
    ) -> Result<(String, String)> {
        let captures = metadata_block_regex()
            .captures(raw)
            .or_else(|| front_matter_regex().captures(raw));

        match captures {
            Some(caps) => {
                let whole = caps.get(0).map_or(0..0, |m| m.range());
                let metadata = caps.get(1).map_or("", |m| m.as_str());
                Ok((metadata.to_string(), raw[whole.end..].to_string()))
            }
            None => Ok((String::new(), raw.to_string())),
        }
    }

    fn parse_metadata(&self, raw: &str, _options: &EngineParseOptions) -> Result<Metadata> {
        if raw.trim().is_empty() {
            return Ok(Metadata::new());
        }

        let document: serde_yaml::Value = serde_yaml::from_str(raw)
            .map_err(|e| MbraoError::invalid_metadata(format!("invalid YAML: {}", e)))?;
        let metadata = metadata_from_yaml(document)?;

        tracing::debug!(keys = metadata.len(), "Parsed plain text metadata");
        Ok(normalize_metadata(metadata))
    }

    fn filter_content(
        &self,
        content: &Content,
        locales: &[String],
        _options: &EngineParseOptions,
    ) -> Result<LocalizedText> {
        let requested = sanitize_locales(locales);
        let all = requested.is_empty() || requested.iter().any(|l| l == ALL_LOCALES);

        match content.body_for(requested.as_slice())? {
            Filtered::Single(body) if all || requested.len() == 1 => Ok(LocalizedText::Single(
                Self::filter_sections(&body, &requested),
            )),
            Filtered::Single(body) => Ok(LocalizedText::Localized(
                requested
                    .iter()
                    .map(|locale| {
                        let filtered = Self::filter_sections(&body, std::slice::from_ref(locale));
                        (locale.clone(), filtered)
                    })
                    .collect(),
            )),
            Filtered::Many(bodies) => Ok(LocalizedText::Localized(
                bodies
                    .into_iter()
                    .map(|(locale, body)| {
                        let filtered = Self::filter_sections(&body, std::slice::from_ref(&locale));
                        (locale, filtered)
                    })
                    .collect::<BTreeMap<_, _>>(),
            )),
        }
    }
}
