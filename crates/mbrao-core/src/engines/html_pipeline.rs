//! `html_pipeline` rendering engine
//!
//! Renders the content body from Markdown to HTML in three stages:
//!
//! 1. `{{ name }}` placeholders are replaced with render locals
//! 2. the Markdown is parsed with pulldown-cmark
//! 3. the event stream is rewritten (heading anchors, external links) and
//!    written out as HTML
//!
//! Stages 1 and 3 are toggled by [`HtmlPipelineConfig`]; the `toc`,
//! `external_links` and `interpolate` render options override the
//! configuration per call.

use crate::config::HtmlPipelineConfig;
use crate::content::Content;
use crate::engine::RenderingEngine;
use crate::error::{MbraoError, Result};
use crate::locale::{Filtered, ALL_LOCALES};
use crate::options::{EngineRenderOptions, Locals};
use crate::validation::is_url;
use pulldown_cmark::{html, CowStr, Event, Options, Parser as CmarkParser, Tag, TagEnd};
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.-]*)\s*\}\}")
            .expect("placeholder regex is valid")
    })
}

/// Markdown to HTML rendering engine
#[derive(Debug, Clone, Default)]
pub struct HtmlPipelineEngine {
    config: HtmlPipelineConfig,
}

impl HtmlPipelineEngine {
    /// Registration name
    pub const NAME: &'static str = "html_pipeline";

    /// Engine with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with a specific configuration
    pub fn with_config(config: HtmlPipelineConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &HtmlPipelineConfig {
        &self.config
    }

    fn cmark_options(&self) -> Options {
        let mut options = Options::empty();
        if self.config.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.config.footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.config.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.config.tasklists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if self.config.smart_punctuation {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        options
    }

    /// Render a Markdown string with this engine's configuration
    pub fn render_markdown(&self, markdown: &str, locals: &Locals) -> String {
        self.render_with(markdown, locals, &Filters::from_config(&self.config))
    }

    fn render_with(&self, markdown: &str, locals: &Locals, filters: &Filters) -> String {
        let source = if filters.interpolate {
            interpolate(markdown, locals)
        } else {
            markdown.to_string()
        };

        let mut events: Vec<Event> = CmarkParser::new_ext(&source, self.cmark_options()).collect();
        if filters.toc {
            add_heading_anchors(&mut events);
        }
        if filters.external_links {
            events = mark_external_links(events);
        }

        let mut output = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut output, events.into_iter());
        output
    }
}

/// Filters active for one render call
#[derive(Debug, Clone, Copy)]
struct Filters {
    interpolate: bool,
    toc: bool,
    external_links: bool,
}

impl Filters {
    fn from_config(config: &HtmlPipelineConfig) -> Self {
        Self {
            interpolate: config.interpolate_locals,
            toc: config.heading_anchors,
            external_links: config.external_links,
        }
    }

    fn with_overrides(mut self, options: &EngineRenderOptions) -> Self {
        let flag = |key: &str| options.get(key).and_then(Value::as_bool);
        if let Some(interpolate) = flag("interpolate") {
            self.interpolate = interpolate;
        }
        if let Some(toc) = flag("toc") {
            self.toc = toc;
        }
        if let Some(external_links) = flag("external_links") {
            self.external_links = external_links;
        }
        self
    }
}

/// Body for the requested locale; `*` or no locale picks the default body
fn select_body(content: &Content, options: &EngineRenderOptions) -> Result<String> {
    let locale = options
        .effective_locale()
        .map(str::trim)
        .filter(|l| !l.is_empty() && *l != ALL_LOCALES);

    match locale {
        Some(locale) => match content.body_for(&[locale])? {
            Filtered::Single(body) => Ok(body),
            Filtered::Many(bodies) => Err(MbraoError::rendering(format!(
                "locale {} selects {} bodies, expected one",
                locale,
                bodies.len()
            ))),
        },
        None => content
            .body
            .default_value()
            .map(str::to_string)
            .ok_or_else(|| MbraoError::LocaleNotFound {
                requested: vec![ALL_LOCALES.to_string()],
                available: content.body.available_locales(),
            }),
    }
}

fn interpolate(text: &str, locals: &Locals) -> String {
    if locals.is_empty() {
        return text.to_string();
    }

    placeholder_regex()
        .replace_all(text, |caps: &Captures| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let name = caps.get(1).map_or("", |m| m.as_str());
            match locals.get(name) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) => String::new(),
                Some(other) => other.to_string(),
                None => whole.to_string(),
            }
        })
        .into_owned()
}

/// Turn heading text into an `id`, unique within the document
fn slugify(text: &str, seen: &mut HashMap<String, usize>) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if (c.is_whitespace() || c == '-' || c == '_') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let mut slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        slug = "section".to_string();
    }

    let count = seen.entry(slug.clone()).or_insert(0);
    *count += 1;
    if *count > 1 {
        slug = format!("{}-{}", slug, *count - 1);
    }
    slug
}

fn add_heading_anchors(events: &mut [Event]) {
    let mut seen = HashMap::new();

    for i in 0..events.len() {
        let needs_id = matches!(&events[i], Event::Start(Tag::Heading { id: None, .. }));
        if !needs_id {
            continue;
        }

        let mut text = String::new();
        for event in &events[i + 1..] {
            match event {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                _ => {}
            }
        }

        let slug = slugify(&text, &mut seen);
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(slug));
        }
    }
}

fn mark_external_links(events: Vec<Event>) -> Vec<Event> {
    let mut output = Vec::with_capacity(events.len());
    // One entry per open link: whether it was rewritten to raw HTML
    let mut open_links: Vec<bool> = Vec::new();

    for event in events {
        match event {
            Event::Start(Tag::Link {
                ref dest_url,
                ref title,
                ..
            }) if is_url(dest_url) => {
                let mut tag = format!("<a href=\"{}\"", escape_attribute(dest_url));
                if !title.is_empty() {
                    tag.push_str(&format!(" title=\"{}\"", escape_attribute(title)));
                }
                tag.push_str(" target=\"_blank\" rel=\"noopener noreferrer\">");
                open_links.push(true);
                output.push(Event::InlineHtml(CowStr::from(tag)));
            }
            Event::Start(Tag::Link { .. }) => {
                open_links.push(false);
                output.push(event);
            }
            Event::End(TagEnd::Link) => {
                if open_links.pop().unwrap_or(false) {
                    output.push(Event::InlineHtml(CowStr::Borrowed("</a>")));
                } else {
                    output.push(event);
                }
            }
            other => output.push(other),
        }
    }

    output
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl RenderingEngine for HtmlPipelineEngine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn render(
        &self,
        content: &Content,
        options: &EngineRenderOptions,
        locals: &Locals,
    ) -> Result<String> {
        let body = select_body(content, options)?;
        let filters = Filters::from_config(&self.config).with_overrides(options);

        tracing::debug!(
            locale = options.effective_locale().unwrap_or(ALL_LOCALES),
            toc = filters.toc,
            external_links = filters.external_links,
            "Rendering content to HTML"
        );

        Ok(self.render_with(&body, locals, &filters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LocalizedText;
    use crate::metadata::Metadata;
    use serde_json::json;

    fn render(content: &Content, options: &EngineRenderOptions, locals: &Locals) -> String {
        HtmlPipelineEngine::new()
            .render(content, options, locals)
            .unwrap()
    }

    fn options() -> EngineRenderOptions {
        EngineRenderOptions::new(HtmlPipelineEngine::NAME)
    }

    // ============================================================================
    // Markdown
    // ============================================================================

    #[test]
    fn test_renders_markdown() {
        let content = Content::create(Metadata::new(), "Some *emphasis* and ~~strike~~.");
        let html = render(&content, &options(), &Locals::new());
        assert_eq!(
            html,
            "<p>Some <em>emphasis</em> and <del>strike</del>.</p>\n"
        );
    }

    #[test]
    fn test_tables_toggle() {
        let markdown = "| a | b |\n|---|---|\n| 1 | 2 |\n";
        let with_tables = HtmlPipelineEngine::new().render_markdown(markdown, &Locals::new());
        assert!(with_tables.contains("<table>"));

        let config = HtmlPipelineConfig {
            tables: false,
            ..HtmlPipelineConfig::default()
        };
        let without = HtmlPipelineEngine::with_config(config).render_markdown(markdown, &Locals::new());
        assert!(!without.contains("<table>"));
    }

    // ============================================================================
    // Filters
    // ============================================================================

    #[test]
    fn test_interpolates_locals() {
        let content = Content::create(Metadata::new(), "Hello {{ name }}, you have {{count}} {{ missing }}");
        let locals: Locals = [
            ("name".to_string(), json!("Jane")),
            ("count".to_string(), json!(3)),
        ]
        .into_iter()
        .collect();

        let html = render(&content, &options(), &locals);
        assert_eq!(html, "<p>Hello Jane, you have 3 {{ missing }}</p>\n");
    }

    #[test]
    fn test_heading_anchors() {
        let content = Content::create(Metadata::new(), "# Hello World\n\n## Hello World\n\n## `code` & more");
        let html = render(&content, &options(), &Locals::new());

        assert!(html.contains("<h1 id=\"hello-world\">Hello World</h1>"));
        assert!(html.contains("<h2 id=\"hello-world-1\">Hello World</h2>"));
        assert!(html.contains("id=\"code-more\""));
    }

    #[test]
    fn test_heading_anchors_can_be_disabled_per_call() {
        let content = Content::create(Metadata::new(), "# Title");
        let mut options = options();
        options.extra.insert("toc".to_string(), json!(false));

        assert_eq!(render(&content, &options, &Locals::new()), "<h1>Title</h1>\n");
    }

    #[test]
    fn test_external_links() {
        let content = Content::create(
            Metadata::new(),
            "[out](https://example.com/a?b=1&c=2 \"Ex\") and [in](/local)",
        );
        let html = render(&content, &options(), &Locals::new());

        assert!(html.contains(
            "<a href=\"https://example.com/a?b=1&amp;c=2\" title=\"Ex\" target=\"_blank\" rel=\"noopener noreferrer\">out</a>"
        ));
        assert!(html.contains("<a href=\"/local\">in</a>"));
    }

    // ============================================================================
    // Body selection
    // ============================================================================

    #[test]
    fn test_renders_body_for_locale() {
        let mut content = Content::new();
        content.body = LocalizedText::from([("en", "Hi"), ("*", "Hola")]);

        let mut options = options();
        options.locale = Some("en".to_string());
        assert_eq!(render(&content, &options, &Locals::new()), "<p>Hi</p>\n");

        options.locale = Some("fr".to_string());
        assert_eq!(render(&content, &options, &Locals::new()), "<p>Hola</p>\n");

        options.locale = None;
        assert_eq!(render(&content, &options, &Locals::new()), "<p>Hola</p>\n");
    }

    #[test]
    fn test_wildcard_locale_renders_default_body() {
        let mut options = options();
        options.locale = Some("*".to_string());

        let mut content = Content::new();
        content.body = LocalizedText::from([("en", "Hi"), ("*", "Hola")]);
        assert_eq!(render(&content, &options, &Locals::new()), "<p>Hola</p>\n");

        content.body = LocalizedText::from([("it", "Ciao")]);
        assert_eq!(render(&content, &options, &Locals::new()), "<p>Ciao</p>\n");

        content.body = LocalizedText::from([("en", "Hi"), ("it", "Ciao")]);
        let err = HtmlPipelineEngine::new()
            .render(&content, &options, &Locals::new())
            .unwrap_err();
        assert!(matches!(err, MbraoError::LocaleNotFound { .. }));
    }

    #[test]
    fn test_default_locale_applies_without_requested_locale() {
        let mut content = Content::new();
        content.body = LocalizedText::from([("en", "Hi"), ("it", "Ciao")]);

        let mut options = options();
        options.default_locale = Some("it".to_string());
        assert_eq!(render(&content, &options, &Locals::new()), "<p>Ciao</p>\n");

        options.locale = Some("en".to_string());
        assert_eq!(render(&content, &options, &Locals::new()), "<p>Hi</p>\n");
    }

    #[test]
    fn test_missing_locale_fails() {
        let mut content = Content::new();
        content.body = LocalizedText::from([("en", "Hi"), ("it", "Ciao")]);

        let err = HtmlPipelineEngine::new()
            .render(&content, &options(), &Locals::new())
            .unwrap_err();
        assert!(matches!(err, MbraoError::LocaleNotFound { .. }));

        let mut options = options();
        options.locale = Some("fr".to_string());
        let err = HtmlPipelineEngine::new()
            .render(&content, &options, &Locals::new())
            .unwrap_err();
        assert!(err.is_locale_error());
    }

    #[test]
    fn test_slugify() {
        let mut seen = HashMap::new();
        assert_eq!(slugify("  Hello,  World! ", &mut seen), "hello-world");
        assert_eq!(slugify("???", &mut seen), "section");
        assert_eq!(slugify("Hello World", &mut seen), "hello-world-1");
    }
}
