//! The parser facade
//!
//! [`Parser`] fills in option defaults from its [`ParserConfig`], resolves
//! the engine through its [`EngineRegistry`] and delegates. A process-wide
//! instance is available through [`Parser::instance`] and the free
//! [`parse`] / [`render`] functions.

use crate::config::{MbraoConfig, ParserConfig};
use crate::content::Content;
use crate::engine::{EngineName, EngineRole, ResolvedEngine};
use crate::error::Result;
use crate::locale::{sanitize_locales, LocalizedText};
use crate::options::{Locals, ParseOptions, RenderOptions};
use crate::registry::EngineRegistry;
use crate::validation;
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, OnceLock};

fn instance_slot() -> &'static RwLock<Option<Arc<Parser>>> {
    static INSTANCE: OnceLock<RwLock<Option<Arc<Parser>>>> = OnceLock::new();
    INSTANCE.get_or_init(|| RwLock::new(None))
}

/// Entry point for parsing and rendering content
pub struct Parser {
    config: RwLock<ParserConfig>,
    registry: Arc<EngineRegistry>,
}

impl Parser {
    /// Parser using the global engine registry
    pub fn new(config: ParserConfig) -> Self {
        Self::with_registry(config, EngineRegistry::global())
    }

    /// Parser using a specific registry
    pub fn with_registry(config: ParserConfig, registry: Arc<EngineRegistry>) -> Self {
        Self {
            config: RwLock::new(config),
            registry,
        }
    }

    /// Parser with its own registry, built from a file-level configuration
    pub fn from_config(config: &MbraoConfig) -> Self {
        let registry = EngineRegistry::new();
        registry.register_builtin_engines(config.rendering.clone());
        Self::with_registry(config.parser.clone(), Arc::new(registry))
    }

    /// The shared instance, created with default configuration on first use
    pub fn instance() -> Arc<Parser> {
        Self::instance_with(false)
    }

    /// The shared instance, or with `force_new` a fresh default parser
    ///
    /// A forced instance is not cached: later calls to [`Parser::instance`]
    /// keep returning the shared one until [`Parser::set_instance`] replaces it.
    pub fn instance_with(force_new: bool) -> Arc<Parser> {
        if force_new {
            return Arc::new(Parser::default());
        }

        if let Some(parser) = instance_slot().read().as_ref() {
            return parser.clone();
        }

        instance_slot()
            .write()
            .get_or_insert_with(|| Arc::new(Parser::default()))
            .clone()
    }

    /// Replace the shared instance
    pub fn set_instance(parser: Parser) -> Arc<Parser> {
        let parser = Arc::new(parser);
        *instance_slot().write() = Some(parser.clone());
        parser
    }

    /// Engine registry in use
    pub fn registry(&self) -> &Arc<EngineRegistry> {
        &self.registry
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> ParserConfig {
        self.config.read().clone()
    }

    /// Default locale
    pub fn locale(&self) -> String {
        self.config.read().locale().to_string()
    }

    /// Set the default locale; blank or absent resets to `en`
    pub fn set_locale(&self, locale: Option<&str>) {
        self.config.write().set_locale(locale);
    }

    /// Default parsing engine
    pub fn parsing_engine(&self) -> EngineName {
        self.config.read().parsing_engine().clone()
    }

    /// Set the default parsing engine; blank or absent resets to `plain_text`
    pub fn set_parsing_engine(&self, engine: Option<&str>) {
        self.config.write().set_parsing_engine(engine);
    }

    /// Default rendering engine
    pub fn rendering_engine(&self) -> EngineName {
        self.config.read().rendering_engine().clone()
    }

    /// Set the default rendering engine; blank or absent resets to `html_pipeline`
    pub fn set_rendering_engine(&self, engine: Option<&str>) {
        self.config.write().set_rendering_engine(engine);
    }

    /// Parse raw input into content
    ///
    /// The `metadata` and `content` flags are enforced after the engine ran,
    /// so engines that ignore them still yield no metadata or an empty body.
    pub fn parse(&self, raw: &str, options: ParseOptions) -> Result<Content> {
        let options = options.sanitize(&self.parsing_engine());
        tracing::debug!(engine = %options.engine, "Parsing content");

        let engine = self.registry.parsing(&options.engine)?;
        let mut content = engine.parse(raw, &options)?;
        if !options.metadata {
            content.clear_metadata();
        }
        if !options.content {
            content.clear_body();
        }
        Ok(content)
    }

    /// Render content
    ///
    /// Without a requested locale the parser's default locale is used.
    pub fn render(&self, content: &Content, options: RenderOptions, locals: &Locals) -> Result<String> {
        let mut options = options.sanitize(&self.rendering_engine());
        options.default_locale = Some(self.locale());
        tracing::debug!(engine = %options.engine, "Rendering content");

        let engine = self.registry.rendering(&options.engine)?;
        engine.render(content, &options, locals)
    }

    /// Filter a content body by locale with the parsing engine's markers
    ///
    /// An empty locale list means the parser's default locale.
    pub fn filter_content<S: AsRef<str>>(
        &self,
        content: &Content,
        locales: &[S],
        options: ParseOptions,
    ) -> Result<LocalizedText> {
        let options = options.sanitize(&self.parsing_engine());
        let mut locales = sanitize_locales(locales);
        if locales.is_empty() {
            locales.push(self.locale());
        }

        let engine = self.registry.parsing(&options.engine)?;
        engine.filter_content(content, &locales, &options)
    }

    /// Render with the defaults once, memoizing the result on the content
    pub fn render_cached<'c>(&self, content: &'c Content, locals: &Locals) -> Result<&'c str> {
        content.rendered_or_try_init(|| self.render(content, RenderOptions::new(), locals))
    }

    /// Resolve an engine through the registry
    pub fn create_engine(
        &self,
        name: impl Into<EngineName>,
        role: EngineRole,
    ) -> Result<ResolvedEngine> {
        self.registry.resolve(&name.into(), role)
    }

    /// Whether a string is a valid email address
    pub fn is_email(value: &str) -> bool {
        validation::is_email(value)
    }

    /// Whether a string is a valid http(s)/ftp(s) URL
    pub fn is_url(value: &str) -> bool {
        validation::is_url(value)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("config", &*self.config.read())
            .field("registry", &self.registry)
            .finish()
    }
}

/// Parse with the shared [`Parser`] instance
pub fn parse(raw: &str, options: ParseOptions) -> Result<Content> {
    Parser::instance().parse(raw, options)
}

/// Render with the shared [`Parser`] instance
pub fn render(content: &Content, options: RenderOptions, locals: &Locals) -> Result<String> {
    Parser::instance().render(content, options, locals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MbraoError;

    #[test]
    fn test_accessors_coerce() {
        let parser = Parser::default();
        assert_eq!(parser.locale(), "en");

        parser.set_locale(Some("it"));
        assert_eq!(parser.locale(), "it");
        parser.set_locale(None);
        assert_eq!(parser.locale(), "en");

        parser.set_parsing_engine(Some("Custom"));
        assert_eq!(parser.parsing_engine().as_str(), "custom");
        parser.set_parsing_engine(None);
        assert_eq!(parser.parsing_engine().as_str(), "plain_text");

        parser.set_rendering_engine(Some(""));
        assert_eq!(parser.rendering_engine().as_str(), "html_pipeline");
    }

    #[test]
    fn test_builtin_round_trip() {
        let parser = Parser::default();
        let content = parser
            .parse("---\ntitle: Hello\n---\n# Body", ParseOptions::new())
            .unwrap();
        assert_eq!(content.title, LocalizedText::from("Hello"));

        let html = parser
            .render(&content, RenderOptions::new(), &Locals::new())
            .unwrap();
        assert_eq!(html, "<h1 id=\"body\">Body</h1>\n");
    }

    #[test]
    fn test_unknown_engine() {
        let parser = Parser::default();
        let err = parser
            .parse("x", ParseOptions::new().with_engine("missing"))
            .unwrap_err();
        assert!(matches!(
            err,
            MbraoError::UnknownEngine {
                role: EngineRole::Parsing,
                ..
            }
        ));
    }

    #[test]
    fn test_from_config_uses_rendering_settings() {
        let mut config = MbraoConfig::default();
        config.rendering.heading_anchors = false;
        let parser = Parser::from_config(&config);

        let content = Content::create(Default::default(), "# Body");
        let html = parser
            .render(&content, RenderOptions::new(), &Locals::new())
            .unwrap();
        assert_eq!(html, "<h1>Body</h1>\n");
    }

    #[test]
    fn test_render_cached_memoizes() {
        let parser = Parser::default();
        let content = Content::create(Default::default(), "Text");

        assert_eq!(content.rendered(), None);
        let first = parser.render_cached(&content, &Locals::new()).unwrap();
        assert_eq!(first, "<p>Text</p>\n");
        assert_eq!(content.rendered(), Some("<p>Text</p>\n"));
    }

    #[test]
    fn test_render_defaults_to_parser_locale() {
        let parser = Parser::default();
        let mut content = Content::new();
        content.body = LocalizedText::from([("en", "Hi"), ("it", "Ciao")]);

        let html = parser
            .render(&content, RenderOptions::new(), &Locals::new())
            .unwrap();
        assert_eq!(html, "<p>Hi</p>\n");

        parser.set_locale(Some("it"));
        let html = parser
            .render(&content, RenderOptions::new(), &Locals::new())
            .unwrap();
        assert_eq!(html, "<p>Ciao</p>\n");

        let html = parser
            .render(&content, RenderOptions::new().with_locale("en"), &Locals::new())
            .unwrap();
        assert_eq!(html, "<p>Hi</p>\n");
    }

    #[test]
    fn test_filter_content_defaults_to_parser_locale() {
        let parser = Parser::default();
        parser.set_locale(Some("it"));
        let content = Content::create(
            Default::default(),
            "{{content: en}}Hello{{/content}}{{content: it}}Ciao{{/content}}",
        );
        let none: &[&str] = &[];

        let filtered = parser
            .filter_content(&content, none, ParseOptions::new())
            .unwrap();
        assert_eq!(filtered, LocalizedText::from("Ciao"));

        let filtered = parser
            .filter_content(&content, &["*"], ParseOptions::new())
            .unwrap();
        assert_eq!(filtered, LocalizedText::from("HelloCiao"));
    }
}
