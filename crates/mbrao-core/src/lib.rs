//! mbrao core
//!
//! Parses text with embedded metadata into [`Content`] and renders it, using
//! pluggable engines looked up by name.
//!
//! ## Organization
//!
//! - [`content`] / [`locale`] / [`metadata`]: the content model
//! - [`engine`]: the [`ParsingEngine`] and [`RenderingEngine`] contracts
//! - [`engines`]: built-in `plain_text` and `html_pipeline` engines
//! - [`registry`]: name → engine resolution with per-registry instance caching
//! - [`parser`]: the [`Parser`] facade and its shared instance
//! - [`config`]: parser defaults and file-based configuration
//!
//! ## Example
//!
//! ```
//! use mbrao_core::{Locals, ParseOptions, Parser, RenderOptions};
//!
//! let parser = Parser::default();
//! let content = parser
//!     .parse("---\ntitle: Hello\n---\nSome *text*", ParseOptions::new())
//!     .unwrap();
//! let html = parser
//!     .render(&content, RenderOptions::new(), &Locals::new())
//!     .unwrap();
//! assert_eq!(html, "<p>Some <em>text</em></p>\n");
//! ```

pub mod config;
pub mod content;
pub mod engine;
pub mod engines;
pub mod error;
pub mod locale;
pub mod metadata;
pub mod options;
pub mod parser;
pub mod registry;
pub mod validation;

pub use config::{ConfigFormat, ConfigLoader, HtmlPipelineConfig, MbraoConfig, ParserConfig};
pub use content::{Author, Content, TagSet};
pub use engine::{EngineName, EngineRole, ParsingEngine, RenderingEngine, ResolvedEngine};
pub use engines::{HtmlPipelineEngine, PlainTextEngine};
pub use error::{MbraoError, Result};
pub use locale::{Filtered, LocalizedText, ALL_LOCALES};
pub use metadata::Metadata;
pub use options::{EngineParseOptions, EngineRenderOptions, Locals, ParseOptions, RenderOptions};
pub use parser::{parse, render, Parser};
pub use registry::{EngineRegistry, EngineRegistryBuilder};
pub use validation::{is_email, is_url};
