//! Built-in engines
//!
//! - [`PlainTextEngine`] (`plain_text`, parsing): YAML metadata in a
//!   `{{metadata}}` block or `---` front matter, locale sections in the body
//! - [`HtmlPipelineEngine`] (`html_pipeline`, rendering): Markdown to HTML

pub mod html_pipeline;
pub mod plain_text;

pub use html_pipeline::HtmlPipelineEngine;
pub use plain_text::PlainTextEngine;
