use crate::cli::RenderArgs;
use anyhow::{bail, Context, Result};
use mbrao_core::{Locals, Parser, RenderOptions};
use serde_json::Value;
use std::io::Write;

pub fn execute(parser: &Parser, args: RenderArgs, out: &mut dyn Write) -> Result<()> {
    let content = super::load_content(parser, &args.input)?;
    let locals = parse_locals(&args.locals)?;

    let mut options = RenderOptions::new();
    if let Some(engine) = &args.engine {
        options = options.with_engine(engine.as_str());
    }
    if let Some(locale) = &args.locale {
        options = options.with_locale(locale.as_str());
    }

    let output = parser
        .render(&content, options, &locals)
        .context("Failed to render content")?;
    write!(out, "{}", output)?;
    Ok(())
}

/// Parse `KEY=VALUE` pairs; values that are valid JSON keep their type
pub fn parse_locals(pairs: &[String]) -> Result<Locals> {
    let mut locals = Locals::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid local '{}': expected KEY=VALUE", pair);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("Invalid local '{}': empty key", pair);
        }
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        locals.insert(key.to_string(), value);
    }
    Ok(locals)
}
