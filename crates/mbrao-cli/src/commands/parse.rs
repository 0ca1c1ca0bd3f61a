use crate::cli::{OutputFormat, ParseArgs};
use anyhow::{Context, Result};
use mbrao_core::Parser;
use std::io::Write;

pub fn execute(parser: &Parser, args: ParseArgs, out: &mut dyn Write) -> Result<()> {
    let raw = super::read_input(args.input.input.as_deref())?;
    let mut options = super::parse_options(&args.input);
    if args.no_content {
        options = options.with_content(false);
    }

    let content = parser.parse(&raw, options).context("Failed to parse input")?;
    tracing::info!(title = ?content.title.default_value(), "Parsed content");

    let serialized = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&content)?,
        OutputFormat::Yaml => serde_yaml::to_string(&content)?,
    };
    writeln!(out, "{}", serialized.trim_end())?;
    Ok(())
}
