use crate::cli::FilterArgs;
use anyhow::{Context, Result};
use mbrao_core::{LocalizedText, Parser};
use std::io::Write;

pub fn execute(parser: &Parser, args: FilterArgs, out: &mut dyn Write) -> Result<()> {
    let content = super::load_content(parser, &args.input)?;
    let filtered = parser
        .filter_content(&content, args.locales.as_slice(), super::parse_options(&args.input))
        .with_context(|| {
            let requested = if args.locales.is_empty() {
                parser.locale()
            } else {
                args.locales.join(",")
            };
            format!("Failed to filter content for {}", requested)
        })?;

    match filtered {
        LocalizedText::Single(text) => write!(out, "{}", text)?,
        LocalizedText::Localized(texts) => {
            for (locale, text) in texts {
                writeln!(out, "[{}]", locale)?;
                writeln!(out, "{}", text)?;
            }
        }
    }
    Ok(())
}
