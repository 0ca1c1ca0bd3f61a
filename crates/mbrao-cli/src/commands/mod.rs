//! Subcommand implementations
//!
//! Each command writes its result to the given writer so it can be driven
//! from tests as well as from `main`.

pub mod engines;
pub mod filter;
pub mod parse;
pub mod render;
pub mod validate;

use crate::cli::{Commands, InputArgs};
use anyhow::{Context, Result};
use mbrao_core::{Content, ParseOptions, Parser};
use std::io::{Read, Write};
use std::path::Path;

/// Run a subcommand
pub fn execute(command: Commands, parser: &Parser, out: &mut dyn Write) -> Result<()> {
    match command {
        Commands::Parse(args) => parse::execute(parser, args, out),
        Commands::Render(args) => render::execute(parser, args, out),
        Commands::Filter(args) => filter::execute(parser, args, out),
        Commands::Engines { role } => engines::execute(parser, role.map(Into::into), out),
        Commands::Validate { kind, values } => validate::execute(kind, &values, out),
    }
}

/// Read the document named by the input args ('-' or none means stdin)
pub(crate) fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

/// Parse options from the shared input flags
pub(crate) fn parse_options(args: &InputArgs) -> ParseOptions {
    let mut options = ParseOptions::new();
    if let Some(engine) = &args.parser {
        options = options.with_engine(engine.as_str());
    }
    if args.no_metadata {
        options = options.with_metadata(false);
    }
    options
}

/// Read and parse the input document
pub(crate) fn load_content(parser: &Parser, args: &InputArgs) -> Result<Content> {
    let raw = read_input(args.input.as_deref())?;
    parser
        .parse(&raw, parse_options(args))
        .context("Failed to parse input")
}
