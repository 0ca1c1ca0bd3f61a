use anyhow::{Context, Result};
use clap::Parser as _;
use mbrao_cli::cli::Cli;
use mbrao_cli::commands;
use mbrao_core::{ConfigLoader, Parser};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let level = cli.level_filter(config.logging.level.as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        locale = config.parser.locale(),
        parsing_engine = %config.parser.parsing_engine(),
        rendering_engine = %config.parser.rendering_engine(),
        "Configuration loaded"
    );

    let parser = Parser::from_config(&config);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::execute(cli.command, &parser, &mut out)
}
