use clap::{Args, Parser, Subcommand, ValueEnum};
use mbrao_core::EngineRole;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser)]
#[command(name = "mbrao")]
#[command(about = "mbrao - parse and render content with embedded metadata")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses config file value or defaults to 'warn'
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/mbrao/config.toml)
    #[arg(short = 'C', long, global = true, env = "MBRAO_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Effective log level: flag, then verbose, then config, then `warn`
    pub fn level_filter(&self, configured: Option<&str>) -> LevelFilter {
        if let Some(level) = self.log_level {
            return level.into();
        }
        if self.verbose {
            return LevelFilter::DEBUG;
        }
        configured
            .and_then(|level| level.parse().ok())
            .unwrap_or(LevelFilter::WARN)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a document and print its content as JSON or YAML
    Parse(ParseArgs),

    /// Parse a document and render it
    Render(RenderArgs),

    /// Print the body sections matching the requested locales
    Filter(FilterArgs),

    /// List registered engines
    Engines {
        /// Only list engines of this role
        #[arg(short, long, value_enum)]
        role: Option<RoleArg>,
    },

    /// Check email addresses or URLs
    Validate {
        /// What to validate
        #[arg(value_enum)]
        kind: ValidateKind,

        /// Values to check
        #[arg(required = true)]
        values: Vec<String>,
    },
}

/// Input and parsing flags shared by every document command
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Input file ('-' or omitted for stdin)
    pub input: Option<PathBuf>,

    /// Parsing engine (defaults to the configured one)
    #[arg(short = 'p', long)]
    pub parser: Option<String>,

    /// Treat the whole input as body, skipping metadata extraction
    #[arg(long)]
    pub no_metadata: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Drop the body, keeping only metadata
    #[arg(long)]
    pub no_content: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Rendering engine (defaults to the configured one)
    #[arg(short, long)]
    pub engine: Option<String>,

    /// Render the body for this locale
    #[arg(long)]
    pub locale: Option<String>,

    /// Value available to the template as {{ KEY }}; VALUE is JSON or plain text
    #[arg(long = "local", value_name = "KEY=VALUE")]
    pub locals: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Locales to keep (defaults to the configured locale; '*' keeps all)
    #[arg(long = "locale", value_name = "LOCALE")]
    pub locales: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Parsing,
    Rendering,
}

impl From<RoleArg> for EngineRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Parsing => EngineRole::Parsing,
            RoleArg::Rendering => EngineRole::Rendering,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValidateKind {
    Email,
    Url,
}
