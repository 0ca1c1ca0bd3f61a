//! Configuration
//!
//! [`ParserConfig`] holds the defaults a [`Parser`](crate::Parser) falls back
//! to when a call does not specify them. [`MbraoConfig`] is the file-level
//! configuration, loadable from TOML, YAML or JSON, with environment
//! overrides:
//!
//! - `MBRAO_LOCALE`
//! - `MBRAO_PARSING_ENGINE`
//! - `MBRAO_RENDERING_ENGINE`
//!
//! Effective defaults resolve as: explicit call option > configuration >
//! built-in fallback.

use crate::engine::EngineName;
use crate::error::{MbraoError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Locale used when none is configured
pub const DEFAULT_LOCALE: &str = "en";

/// Parsing engine used when none is configured
pub const DEFAULT_PARSING_ENGINE: &str = "plain_text";

/// Rendering engine used when none is configured
pub const DEFAULT_RENDERING_ENGINE: &str = "html_pipeline";

/// Defaults consulted by parse and render calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ParserConfigFile")]
pub struct ParserConfig {
    locale: String,
    parsing_engine: EngineName,
    rendering_engine: EngineName,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            parsing_engine: EngineName::new(DEFAULT_PARSING_ENGINE),
            rendering_engine: EngineName::new(DEFAULT_RENDERING_ENGINE),
        }
    }
}

impl ParserConfig {
    /// Built-in defaults: `en`, `plain_text`, `html_pipeline`
    pub fn new() -> Self {
        Self::default()
    }

    /// Default locale
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Set the default locale; blank or absent resets to `en`
    pub fn set_locale(&mut self, locale: Option<&str>) {
        self.locale = locale
            .map(|l| l.trim().trim_start_matches(':').trim())
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LOCALE)
            .to_string();
    }

    /// Default parsing engine
    pub fn parsing_engine(&self) -> &EngineName {
        &self.parsing_engine
    }

    /// Set the default parsing engine; blank or absent resets to `plain_text`
    pub fn set_parsing_engine(&mut self, engine: Option<&str>) {
        self.parsing_engine = engine
            .and_then(EngineName::parse)
            .unwrap_or_else(|| EngineName::new(DEFAULT_PARSING_ENGINE));
    }

    /// Default rendering engine
    pub fn rendering_engine(&self) -> &EngineName {
        &self.rendering_engine
    }

    /// Set the default rendering engine; blank or absent resets to `html_pipeline`
    pub fn set_rendering_engine(&mut self, engine: Option<&str>) {
        self.rendering_engine = engine
            .and_then(EngineName::parse)
            .unwrap_or_else(|| EngineName::new(DEFAULT_RENDERING_ENGINE));
    }

    /// Builder-style locale
    pub fn with_locale(mut self, locale: &str) -> Self {
        self.set_locale(Some(locale));
        self
    }

    /// Builder-style parsing engine
    pub fn with_parsing_engine(mut self, engine: &str) -> Self {
        self.set_parsing_engine(Some(engine));
        self
    }

    /// Builder-style rendering engine
    pub fn with_rendering_engine(mut self, engine: &str) -> Self {
        self.set_rendering_engine(Some(engine));
        self
    }
}

/// On-disk shape of [`ParserConfig`]; every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ParserConfigFile {
    locale: Option<String>,
    parsing_engine: Option<String>,
    rendering_engine: Option<String>,
}

impl From<ParserConfigFile> for ParserConfig {
    fn from(file: ParserConfigFile) -> Self {
        let mut config = Self::default();
        config.set_locale(file.locale.as_deref());
        config.set_parsing_engine(file.parsing_engine.as_deref());
        config.set_rendering_engine(file.rendering_engine.as_deref());
        config
    }
}

/// Settings of the `html_pipeline` rendering engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlPipelineConfig {
    /// GitHub-style tables
    pub tables: bool,
    /// Footnotes
    pub footnotes: bool,
    /// `~~strikethrough~~`
    pub strikethrough: bool,
    /// `- [ ]` task lists
    pub tasklists: bool,
    /// Curly quotes and dashes
    pub smart_punctuation: bool,
    /// Add `id` anchors to headings
    pub heading_anchors: bool,
    /// Open external links in a new window
    pub external_links: bool,
    /// Replace `{{ name }}` with render locals
    pub interpolate_locals: bool,
}

impl Default for HtmlPipelineConfig {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            tasklists: true,
            smart_punctuation: false,
            heading_anchors: true,
            external_links: true,
            interpolate_locals: true,
        }
    }
}

/// Logging settings used by front-ends
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level filter (`off`, `error`, `warn`, `info`, `debug`, `trace`)
    pub level: Option<String>,
}

/// File-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MbraoConfig {
    /// Parser defaults
    pub parser: ParserConfig,
    /// HTML pipeline settings
    pub rendering: HtmlPipelineConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML
    Toml,
    /// YAML
    Yaml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => Some(Self::Toml),
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// Loads [`MbraoConfig`] from files and the environment
pub struct ConfigLoader;

impl ConfigLoader {
    /// Default configuration file (`<config dir>/mbrao/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mbrao").join("config.toml"))
    }

    /// Parse configuration text in a given format
    pub fn load_from_str(contents: &str, format: ConfigFormat) -> Result<MbraoConfig> {
        match format {
            ConfigFormat::Toml => toml::from_str(contents)
                .map_err(|e| MbraoError::config(format!("Failed to parse TOML: {}", e))),
            ConfigFormat::Yaml => {
                if contents.trim().is_empty() {
                    return Ok(MbraoConfig::default());
                }
                serde_yaml::from_str(contents)
                    .map_err(|e| MbraoError::config(format!("Failed to parse YAML: {}", e)))
            }
            ConfigFormat::Json => serde_json::from_str(contents)
                .map_err(|e| MbraoError::config(format!("Failed to parse JSON: {}", e))),
        }
    }

    /// Load configuration from a file, picking the format by extension
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<MbraoConfig> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            MbraoError::config(format!(
                "Unsupported config file extension: {}",
                path.display()
            ))
        })?;

        let contents = std::fs::read_to_string(path)?;
        let config = Self::load_from_str(&contents, format)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load an explicit file, else the default file if present, else defaults
    ///
    /// Environment overrides are applied in every case.
    pub fn load(path: Option<&Path>) -> Result<MbraoConfig> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(default) => Self::load_from_file(default)?,
                None => MbraoConfig::default(),
            },
        };

        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Apply `MBRAO_*` environment variables
    pub fn apply_env_overrides(config: &mut MbraoConfig) {
        Self::apply_overrides(config, |key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides(config: &mut MbraoConfig, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(locale) = lookup("MBRAO_LOCALE") {
            config.parser.set_locale(Some(&locale));
        }
        if let Some(engine) = lookup("MBRAO_PARSING_ENGINE") {
            config.parser.set_parsing_engine(Some(&engine));
        }
        if let Some(engine) = lookup("MBRAO_RENDERING_ENGINE") {
            config.parser.set_rendering_engine(Some(&engine));
        }
    }
}
