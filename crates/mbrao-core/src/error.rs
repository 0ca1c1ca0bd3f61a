//! Error types for parsing and rendering

use crate::engine::EngineRole;
use std::io;
use thiserror::Error;

/// Errors raised by the parsing and rendering pipeline
#[derive(Debug, Error)]
pub enum MbraoError {
    /// No engine is registered under the requested name for the requested role
    #[error("Unknown {role} engine: {name}")]
    UnknownEngine {
        /// Canonical engine name that was requested
        name: String,
        /// Role the engine was requested for
        role: EngineRole,
    },

    /// An engine does not provide a capability of its contract
    #[error("Engine {engine} does not implement {capability}")]
    Unimplemented {
        /// Engine that was asked for the capability
        engine: String,
        /// Name of the missing capability
        capability: &'static str,
    },

    /// None of the requested locales is available in a locale-keyed field
    #[error("No value available for locales {requested:?} (available: {available:?})")]
    LocaleNotFound {
        /// Locales that were requested
        requested: Vec<String>,
        /// Locale keys present in the field
        available: Vec<String>,
    },

    /// The content is not enabled for any of the requested locales
    #[error("Content is not available for locales {requested:?} (enabled: {enabled:?})")]
    UnavailableLocalization {
        /// Locales that were requested
        requested: Vec<String>,
        /// Locales the content is enabled for
        enabled: Vec<String>,
    },

    /// The metadata section could not be turned into a mapping
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    /// A rendering engine failed
    #[error("Rendering failed: {0}")]
    Rendering(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error reading a configuration file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Specialized Result type for pipeline operations
pub type Result<T> = std::result::Result<T, MbraoError>;

impl MbraoError {
    /// Create an unknown engine error
    pub fn unknown_engine(name: impl Into<String>, role: EngineRole) -> Self {
        Self::UnknownEngine {
            name: name.into(),
            role,
        }
    }

    /// Create an unimplemented capability error
    pub fn unimplemented(engine: impl Into<String>, capability: &'static str) -> Self {
        Self::Unimplemented {
            engine: engine.into(),
            capability,
        }
    }

    /// Create an invalid metadata error
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    /// Create a rendering error
    pub fn rendering(msg: impl Into<String>) -> Self {
        Self::Rendering(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error comes from locale filtering
    pub fn is_locale_error(&self) -> bool {
        matches!(
            self,
            Self::LocaleNotFound { .. } | Self::UnavailableLocalization { .. }
        )
    }
}
