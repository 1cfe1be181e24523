//! Shared configuration loader for the pysyn toolchain.
//!
//! `defaults/pysyn.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`PysynConfig`],
//! then turn the sections into [`ParseOptions`] and [`PrettyPrinterPrefs`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
pub use config::ConfigError;
use pysyn_parser::pysyn::formats::PrettyPrinterPrefs;
use pysyn_parser::pysyn::grammar::GrammarVersion;
use pysyn_parser::pysyn::stream::StreamMode;
use pysyn_parser::pysyn::ParseOptions;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/pysyn.default.toml");

/// Top-level configuration consumed by pysyn applications.
#[derive(Debug, Clone, Deserialize)]
pub struct PysynConfig {
    pub parser: ParserConfig,
    pub printer: PrinterConfig,
}

/// Grammar selection and the parse options.
///
/// Unknown grammar versions or stream modes fail deserialization, so a loaded
/// config always names a real grammar.
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    pub grammar: GrammarVersion,
    pub trace_recovery: bool,
    pub stream_mode: StreamMode,
    pub dedent_budget: usize,
    pub max_nesting: usize,
}

/// Mirrors the knobs exposed by the pretty printer.
#[derive(Debug, Clone, Deserialize)]
pub struct PrinterConfig {
    pub spaces_after_comma: usize,
    pub spaces_before_comment: usize,
    pub line_ending: String,
    pub reformat: bool,
}

impl From<&ParserConfig> for ParseOptions {
    fn from(config: &ParserConfig) -> Self {
        ParseOptions {
            trace_recovery: config.trace_recovery,
            stream_mode: config.stream_mode,
            dedent_budget: config.dedent_budget,
            max_nesting: config.max_nesting,
        }
    }
}

impl From<&PrinterConfig> for PrettyPrinterPrefs {
    fn from(config: &PrinterConfig) -> Self {
        PrettyPrinterPrefs {
            spaces_after_comma: config.spaces_after_comma,
            spaces_before_comment: config.spaces_before_comment,
            line_ending: config.line_ending.clone(),
            reformat: config.reformat,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (used for command-line flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<PysynConfig, ConfigError> {
        Ok(self.builder.build()?.try_deserialize()?)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
