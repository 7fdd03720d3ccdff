//! Error types for configuration parsing and resolution.

use std::path::PathBuf;

use thiserror::Error;

use super::registry::{Setting, SettingKey};
use super::value::ValueKind;

/// Error type for configuration operations.
///
/// Every variant is fatal and surfaces before any conversion work begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A config value's type contradicts the setting's declared type.
    #[error("Invalid type for '{name}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Config-file spelling of the setting
        name: String,
        /// Declared kind
        expected: ValueKind,
        /// Kind actually supplied
        found: &'static str,
    },

    /// An asciidoctor option entry has an unusable value.
    #[error("Invalid asciidoctor option '{name}': {reason}")]
    InvalidOption {
        /// Option name inside the asciidoctor option table
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    /// The raw asciidoctor option string cannot be tokenized.
    #[error("Invalid asciidoctor option string '{value}': {source}")]
    InvalidOptionString {
        /// The raw string
        value: String,
        /// Tokenizer error
        #[source]
        source: shell_words::ParseError,
    },

    /// A path could not be shell-expanded.
    #[error("Cannot expand path '{path}': {reason}")]
    PathExpansion {
        /// The path as written
        path: String,
        /// Reason for failure
        reason: String,
    },

    /// A key is not part of the registry.
    #[error("Unknown setting '{0}'")]
    UnknownSetting(SettingKey),
}

impl ConfigError {
    /// Creates a `TypeMismatch` error for a registry setting.
    #[must_use]
    pub fn mismatch(setting: &Setting, found: ValueKind) -> Self {
        Self::TypeMismatch {
            name: setting.file_name.to_string(),
            expected: setting.kind(),
            found: found.name(),
        }
    }
}
