//! Configuration layer for multimark.
//!
//! This module provides:
//! - The option registry ([`declare_defaults`], [`Setting`], [`SettingKey`])
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`], [`ConfigLocator`])
//! - The merge engine ([`resolve`], [`SourceValues`])
//! - Effective settings ([`Settings`]) and loading ([`load`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! A value passed on the command line wins even when it equals the default.
//! Every CLI option is optional at the parser level, so "not passed" is never
//! confused with `""` or `false`.
//!
//! # Merge Semantics
//!
//! Strings and booleans are replaced by the highest source that has them.
//! Lists are unioned (higher source first, duplicates dropped). The
//! asciidoctor option table is unioned key by key with the higher source
//! winning; its `attribute` sub-table is unioned the same way.
//!
//! # CLI-Only vs File-Only Options
//!
//! - `asciidoctor-options` (the option table) can only come from the file.
//! - `asciidoctor-options-string` (raw extra options) can only come from the CLI.
//!
//! # Config File Includes
//!
//! The `include` key is reserved. It is accepted and ignored with a warning.

mod cli;
pub mod defaults;
mod error;
mod loader;
mod merge;
mod registry;
mod settings;
mod toml;
mod value;

#[cfg(test)]
mod loader_tests;

pub use cli::{Cli, Command};
pub use error::ConfigError;
pub use loader::{expand_path, load, load_with, write_default_config};
pub use merge::{SourceValues, merge_values, resolve};
pub use registry::{Setting, SettingKey, declare_defaults, key_for_file_name};
pub use settings::Settings;
pub use self::toml::{ConfigLocator, INCLUDE_KEY, TomlConfig, default_config_template};
pub use value::{Value, ValueKind, ValueMap};
