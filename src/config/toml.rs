//! TOML configuration file parsing.
//!
//! The file is read as a generic table and translated key by key: file
//! spellings map to registry keys, values are type-checked against the
//! registry, and the asciidoctor option table is filtered to the allow-list.

use std::path::{Path, PathBuf};

use crate::convert::asciidoc;

use super::ConfigError;
use super::defaults;
use super::merge::SourceValues;
use super::registry::{Setting, SettingKey, declare_defaults};
use super::value::{Value, ValueKind, ValueMap};

/// Reserved key for including other config files. Currently ignored.
pub const INCLUDE_KEY: &str = "include";

/// Settings read from one configuration file.
///
/// Holds only keys actually present in the file and allowed there.
#[derive(Debug, Default)]
pub struct TomlConfig {
    values: SourceValues,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a value
    /// does not match its setting's type.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a value does not match its
    /// setting's type.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(content)?;
        Self::from_table(table)
    }

    fn from_table(table: toml::Table) -> Result<Self, ConfigError> {
        let registry = declare_defaults();
        let mut config = Self::default();

        for (name, raw) in table {
            if name == INCLUDE_KEY {
                tracing::warn!("Config includes are not supported, ignoring '{INCLUDE_KEY}' = {raw}");
                continue;
            }

            let Some(setting) = registry.iter().find(|s| s.file_name == name) else {
                tracing::warn!("Unknown config key '{name}', ignoring");
                continue;
            };

            if !setting.allowed_in_file {
                tracing::warn!("'{name}' can only be set on the command line, ignoring");
                continue;
            }

            let value = convert_value(setting, raw)?;
            config.values.set(setting.key, Some(value));
        }

        Ok(config)
    }

    /// Consumes the config, returning its values.
    #[must_use]
    pub fn into_values(self) -> SourceValues {
        self.values
    }
}

fn convert_value(setting: &Setting, raw: toml::Value) -> Result<Value, ConfigError> {
    match (setting.kind(), raw) {
        (ValueKind::Str, toml::Value::String(s)) => Ok(Value::Str(s)),
        (ValueKind::Bool, toml::Value::Boolean(b)) => Ok(Value::Bool(b)),
        (ValueKind::List, raw @ toml::Value::Array(_)) => {
            string_list(setting.file_name, raw).map(Value::List)
        }
        (ValueKind::Map, toml::Value::Table(table)) if setting.key == SettingKey::AsciidoctorOptions => {
            asciidoctor_options(table).map(Value::Map)
        }
        (expected, raw) => Err(ConfigError::TypeMismatch {
            name: setting.file_name.to_string(),
            expected,
            found: raw.type_str(),
        }),
    }
}

/// Converts the `[asciidoctor-options]` table into an option bag.
///
/// Keys outside the allow-list are dropped here, so they can never reach
/// the asciidoctor command line.
fn asciidoctor_options(table: toml::Table) -> Result<ValueMap, ConfigError> {
    let mut options = ValueMap::new();

    for (name, raw) in table {
        if !asciidoc::is_allowed(&name) {
            tracing::debug!("Dropping asciidoctor option '{name}' (not allowed)");
            continue;
        }

        let value = match name.as_str() {
            asciidoc::REQUIRE | asciidoc::TEMPLATE_DIR => Value::List(string_list(&name, raw)?),
            asciidoc::ATTRIBUTE => Value::Map(attributes(raw)?),
            _ => scalar(&name, raw)?,
        };
        options.insert(name, value);
    }

    Ok(options)
}

fn attributes(raw: toml::Value) -> Result<ValueMap, ConfigError> {
    let table = match raw {
        toml::Value::Table(table) => table,
        other => {
            return Err(invalid_option(
                asciidoc::ATTRIBUTE,
                format!("expected a table, found {}", other.type_str()),
            ));
        }
    };

    table
        .into_iter()
        .map(|(name, raw)| {
            let value = scalar(&format!("{}.{name}", asciidoc::ATTRIBUTE), raw)?;
            Ok((name, value))
        })
        .collect()
}

/// A string or boolean; numbers are kept as their decimal text.
fn scalar(name: &str, raw: toml::Value) -> Result<Value, ConfigError> {
    match raw {
        toml::Value::String(s) => Ok(Value::Str(s)),
        toml::Value::Boolean(b) => Ok(Value::Bool(b)),
        toml::Value::Integer(i) => Ok(Value::Str(i.to_string())),
        toml::Value::Float(f) => Ok(Value::Str(f.to_string())),
        other => Err(invalid_option(
            name,
            format!("expected a string or boolean, found {}", other.type_str()),
        )),
    }
}

/// A single string or an array of strings, as a list.
fn string_list(name: &str, raw: toml::Value) -> Result<Vec<String>, ConfigError> {
    match raw {
        toml::Value::String(s) => Ok(vec![s]),
        toml::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                toml::Value::String(s) => Ok(s),
                other => Err(invalid_option(
                    name,
                    format!("expected an array of strings, found {}", other.type_str()),
                )),
            })
            .collect(),
        other => Err(invalid_option(
            name,
            format!("expected a string or array of strings, found {}", other.type_str()),
        )),
    }
}

fn invalid_option(name: &str, reason: String) -> ConfigError {
    ConfigError::InvalidOption {
        name: name.to_string(),
        reason,
    }
}

/// Finds the config file when none is given on the command line.
///
/// Candidates, highest precedence first: `$MULTI_MARK_CONFIG_DIR`,
/// `$XDG_CONFIG_HOME`, then the platform's per-user config directory
/// (with a `multi-mark-maker` subdirectory). The first existing file wins.
#[derive(Debug, Clone, Default)]
pub struct ConfigLocator {
    config_dir: Option<PathBuf>,
    xdg_config_home: Option<PathBuf>,
    user_config_dir: Option<PathBuf>,
}

impl ConfigLocator {
    /// Builds a locator from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            config_dir: env_dir(defaults::CONFIG_DIR_ENV),
            xdg_config_home: env_dir(defaults::XDG_CONFIG_HOME_ENV),
            user_config_dir: dirs::config_dir().map(|dir| dir.join(defaults::CONFIG_SUBDIR)),
        }
    }

    /// Sets the directory designated by `$MULTI_MARK_CONFIG_DIR`.
    #[must_use]
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Sets the XDG config home.
    #[must_use]
    pub fn with_xdg_config_home(mut self, dir: impl Into<PathBuf>) -> Self {
        self.xdg_config_home = Some(dir.into());
        self
    }

    /// Sets the per-user config directory.
    #[must_use]
    pub fn with_user_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_config_dir = Some(dir.into());
        self
    }

    /// Candidate file paths, highest precedence first.
    #[must_use]
    pub fn candidates(&self) -> Vec<PathBuf> {
        [&self.config_dir, &self.xdg_config_home, &self.user_config_dir]
            .into_iter()
            .flatten()
            .map(|dir| dir.join(defaults::CONFIG_FILE_NAME))
            .collect()
    }

    /// Returns the first candidate that exists.
    #[must_use]
    pub fn locate(&self) -> Option<PathBuf> {
        self.candidates().into_iter().find(|path| path.is_file())
    }
}

fn env_dir(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# multimark configuration file
#
# Keys use the same spelling as the long command-line options.
# Command-line options always win over values in this file.

# Markup format of the email body (default: commonmark)
# Use "asciidoctor" to render AsciiDoc bodies.
# in-format = "commonmark"

# Format of the plain-text part, any pandoc output format (default: commonmark)
# When it equals in-format the body is kept as written.
# out-format = "commonmark"

# Input and output email ("-" = standard input / output)
# infile = "-"
# outfile = "-"

# Attach files referenced from the body (default: true)
# attach-file-references = true

# Attach inline code snippets as files (default: false)
# attach-inline-code = false

# Options passed to asciidoctor when in-format is "asciidoctor".
# Only known, safe options are kept; anything else is dropped.
[asciidoctor-options]
# safe-mode = "safe"
# doctype = "article"
# section-numbers = true
# require = ["asciidoctor-diagram"]
# template-dir = ["~/.config/multi-mark-maker/templates"]

# Document attributes: a string sets a value, true sets the attribute,
# false unsets it.
[asciidoctor-options.attribute]
# toc = true
# source-highlighter = "rouge"
# sectnums = false
"#
    .to_string()
}
