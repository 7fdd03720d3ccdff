//! Turns CLI arguments plus an optional config file into [`Settings`].

use std::path::{Path, PathBuf};

use crate::convert::asciidoc;

use super::cli::Cli;
use super::defaults;
use super::error::ConfigError;
use super::merge::{SourceValues, resolve};
use super::registry::{SettingKey, declare_defaults};
use super::settings::Settings;
use super::toml::{ConfigLocator, TomlConfig, default_config_template};
use super::value::Value;

/// Loads the effective settings for a CLI invocation.
///
/// The config file is the one named by `--config-file`, or else the first
/// one found by [`ConfigLocator::from_env`].
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed, if a value
/// has the wrong type, or if the raw asciidoctor option string is malformed.
pub fn load(cli: &Cli) -> Result<Settings, ConfigError> {
    load_with(&cli.values(), &ConfigLocator::from_env())
}

/// Loads settings from explicit CLI values and a config locator.
///
/// An explicit empty `--config-file` disables both reading and discovery.
///
/// # Errors
///
/// See [`load`].
pub fn load_with(cli: &SourceValues, locator: &ConfigLocator) -> Result<Settings, ConfigError> {
    let mut defaults = declare_defaults();

    let config_path = match cli.get(SettingKey::ConfigFile).and_then(Value::as_str) {
        Some("") => None,
        Some(path) => Some(expand_path(path)?),
        None => {
            let found = locator.locate();
            if let Some(ref path) = found {
                tracing::debug!("Using config file {}", path.display());
                defaults = defaults.with_value(
                    SettingKey::ConfigFile,
                    Value::Str(path.display().to_string()),
                )?;
            }
            found
        }
    };

    let file = match config_path {
        Some(path) => TomlConfig::load(&path)?.into_values(),
        None => SourceValues::new(),
    };

    let settings = resolve(cli, &file, &defaults)?;

    asciidoc::split_option_string(settings.asciidoctor_options_string())?;

    Ok(settings)
}

/// Expands `~` and environment variables in a path.
///
/// `-` (standard input/output) is returned unchanged.
///
/// # Errors
///
/// Returns [`ConfigError::PathExpansion`] if a referenced variable is unset
/// or not valid unicode.
pub fn expand_path(raw: &str) -> Result<PathBuf, ConfigError> {
    if raw == defaults::STDIO {
        return Ok(PathBuf::from(raw));
    }

    shellexpand::full(raw)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|e| ConfigError::PathExpansion {
            path: raw.to_string(),
            reason: e.to_string(),
        })
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
