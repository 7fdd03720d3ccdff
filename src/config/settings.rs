//! The effective settings set.

use std::collections::BTreeMap;
use std::fmt;

use crate::convert::AsciidoctorOptions;

use super::error::ConfigError;
use super::registry::{Setting, SettingKey};
use super::value::{Value, ValueMap};

/// A mapping from key to one resolved [`Setting`].
///
/// Produced by [`declare_defaults`](super::declare_defaults) and by
/// [`resolve`](super::resolve); read-only once handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    entries: BTreeMap<SettingKey, Setting>,
}

impl Settings {
    pub(super) fn from_settings(settings: impl IntoIterator<Item = Setting>) -> Self {
        Self {
            entries: settings.into_iter().map(|s| (s.key, s)).collect(),
        }
    }

    /// Returns the setting for a key.
    #[must_use]
    pub fn get(&self, key: SettingKey) -> Option<&Setting> {
        self.entries.get(&key)
    }

    /// Returns the value for a key.
    #[must_use]
    pub fn value(&self, key: SettingKey) -> Option<&Value> {
        self.get(key).map(|s| &s.value)
    }

    /// Iterates settings in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.entries.values()
    }

    /// Number of settings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no settings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a copy where `key` carries `value`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownSetting`] if the key is not present and
    /// [`ConfigError::TypeMismatch`] if the value has the wrong kind.
    pub fn with_value(mut self, key: SettingKey, value: Value) -> Result<Self, ConfigError> {
        let current = self
            .entries
            .get(&key)
            .ok_or(ConfigError::UnknownSetting(key))?;
        let replaced = current
            .with_value(value)
            .map_err(|found| ConfigError::mismatch(current, found))?;
        self.entries.insert(key, replaced);
        Ok(self)
    }

    fn str_of(&self, key: SettingKey) -> &str {
        self.value(key).and_then(Value::as_str).unwrap_or_default()
    }

    fn bool_of(&self, key: SettingKey) -> bool {
        self.value(key).and_then(Value::as_bool).unwrap_or_default()
    }

    /// Markup format of the source body.
    #[must_use]
    pub fn in_format(&self) -> &str {
        self.str_of(SettingKey::InFormat)
    }

    /// Target format of the plain-text part.
    #[must_use]
    pub fn out_format(&self) -> &str {
        self.str_of(SettingKey::OutFormat)
    }

    /// Input path, `-` for standard input.
    #[must_use]
    pub fn infile(&self) -> &str {
        self.str_of(SettingKey::Infile)
    }

    /// Output path, `-` for standard output.
    #[must_use]
    pub fn outfile(&self) -> &str {
        self.str_of(SettingKey::Outfile)
    }

    /// Config file in effect, empty if none.
    #[must_use]
    pub fn config_file(&self) -> &str {
        self.str_of(SettingKey::ConfigFile)
    }

    /// Raw extra asciidoctor options, not yet tokenized.
    #[must_use]
    pub fn asciidoctor_options_string(&self) -> &str {
        self.str_of(SettingKey::AsciidoctorOptionsString)
    }

    /// Whether referenced files should be attached.
    #[must_use]
    pub fn attach_file_references(&self) -> bool {
        self.bool_of(SettingKey::AttachFileReferences)
    }

    /// Whether inline code should be attached as files.
    #[must_use]
    pub fn attach_inline_code(&self) -> bool {
        self.bool_of(SettingKey::AttachInlineCode)
    }

    /// The asciidoctor option bag.
    #[must_use]
    pub fn asciidoctor_options(&self) -> AsciidoctorOptions {
        let map = self
            .value(SettingKey::AsciidoctorOptions)
            .and_then(Value::as_map)
            .cloned()
            .unwrap_or_else(ValueMap::new);
        AsciidoctorOptions::new(map)
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config_file = match self.config_file() {
            "" => "none",
            path => path,
        };

        write!(
            f,
            "Settings {{ in_format: {}, out_format: {}, infile: {}, outfile: {}, \
             config_file: {}, attach_file_references: {}, attach_inline_code: {}, \
             asciidoctor_options: {} }}",
            self.in_format(),
            self.out_format(),
            self.infile(),
            self.outfile(),
            config_file,
            self.attach_file_references(),
            self.attach_inline_code(),
            self.asciidoctor_options().len(),
        )
    }
}
