//! The option registry.
//!
//! Single source of truth for which settings exist, how they are spelled on
//! the command line and in the config file, their defaults, and which
//! origins may supply them.

use std::fmt;

use super::defaults;
use super::settings::Settings;
use super::value::{Value, ValueKind, ValueMap};

/// Stable internal identifier of a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingKey {
    /// Nested asciidoctor option bag (file only).
    AsciidoctorOptions,
    /// Raw, shell-tokenized asciidoctor option string (CLI only).
    AsciidoctorOptionsString,
    /// Input path, `-` for standard input.
    Infile,
    /// Output path, `-` for standard output.
    Outfile,
    /// Target format of the plain-text part.
    OutFormat,
    /// Config file path.
    ConfigFile,
    /// Attach files referenced from the body.
    AttachFileReferences,
    /// Attach inline code snippets as files.
    AttachInlineCode,
    /// Markup format of the source body.
    InFormat,
}

impl SettingKey {
    /// Every key, in registry order.
    pub const ALL: [Self; 9] = [
        Self::AsciidoctorOptions,
        Self::AsciidoctorOptionsString,
        Self::Infile,
        Self::Outfile,
        Self::OutFormat,
        Self::ConfigFile,
        Self::AttachFileReferences,
        Self::AttachInlineCode,
        Self::InFormat,
    ];

    /// The internal name, used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AsciidoctorOptions => "asciidoctor_options",
            Self::AsciidoctorOptionsString => "asciidoctor_options_string",
            Self::Infile => "infile",
            Self::Outfile => "outfile",
            Self::OutFormat => "out_format",
            Self::ConfigFile => "config_file",
            Self::AttachFileReferences => "attach_file_references",
            Self::AttachInlineCode => "attach_inline_code",
            Self::InFormat => "in_format",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configurable parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    /// Internal key.
    pub key: SettingKey,
    /// Long CLI name, without the leading `--`.
    pub long_name: &'static str,
    /// Short CLI name.
    pub short_name: Option<char>,
    /// Name used in the config file.
    pub file_name: &'static str,
    /// Current value (the default, until re-instantiated by a source).
    pub value: Value,
    /// Whether the CLI may supply this setting.
    pub allowed_on_cli: bool,
    /// Whether the config file may supply this setting.
    pub allowed_in_file: bool,
}

impl Setting {
    /// Declares a setting whose file name equals its long CLI name and
    /// which both origins may supply.
    fn new(
        key: SettingKey,
        long_name: &'static str,
        short_name: Option<char>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            key,
            long_name,
            short_name,
            file_name: long_name,
            value: value.into(),
            allowed_on_cli: true,
            allowed_in_file: true,
        }
    }

    const fn cli_only(mut self) -> Self {
        self.allowed_in_file = false;
        self
    }

    const fn file_only(mut self) -> Self {
        self.allowed_on_cli = false;
        self
    }

    /// Returns a copy carrying a different value.
    ///
    /// # Errors
    ///
    /// Returns the offered value's kind if it differs from this setting's.
    pub fn with_value(&self, value: Value) -> Result<Self, ValueKind> {
        if value.kind() != self.kind() {
            return Err(value.kind());
        }
        Ok(Self {
            value,
            ..self.clone()
        })
    }

    /// The fixed kind of this setting.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        self.value.kind()
    }
}

/// Returns one [`Setting`] per supported key, carrying its default value.
#[must_use]
pub fn declare_defaults() -> Settings {
    use SettingKey as K;

    Settings::from_settings([
        Setting::new(
            K::AsciidoctorOptions,
            "asciidoctor-options",
            None,
            ValueMap::new(),
        )
        .file_only(),
        Setting::new(
            K::AsciidoctorOptionsString,
            "asciidoctor-options-string",
            Some('a'),
            "",
        )
        .cli_only(),
        Setting::new(K::Infile, "infile", Some('i'), defaults::STDIO),
        Setting::new(K::Outfile, "outfile", Some('o'), defaults::STDIO),
        Setting::new(K::OutFormat, "out-format", Some('t'), defaults::FORMAT),
        Setting::new(K::ConfigFile, "config-file", Some('c'), ""),
        Setting::new(
            K::AttachFileReferences,
            "attach-file-references",
            Some('r'),
            defaults::ATTACH_FILE_REFERENCES,
        ),
        Setting::new(
            K::AttachInlineCode,
            "attach-inline-code",
            Some('l'),
            defaults::ATTACH_INLINE_CODE,
        ),
        Setting::new(K::InFormat, "in-format", Some('f'), defaults::FORMAT),
    ])
}

/// Looks up the key spelled `name` in the config file.
#[must_use]
pub fn key_for_file_name(name: &str) -> Option<SettingKey> {
    declare_defaults()
        .iter()
        .find(|setting| setting.file_name == name)
        .map(|setting| setting.key)
}
