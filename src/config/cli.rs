//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.
//! Every registry option is an `Option` so that "not passed" stays
//! distinguishable from any real value, including `""` and `false`.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};

use super::defaults;
use super::merge::SourceValues;
use super::registry::SettingKey;
use super::value::Value;

/// multimark: lightweight-markup emails to multipart/alternative
///
/// Reads an email whose body is Markdown or AsciiDoc and writes it back
/// with a converted plain-text part and a rendered HTML part.
#[derive(Debug, Parser)]
#[command(name = "multimark")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Extra asciidoctor options, split like a shell command line
    #[arg(
        long = "asciidoctor-options-string",
        short = 'a',
        value_name = "OPTIONS",
        allow_hyphen_values = true
    )]
    pub asciidoctor_options_string: Option<String>,

    /// Input email ('-' for standard input)
    #[arg(long, short = 'i', value_name = "PATH")]
    pub infile: Option<String>,

    /// Output email ('-' for standard output)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub outfile: Option<String>,

    /// Format of the plain-text part (a pandoc format name)
    #[arg(long = "out-format", short = 't', value_name = "FORMAT")]
    pub out_format: Option<String>,

    /// Path to configuration file ('' disables config discovery)
    #[arg(long = "config-file", short = 'c', value_name = "PATH")]
    pub config_file: Option<String>,

    /// Attach files referenced from the body
    #[arg(
        long = "attach-file-references",
        short = 'r',
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub attach_file_references: Option<bool>,

    /// Attach inline code snippets as files
    #[arg(
        long = "attach-inline-code",
        short = 'l',
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub attach_inline_code: Option<bool>,

    /// Markup format of the email body (e.g. commonmark, asciidoctor)
    #[arg(long = "in-format", short = 'f', value_name = "FORMAT")]
    pub in_format: Option<String>,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for multimark
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = defaults::INIT_OUTPUT)]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }

    /// Converts the parsed arguments into CLI source values.
    ///
    /// The result has an entry for every registry key; keys the user did
    /// not pass (or that the CLI cannot supply) are absent.
    #[must_use]
    pub fn values(&self) -> SourceValues {
        let text = |v: &Option<String>| v.clone().map(Value::Str);
        let flag = |v: Option<bool>| v.map(Value::Bool);

        let mut values = SourceValues::new();
        values.set(SettingKey::AsciidoctorOptions, None);
        values.set(
            SettingKey::AsciidoctorOptionsString,
            text(&self.asciidoctor_options_string),
        );
        values.set(SettingKey::Infile, text(&self.infile));
        values.set(SettingKey::Outfile, text(&self.outfile));
        values.set(SettingKey::OutFormat, text(&self.out_format));
        values.set(SettingKey::ConfigFile, text(&self.config_file));
        values.set(
            SettingKey::AttachFileReferences,
            flag(self.attach_file_references),
        );
        values.set(SettingKey::AttachInlineCode, flag(self.attach_inline_code));
        values.set(SettingKey::InFormat, text(&self.in_format));
        values
    }
}
