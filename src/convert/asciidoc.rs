//! Asciidoctor option encoding.
//!
//! Turns the nested option bag from the config file into command-line
//! tokens for asciidoctor. Only a fixed set of options is ever emitted, in
//! the order of [`ALLOWED_OPTIONS`], so the same bag always produces the
//! same command line.

use crate::config::{ConfigError, Value, ValueMap};

/// Option holding the list of Ruby libraries to require.
pub const REQUIRE: &str = "require";

/// Option holding the list of template directories.
pub const TEMPLATE_DIR: &str = "template-dir";

/// Option holding the document attribute table.
pub const ATTRIBUTE: &str = "attribute";

/// Options that may be passed to asciidoctor, in emission order.
pub const ALLOWED_OPTIONS: [&str; 14] = [
    "failure-level",
    "safe",
    "trace",
    "template-engine",
    "source-dir",
    "safe-mode",
    TEMPLATE_DIR,
    ATTRIBUTE,
    "doctype",
    "eruby",
    "section-numbers",
    "quiet",
    REQUIRE,
    "timings",
];

/// Known asciidoctor options that are never passed through.
///
/// The pipeline controls backend, output location and document framing
/// itself; the rest make no sense for a piped conversion.
pub const RESERVED_OPTIONS: [&str; 9] = [
    "base-dir",
    "destination-dir",
    "load-path",
    "version",
    "backend",
    "help",
    "no-header-footer",
    "out-file",
    "verbose",
];

/// Returns true if `name` may be passed to asciidoctor.
#[must_use]
pub fn is_allowed(name: &str) -> bool {
    ALLOWED_OPTIONS.contains(&name)
}

/// The asciidoctor option bag.
///
/// Flat entries are strings or booleans; `require` and `template-dir` are
/// lists; `attribute` is a table of strings and booleans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsciidoctorOptions {
    options: ValueMap,
}

impl AsciidoctorOptions {
    /// Wraps an option map.
    #[must_use]
    pub const fn new(options: ValueMap) -> Self {
        Self { options }
    }

    /// Returns the value of one option.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    /// Number of options in the bag, allowed or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns true if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Encodes the bag as asciidoctor command-line tokens.
    ///
    /// - options outside [`ALLOWED_OPTIONS`] are skipped
    /// - `true` emits `--name`, `false` emits nothing
    /// - a string emits `--name value`
    /// - a list emits `--name item` once per item
    /// - each attribute emits `--attribute=name=value`, `--attribute=name`
    ///   (for `true`) or `--attribute=name!` (for `false`, which unsets it)
    #[must_use]
    pub fn encode(&self) -> Vec<String> {
        let mut tokens = Vec::new();
        for name in ALLOWED_OPTIONS {
            if let Some(value) = self.options.get(name) {
                encode_option(name, value, &mut tokens);
            }
        }
        tokens
    }
}

fn encode_option(name: &str, value: &Value, tokens: &mut Vec<String>) {
    match value {
        Value::Map(attributes) if name == ATTRIBUTE => encode_attributes(attributes, tokens),
        Value::Bool(true) => tokens.push(format!("--{name}")),
        Value::Bool(false) => {}
        Value::Str(s) => tokens.extend([format!("--{name}"), s.clone()]),
        Value::List(items) => {
            for item in items {
                tokens.extend([format!("--{name}"), item.clone()]);
            }
        }
        Value::Map(_) => tracing::debug!("Skipping asciidoctor option '{name}': tables not supported"),
    }
}

fn encode_attributes(attributes: &ValueMap, tokens: &mut Vec<String>) {
    for (attr, value) in attributes.iter() {
        match value {
            Value::Str(s) => tokens.push(format!("--{ATTRIBUTE}={attr}={s}")),
            Value::Bool(true) => tokens.push(format!("--{ATTRIBUTE}={attr}")),
            Value::Bool(false) => tokens.push(format!("--{ATTRIBUTE}={attr}!")),
            Value::List(_) | Value::Map(_) => {
                tracing::debug!("Skipping attribute '{attr}': not a string or boolean");
            }
        }
    }
}

/// Splits the raw extra option string like a POSIX shell would.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidOptionString`] on unbalanced quotes or a
/// trailing escape.
pub fn split_option_string(raw: &str) -> Result<Vec<String>, ConfigError> {
    shell_words::split(raw).map_err(|source| ConfigError::InvalidOptionString {
        value: raw.to_string(),
        source,
    })
}
