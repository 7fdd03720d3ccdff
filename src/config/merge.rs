//! Settings merge engine.
//!
//! Combines CLI values, config-file values and registry defaults into one
//! effective [`Settings`] set. Precedence is CLI, then file, then defaults.
//! How two present values combine depends on their kind:
//!
//! - strings and booleans: the higher-precedence value wins outright
//! - lists: union, de-duplicated, higher-precedence entries first
//! - maps: union of keys, higher-precedence value wins per key; a key whose
//!   values are maps on both sides is unioned one more level the same way

use std::collections::BTreeMap;

use super::error::ConfigError;
use super::registry::{Setting, SettingKey};
use super::settings::Settings;
use super::value::{Value, ValueMap};

/// Values supplied by one origin (CLI or config file).
///
/// A key mapped to `None` was left absent by that origin. Absence is kept
/// distinct from every real value, including `""` and `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceValues {
    entries: BTreeMap<SettingKey, Option<Value>>,
}

impl SourceValues {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value (or explicit absence) for a key.
    pub fn set(&mut self, key: SettingKey, value: Option<Value>) {
        self.entries.insert(key, value);
    }

    /// Builder-style [`set`](Self::set) for a present value.
    #[must_use]
    pub fn with(mut self, key: SettingKey, value: impl Into<Value>) -> Self {
        self.set(key, Some(value.into()));
        self
    }

    /// Returns the present value for a key, `None` if absent or missing.
    #[must_use]
    pub fn get(&self, key: SettingKey) -> Option<&Value> {
        self.entries.get(&key).and_then(Option::as_ref)
    }

    /// Returns true if the key has an entry, even an absent one.
    #[must_use]
    pub fn contains(&self, key: SettingKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Number of entries, absent ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves the effective settings.
///
/// The result holds exactly one setting per key in `defaults`; no absent
/// values remain.
///
/// # Errors
///
/// Returns [`ConfigError::TypeMismatch`] if a source offers a value whose
/// kind differs from the registry's declared kind for that key.
pub fn resolve(
    cli: &SourceValues,
    file: &SourceValues,
    defaults: &Settings,
) -> Result<Settings, ConfigError> {
    let resolved = defaults
        .iter()
        .map(|default| resolve_one(default, [cli.get(default.key), file.get(default.key)]))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Settings::from_settings(resolved))
}

fn resolve_one(default: &Setting, layers: [Option<&Value>; 2]) -> Result<Setting, ConfigError> {
    let mut merged: Option<Value> = None;

    for value in layers.into_iter().flatten() {
        if value.kind() != default.kind() {
            return Err(ConfigError::mismatch(default, value.kind()));
        }
        merged = Some(match merged {
            None => value.clone(),
            Some(higher) => merge_values(higher, value),
        });
    }

    let value = match merged {
        Some(higher) => merge_values(higher, &default.value),
        None => default.value.clone(),
    };

    tracing::debug!(setting = %default.key, %value, "resolved");

    default
        .with_value(value)
        .map_err(|found| ConfigError::mismatch(default, found))
}

/// Merges a lower-precedence value into a higher-precedence one.
///
/// Values of different kinds never combine; the higher one is kept.
#[must_use]
pub fn merge_values(higher: Value, lower: &Value) -> Value {
    match (higher, lower) {
        (Value::List(higher), Value::List(lower)) => Value::List(union_lists(higher, lower)),
        (Value::Map(higher), Value::Map(lower)) => Value::Map(union_maps(higher, lower)),
        (higher, _) => higher,
    }
}

fn union_lists(mut higher: Vec<String>, lower: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(higher.len() + lower.len());
    higher.retain(|item| {
        if seen.contains(item) {
            false
        } else {
            seen.push(item.clone());
            true
        }
    });
    for item in lower {
        if !seen.contains(item) {
            seen.push(item.clone());
            higher.push(item.clone());
        }
    }
    higher
}

fn union_maps(mut higher: ValueMap, lower: &ValueMap) -> ValueMap {
    for (key, lower_value) in lower.iter() {
        let merged = match (higher.get(key), lower_value) {
            (None, _) => lower_value.clone(),
            (Some(Value::Map(nested)), Value::Map(lower_nested)) => {
                Value::Map(union_flat(nested.clone(), lower_nested))
            }
            (Some(_), _) => continue,
        };
        higher.insert(key, merged);
    }
    higher
}

fn union_flat(mut higher: ValueMap, lower: &ValueMap) -> ValueMap {
    for (key, value) in lower.iter() {
        if !higher.contains_key(key) {
            higher.insert(key, value.clone());
        }
    }
    higher
}
