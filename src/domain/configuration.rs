//! The shortcode configuration document.
//!
//! A configuration is any mapping that carries a `shortcodes` key. Validity is
//! a shallow check: the value under `shortcodes` is not inspected until a
//! binder walks it, so a document such as `{shortcodes: 42}` is still valid and
//! simply binds nothing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::DomainError;

/// Key holding the shortcode name → handler specifier mapping.
pub const SHORTCODES_KEY: &str = "shortcodes";
/// Optional key scoping unqualified handler specifiers.
pub const NAMESPACE_KEY: &str = "namespace";

/// A validated shortcode configuration.
///
/// Instances are built fresh on every resolution and never mutated afterwards.
/// Deserialization goes through [`TryFrom<Value>`], so it applies the same
/// validity rule as fetched candidates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Configuration(Map<String, Value>);

impl Configuration {
    /// The configuration returned when every fetcher misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Shallow validity check applied to every fetched candidate.
    pub fn is_valid(candidate: &Value) -> bool {
        candidate
            .as_object()
            .is_some_and(|map| map.contains_key(SHORTCODES_KEY))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Namespace used to qualify specifiers; empty when absent or not a string.
    pub fn namespace(&self) -> &str {
        self.0
            .get(NAMESPACE_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Declared shortcodes, if the `shortcodes` value is a mapping.
    pub fn shortcodes(&self) -> Option<&Map<String, Value>> {
        self.0.get(SHORTCODES_KEY).and_then(Value::as_object)
    }

    /// Iterate `(shortcode, specifier)` pairs. Non-string specifiers yield `None`.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.shortcodes()
            .into_iter()
            .flat_map(|map| map.iter())
            .map(|(name, specifier)| (name.as_str(), specifier.as_str()))
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Configuration> for Value {
    fn from(config: Configuration) -> Self {
        config.into_value()
    }
}

impl TryFrom<Value> for Configuration {
    type Error = DomainError;

    fn try_from(candidate: Value) -> Result<Self, Self::Error> {
        match candidate {
            Value::Object(map) if map.contains_key(SHORTCODES_KEY) => Ok(Self(map)),
            Value::Object(_) => Err(DomainError::validation(format!(
                "configuration is missing the `{SHORTCODES_KEY}` key"
            ))),
            other => Err(DomainError::validation(format!(
                "configuration must be a mapping, found {}",
                value_kind(&other)
            ))),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
