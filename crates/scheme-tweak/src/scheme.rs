//! Color scheme documents.

use crate::error::{TweakError, TweakResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Key holding the global options block.
///
/// Older schemes call it `defaults`; it is written back under the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlobalsKey {
    #[default]
    Globals,
    Defaults,
}

impl GlobalsKey {
    /// Document key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Globals => "globals",
            Self::Defaults => "defaults",
        }
    }
}

/// Foreground of a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Foreground {
    /// A single color
    Single(String),
    /// Gradient stops
    Gradient(Vec<String>),
}

impl Foreground {
    /// The single color, if this is not a gradient.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(s) => Some(s),
            Self::Gradient(_) => None,
        }
    }
}

/// A scope-to-style rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<Foreground>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_foreground: Option<String>,
    /// Keys this model does not know about (including `fontStyle`)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Rule {
    /// Create a rule for a scope.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: Some(scope.into()),
            ..Self::default()
        }
    }

    /// Set the foreground color.
    pub fn foreground(mut self, color: impl Into<String>) -> Self {
        self.foreground = Some(Foreground::Single(color.into()));
        self
    }

    /// Set a gradient foreground.
    pub fn gradient<I, S>(mut self, stops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.foreground = Some(Foreground::Gradient(stops.into_iter().map(Into::into).collect()));
        self
    }

    /// Set the background color.
    pub fn background(mut self, color: impl Into<String>) -> Self {
        self.background = Some(color.into());
        self
    }

    /// Font style, whichever spelling the document used.
    pub fn font_style(&self) -> Option<&str> {
        self.font_style
            .as_deref()
            .or_else(|| self.extra.get("fontStyle").and_then(Value::as_str))
    }
}

/// A color scheme document.
///
/// Holds the global options block, the rule list, and everything else
/// untouched (`variables` and unknown top-level keys).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawScheme", into = "RawScheme")]
pub struct ColorScheme {
    /// Key the global options were read from
    pub globals_key: GlobalsKey,
    /// Global options
    pub globals: Map<String, Value>,
    /// Rules, in document order
    pub rules: Vec<Rule>,
    /// Variables block, passed through
    pub variables: Option<Value>,
    /// Other top-level keys, passed through
    pub extra: Map<String, Value>,
    /// Blocks the source document had, written back even when empty
    pub(crate) present: Present,
}

/// Optional top-level blocks seen when reading a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Present {
    pub(crate) globals: bool,
    pub(crate) rules: bool,
}

#[derive(Serialize, Deserialize)]
struct RawScheme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    globals: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    defaults: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rules: Option<Vec<Rule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    variables: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawScheme> for ColorScheme {
    fn from(raw: RawScheme) -> Self {
        let mut extra = raw.extra;
        let present = Present {
            globals: raw.globals.is_some() || raw.defaults.is_some(),
            rules: raw.rules.is_some(),
        };
        let (globals_key, globals) = match (raw.globals, raw.defaults) {
            (Some(globals), defaults) => {
                if let Some(defaults) = defaults {
                    extra.insert("defaults".to_string(), Value::Object(defaults));
                }
                (GlobalsKey::Globals, globals)
            }
            (None, Some(defaults)) => (GlobalsKey::Defaults, defaults),
            (None, None) => (GlobalsKey::Globals, Map::new()),
        };

        Self {
            globals_key,
            globals,
            rules: raw.rules.unwrap_or_default(),
            variables: raw.variables,
            extra,
            present,
        }
    }
}

impl From<ColorScheme> for RawScheme {
    fn from(scheme: ColorScheme) -> Self {
        let mut extra = scheme.extra;
        let write_globals = scheme.present.globals || !scheme.globals.is_empty();
        let write_rules = scheme.present.rules || !scheme.rules.is_empty();
        let (globals, defaults) = match scheme.globals_key {
            GlobalsKey::Globals => {
                let defaults = extra.remove("defaults").and_then(|v| match v {
                    Value::Object(map) => Some(map),
                    other => {
                        extra.insert("defaults".to_string(), other);
                        None
                    }
                });
                (write_globals.then_some(scheme.globals), defaults)
            }
            GlobalsKey::Defaults => (None, write_globals.then_some(scheme.globals)),
        };

        Self {
            globals,
            defaults,
            rules: write_rules.then_some(scheme.rules),
            variables: scheme.variables,
            extra,
        }
    }
}

impl ColorScheme {
    /// Create an empty scheme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a global option.
    pub fn global(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.globals.insert(key.into(), value.into());
        self
    }

    /// Append a rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// A global option as a string.
    pub fn global_str(&self, key: &str) -> Option<&str> {
        self.globals.get(key).and_then(Value::as_str)
    }

    /// Parse a scheme from JSON text.
    pub fn from_json(text: &str) -> TweakResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Build a scheme from a JSON value.
    pub fn from_value(value: Value) -> TweakResult<Self> {
        if !value.is_object() {
            return Err(TweakError::InvalidScheme("document is not an object".to_string()));
        }
        serde_json::from_value(value).map_err(|e| TweakError::InvalidScheme(e.to_string()))
    }

    /// Convert to a JSON value.
    pub fn to_value(&self) -> TweakResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Load a scheme file.
    pub fn load(path: &Path) -> TweakResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
