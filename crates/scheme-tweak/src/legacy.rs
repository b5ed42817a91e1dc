//! Legacy settings-list scheme format.
//!
//! The legacy layout keeps everything in one `settings` array. The first
//! entry carries the global options with camelCase keys; every later entry
//! is a rule with its colors nested under its own `settings` object.

use crate::error::{TweakError, TweakResult};
use crate::scheme::{ColorScheme, Foreground, GlobalsKey, Present, Rule};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// File extension of current-format schemes.
pub const CURRENT_EXTENSION: &str = "sublime-color-scheme";

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemeFormat {
    #[default]
    Current,
    Legacy,
}

impl SchemeFormat {
    /// Format implied by a file name. Anything but a
    /// `.sublime-color-scheme` file is treated as legacy.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case(CURRENT_EXTENSION) => Self::Current,
            _ => Self::Legacy,
        }
    }

    /// Render a scheme in this format.
    pub fn render(&self, scheme: &ColorScheme) -> TweakResult<Value> {
        match self {
            Self::Current => scheme.to_value(),
            Self::Legacy => Ok(to_legacy(scheme)),
        }
    }
}

impl FromStr for SchemeFormat {
    type Err = TweakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "current" => Ok(Self::Current),
            "legacy" => Ok(Self::Legacy),
            other => Err(TweakError::InvalidScheme(format!("unknown format: {}", other))),
        }
    }
}

impl fmt::Display for SchemeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

/// `line_highlight` -> `lineHighlight`
pub fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars();
    while let Some(c) = chars.next() {
        if c == '_' {
            match chars.next() {
                Some(next) => out.extend(next.to_uppercase()),
                None => out.push('_'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// `lineHighlight` -> `line_highlight`
pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_uppercase() {
            out.push('_');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Keys of a legacy rule entry that map onto [`Rule`] fields.
const RULE_ENTRY_KEYS: &[&str] = &["name", "scope", "settings", "selectionForeground"];

fn insert_non_empty(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
}

/// Convert a scheme to the legacy layout.
///
/// Global keys become camelCase. Gradient foregrounds and `variables` have
/// no legacy form and are dropped; other top-level keys are copied.
pub fn to_legacy(scheme: &ColorScheme) -> Value {
    let mut doc = scheme.extra.clone();

    let globals: Map<String, Value> = scheme
        .globals
        .iter()
        .map(|(k, v)| (snake_to_camel(k), v.clone()))
        .collect();

    let mut settings = vec![Value::Object(Map::from_iter([(
        "settings".to_string(),
        Value::Object(globals),
    )]))];

    for rule in &scheme.rules {
        let mut entry = Map::new();
        insert_non_empty(&mut entry, "name", rule.name.as_deref());
        insert_non_empty(&mut entry, "scope", rule.scope.as_deref());
        insert_non_empty(&mut entry, "selectionForeground", rule.selection_foreground.as_deref());

        let mut colors = Map::new();
        insert_non_empty(
            &mut colors,
            "foreground",
            rule.foreground.as_ref().and_then(Foreground::as_single),
        );
        insert_non_empty(&mut colors, "background", rule.background.as_deref());
        insert_non_empty(&mut colors, "fontStyle", rule.font_style());
        entry.insert("settings".to_string(), Value::Object(colors));

        settings.push(Value::Object(entry));
    }

    doc.insert("settings".to_string(), Value::Array(settings));
    Value::Object(doc)
}

/// Read a legacy-layout document.
///
/// The first entry without a `scope` supplies the globals. With
/// `snake_case_globals`, global keys are converted to snake_case.
pub fn from_legacy(value: &Value, snake_case_globals: bool) -> TweakResult<ColorScheme> {
    let doc = value
        .as_object()
        .ok_or_else(|| TweakError::InvalidScheme("document is not an object".to_string()))?;
    let entries = doc
        .get("settings")
        .and_then(Value::as_array)
        .ok_or_else(|| TweakError::InvalidScheme("missing settings array".to_string()))?;

    let mut scheme = ColorScheme {
        globals_key: GlobalsKey::Globals,
        present: Present {
            globals: true,
            rules: true,
        },
        ..ColorScheme::default()
    };
    scheme.extra = doc
        .iter()
        .filter(|(k, _)| k.as_str() != "settings")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let mut have_globals = false;
    for entry in entries {
        let Some(entry) = entry.as_object() else {
            tracing::debug!("skipping non-object settings entry");
            continue;
        };
        let colors = entry.get("settings").and_then(Value::as_object);

        if !have_globals && !entry.contains_key("scope") {
            have_globals = true;
            if let Some(colors) = colors {
                scheme.globals = colors
                    .iter()
                    .map(|(k, v)| {
                        let key = if snake_case_globals { camel_to_snake(k) } else { k.clone() };
                        (key, v.clone())
                    })
                    .collect();
            }
            continue;
        }

        let extra: Map<String, Value> = entry
            .iter()
            .filter(|(k, _)| !RULE_ENTRY_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let text = |map: Option<&Map<String, Value>>, key: &str| {
            map.and_then(|m| m.get(key))
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        scheme.rules.push(Rule {
            name: text(Some(entry), "name"),
            scope: text(Some(entry), "scope"),
            foreground: text(colors, "foreground").map(Foreground::Single),
            background: text(colors, "background"),
            font_style: text(colors, "fontStyle"),
            selection_foreground: text(Some(entry), "selectionForeground")
                .or_else(|| text(colors, "selectionForeground")),
            extra,
        });
    }

    Ok(scheme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scheme() -> ColorScheme {
        let mut gradient = Rule::new("string").gradient(["#FF0000", "#00FF00"]);
        gradient.background = Some("#101010".to_string());

        let mut comment = Rule::new("comment").foreground("#808080");
        comment.name = Some("Comment".to_string());
        comment.font_style = Some("italic".to_string());
        comment.selection_foreground = Some("#FFFFFF".to_string());

        let mut scheme = ColorScheme::new()
            .global("background", "#000000")
            .global("line_highlight", "#111111")
            .rule(comment)
            .rule(gradient)
            .rule(Rule::new("plain"));
        scheme.variables = Some(json!({ "x": "#123456" }));
        scheme.extra.insert("name".to_string(), json!("Sample"));
        scheme
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SchemeFormat::from_path(Path::new("a/Mono.sublime-color-scheme")), SchemeFormat::Current);
        assert_eq!(SchemeFormat::from_path(Path::new("Mono.tmTheme")), SchemeFormat::Legacy);
        assert_eq!(SchemeFormat::from_path(Path::new("Mono")), SchemeFormat::Legacy);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("legacy".parse::<SchemeFormat>().unwrap(), SchemeFormat::Legacy);
        assert_eq!("Current".parse::<SchemeFormat>().unwrap(), SchemeFormat::Current);
        assert!("xml".parse::<SchemeFormat>().is_err());
    }

    #[test]
    fn test_key_case() {
        assert_eq!(snake_to_camel("line_highlight"), "lineHighlight");
        assert_eq!(snake_to_camel("background"), "background");
        assert_eq!(snake_to_camel("trailing_"), "trailing_");
        assert_eq!(camel_to_snake("lineHighlight"), "line_highlight");
        assert_eq!(camel_to_snake("selectionBorder"), "selection_border");
    }

    #[test]
    fn test_to_legacy() {
        let legacy = to_legacy(&scheme());
        let expected = json!({
            "name": "Sample",
            "settings": [
                { "settings": { "background": "#000000", "lineHighlight": "#111111" } },
                {
                    "name": "Comment",
                    "scope": "comment",
                    "selectionForeground": "#FFFFFF",
                    "settings": { "foreground": "#808080", "fontStyle": "italic" }
                },
                { "scope": "string", "settings": { "background": "#101010" } },
                { "scope": "plain", "settings": {} }
            ]
        });
        assert_eq!(legacy, expected);
    }

    #[test]
    fn test_to_legacy_compact() {
        let scheme = ColorScheme::new()
            .global("caret", "#FFFFFF")
            .rule(Rule::new("keyword").foreground("#FF0000"));
        let text = serde_json::to_string(&to_legacy(&scheme)).unwrap();
        insta::assert_snapshot!(
            text,
            @r##"{"settings":[{"settings":{"caret":"#FFFFFF"}},{"scope":"keyword","settings":{"foreground":"#FF0000"}}]}"##
        );
    }

    #[test]
    fn test_from_legacy() {
        let legacy = to_legacy(&scheme());
        let back = from_legacy(&legacy, true).unwrap();
        assert_eq!(back.global_str("line_highlight"), Some("#111111"));
        assert_eq!(back.rules.len(), 3);
        assert_eq!(back.rules[0].font_style(), Some("italic"));
        assert_eq!(back.rules[0].selection_foreground.as_deref(), Some("#FFFFFF"));
        assert_eq!(back.rules[1].foreground, None);
        assert_eq!(back.rules[1].background.as_deref(), Some("#101010"));
        assert_eq!(back.extra.get("name"), Some(&json!("Sample")));

        let camel = from_legacy(&legacy, false).unwrap();
        assert_eq!(camel.global_str("lineHighlight"), Some("#111111"));
    }

    #[test]
    fn test_from_legacy_keeps_unknown_rule_keys() {
        let legacy = json!({
            "settings": [
                { "settings": {} },
                { "scope": "comment", "uuid": "1234", "settings": { "foreground": "#777777" } }
            ]
        });
        let scheme = from_legacy(&legacy, false).unwrap();
        assert_eq!(scheme.rules[0].extra.get("uuid"), Some(&json!("1234")));
        assert!(!scheme.rules[0].extra.contains_key("settings"));
        assert!(!scheme.rules[0].extra.contains_key("scope"));
    }

    #[test]
    fn test_from_legacy_writes_both_blocks() {
        let scheme = from_legacy(&json!({ "settings": [] }), false).unwrap();
        assert_eq!(scheme.to_value().unwrap(), json!({ "globals": {}, "rules": [] }));
    }

    #[test]
    fn test_from_legacy_rejects_bad_shape() {
        assert!(from_legacy(&json!({ "rules": [] }), false).is_err());
        assert!(from_legacy(&json!("text"), false).is_err());
    }

    #[test]
    fn test_render() {
        let scheme = scheme();
        assert_eq!(SchemeFormat::Current.render(&scheme).unwrap(), scheme.to_value().unwrap());
        assert_eq!(SchemeFormat::Legacy.render(&scheme).unwrap(), to_legacy(&scheme));
    }
}
