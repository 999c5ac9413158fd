//! User-supplied task configuration.
//!
//! The runtime passes options as an untyped JSON object edited through
//! the workflow UI, so values arrive with whatever type the form (or a
//! hand-written API call) produced. Accessors coerce instead of rejecting.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Strings that read as an unchecked box.
const FALSE_STRINGS: &[&str] = &["", "false", "0", "no", "off"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskConfig(Map<String, Value>);

impl TaskConfig {
    /// Raw value; an explicit `null` counts as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    /// Boolean option, `default` when absent.
    pub fn flag(&self, name: &str, default: bool) -> bool {
        match self.get(name) {
            None => default,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(Value::String(s)) => {
                let s = s.trim().to_ascii_lowercase();
                !FALSE_STRINGS.contains(&s.as_str())
            }
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
            Some(Value::Null) => default,
        }
    }

    /// String option, empty when absent.
    ///
    /// Arrays are flattened to one element per line so a list of paths
    /// behaves like the equivalent textarea content.
    pub fn text(&self, name: &str) -> String {
        self.get(name).map(coerce_to_string).unwrap_or_default()
    }

    /// String option trimmed, `None` when absent or blank.
    pub fn optional_text(&self, name: &str) -> Option<String> {
        let text = self.text(name);
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(coerce_to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}
