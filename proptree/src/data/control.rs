use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CollectError;

/// One editable property field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyControl {
    /// Declared identifier: a dotted path in nested mode, a bare name in flat mode.
    pub path: String,
    /// Label shown next to the control.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    /// Declared value type, drives coercion.
    #[serde(default)]
    pub value_type: ValueType,
    /// Whether an empty value blocks saving.
    #[serde(default)]
    pub required: bool,
    /// Current raw value as entered by the user.
    #[serde(default)]
    pub raw: RawValue,
}

/// Supported control value types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Free text, collected verbatim.
    #[default]
    Text,
    /// Integer input.
    Number,
    /// Boolean toggle, collected from its checked state.
    Checkbox,
    /// Choice among fixed options, collected as the selected string.
    Select(Vec<String>),
}

/// Raw value held by a control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Checked state of a checkbox.
    Checked(bool),
    /// Text content of any other control.
    Text(String),
}

impl Default for RawValue {
    fn default() -> Self {
        RawValue::Text(String::new())
    }
}

impl RawValue {
    /// The value as text; a checked box reports `"on"` like a browser form
    /// does, an unchecked one is empty.
    pub fn as_text(&self) -> &str {
        match self {
            RawValue::Text(s) => s,
            RawValue::Checked(true) => "on",
            RawValue::Checked(false) => "",
        }
    }

    /// Checked state; text counts as checked when it reads `true`, `on` or `1`.
    pub fn is_checked(&self) -> bool {
        match self {
            RawValue::Checked(b) => *b,
            RawValue::Text(s) => is_truthy(s),
        }
    }
}

impl PropertyControl {
    /// Create a text control with the given declared path.
    pub fn text(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: String::new(),
            value_type: ValueType::Text,
            required: false,
            raw: RawValue::Text(value.into()),
        }
    }

    /// Create a number control with the given declared path and raw text.
    pub fn number(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            value_type: ValueType::Number,
            ..Self::text(path, value)
        }
    }

    /// Create a checkbox control.
    pub fn checkbox(path: impl Into<String>, checked: bool) -> Self {
        Self {
            path: path.into(),
            label: String::new(),
            value_type: ValueType::Checkbox,
            required: false,
            raw: RawValue::Checked(checked),
        }
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Mark the control as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Label used in user-facing messages, falling back to the path.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.path
        } else {
            &self.label
        }
    }

    /// Whether the effective value counts as empty for required checks.
    pub fn is_empty(&self) -> bool {
        match self.value_type {
            ValueType::Checkbox => !self.raw.is_checked(),
            _ => self.raw.as_text().is_empty(),
        }
    }

    /// Coerce the raw value into its typed JSON form.
    pub fn coerce(&self) -> Result<Value, CollectError> {
        match &self.value_type {
            ValueType::Number => {
                let text = self.raw.as_text();
                parse_leading_int(text)
                    .map(Value::from)
                    .ok_or_else(|| CollectError::InvalidNumber {
                        path: self.path.clone(),
                        value: text.to_string(),
                    })
            }
            ValueType::Checkbox => Ok(Value::Bool(self.raw.is_checked())),
            ValueType::Text | ValueType::Select(_) => {
                Ok(Value::String(self.raw.as_text().to_string()))
            }
        }
    }

    /// Set the value from user input.
    ///
    /// Checkboxes read `true`, `on` and `1` as checked and anything else as
    /// unchecked; every other control keeps the text as entered.
    pub fn set_input(&mut self, input: &str) {
        self.raw = match self.value_type {
            ValueType::Checkbox => RawValue::Checked(is_truthy(input)),
            _ => RawValue::Text(input.to_string()),
        };
    }

    /// Set the value from a server-side JSON value.
    ///
    /// Returns `false` when the value has a shape the control cannot hold.
    pub fn update_from_value(&mut self, value: &Value) -> bool {
        match (&self.value_type, value) {
            (ValueType::Checkbox, Value::Bool(b)) => self.raw = RawValue::Checked(*b),
            (ValueType::Checkbox, Value::String(s)) => self.raw = RawValue::Checked(is_truthy(s)),
            (ValueType::Checkbox, Value::Number(n)) => {
                self.raw = RawValue::Checked(n.as_f64().is_some_and(|v| v != 0.0))
            }
            (_, Value::String(s)) => self.raw = RawValue::Text(s.clone()),
            (_, Value::Number(n)) => self.raw = RawValue::Text(n.to_string()),
            (_, Value::Bool(b)) => self.raw = RawValue::Text(b.to_string()),
            (_, Value::Null) => self.raw = RawValue::default(),
            _ => return false,
        }
        true
    }
}

fn is_truthy(s: &str) -> bool {
    matches!(s.trim(), "true" | "on" | "1")
}

/// Parse the integer at the start of `s`, the way browser forms do.
///
/// Leading whitespace and a sign are accepted and trailing garbage is
/// ignored, so `" 42px"` yields 42. Returns `None` when no digit follows.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
