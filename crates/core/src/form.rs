//! Field-to-control mapping shared by every item schema.
//!
//! A [`FieldSpec`] table describes how each JSON field of a record is edited.
//! The renderer walks the table to build controls; [`apply_values`] walks it
//! to turn submitted form values back into a typed record.

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

/// Raw values posted by an edit form, keyed by field name.
pub type FormValues = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Text,
    TextArea { rows: u8 },
    Number,
    Select(&'static [SelectOption]),
    /// Boolean field.
    Checkbox,
    /// String enum edited as a checkbox.
    Toggle {
        on: &'static str,
        off: &'static str,
    },
}

/// Show a field only while another field holds a given value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShownWhen {
    pub field: &'static str,
    pub equals: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// JSON key of the field in the stored document.
    pub name: &'static str,
    pub label: &'static str,
    pub control: Control,
    pub required: bool,
    pub shown_when: Option<ShownWhen>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, control: Control) -> Self {
        Self {
            name,
            label,
            control,
            required: false,
            shown_when: None,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn shown_when(mut self, field: &'static str, equals: &'static str) -> Self {
        self.shown_when = Some(ShownWhen { field, equals });
        self
    }

    /// Text to pre-fill a value control with.
    pub fn display_value(&self, data: &Map<String, Value>) -> String {
        match data.get(self.name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    /// Checked state for checkbox and toggle controls.
    pub fn is_checked(&self, data: &Map<String, Value>) -> bool {
        match (self.control, data.get(self.name)) {
            (Control::Checkbox, Some(Value::Bool(b))) => *b,
            (Control::Toggle { on, .. }, Some(Value::String(s))) => s == on,
            _ => false,
        }
    }

    /// Whether the field is currently visible given the other field values.
    pub fn is_visible(&self, data: &Map<String, Value>) -> bool {
        match self.shown_when {
            None => true,
            Some(cond) => {
                matches!(data.get(cond.field), Some(Value::String(s)) if s == cond.equals)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("{field}: {value:?} is not a number")]
    InvalidNumber { field: &'static str, value: String },
    #[error("{field}: {value:?} is not one of the allowed options")]
    InvalidOption { field: &'static str, value: String },
    #[error("record could not be rebuilt from the form: {0}")]
    Decode(String),
}

fn is_truthy(raw: &str) -> bool {
    matches!(raw, "on" | "true" | "1" | "yes")
}

/// Serialize a record into its JSON object form.
pub fn to_data<R: Serialize>(record: &R) -> Map<String, Value> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Rebuild a record from submitted form values.
///
/// Value controls missing from `values` keep the record's current value.
/// Checkbox and toggle controls follow HTML form semantics: absent means off.
pub fn apply_values<R>(record: &R, fields: &[FieldSpec], values: &FormValues) -> Result<R, FormError>
where
    R: Serialize + DeserializeOwned,
{
    let mut data = to_data(record);

    for spec in fields {
        let submitted = values.get(spec.name);
        let next = match spec.control {
            Control::Text | Control::TextArea { .. } => submitted.map(|v| Value::String(v.clone())),
            Control::Number => match submitted {
                Some(raw) => {
                    let parsed: i64 = raw.trim().parse().map_err(|_| FormError::InvalidNumber {
                        field: spec.name,
                        value: raw.clone(),
                    })?;
                    Some(Value::from(parsed))
                }
                None => None,
            },
            Control::Select(options) => match submitted {
                Some(raw) => {
                    if !options.iter().any(|o| o.value == raw) {
                        return Err(FormError::InvalidOption {
                            field: spec.name,
                            value: raw.clone(),
                        });
                    }
                    Some(Value::String(raw.clone()))
                }
                None => None,
            },
            Control::Checkbox => Some(Value::Bool(submitted.is_some_and(|v| is_truthy(v)))),
            Control::Toggle { on, off } => {
                let checked = submitted.is_some_and(|v| is_truthy(v));
                Some(Value::String(if checked { on } else { off }.to_string()))
            }
        };
        if let Some(value) = next {
            data.insert(spec.name.to_string(), value);
        }
    }

    serde_json::from_value(Value::Object(data)).map_err(|e| FormError::Decode(e.to_string()))
}
