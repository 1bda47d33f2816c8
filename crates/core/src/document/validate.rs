//! Record validation run before a save is dispatched.
use serde_json::{Map, Value};
use thiserror::Error;

use crate::form::FieldSpec;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Validate that every required, visible field holds a non-blank value.
pub fn validate_required_fields(
    fields: &[FieldSpec],
    data: &Map<String, Value>,
) -> Result<(), ValidationError> {
    for spec in fields.iter().filter(|f| f.required && f.is_visible(data)) {
        let present = match data.get(spec.name) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(ValidationError::MissingField(spec.label));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Control;
    use serde_json::json;

    const FIELDS: &[FieldSpec] = &[
        FieldSpec::new("name", "Nome", Control::Text).required(),
        FieldSpec::new("year", "Ano", Control::Number).required(),
        FieldSpec::new("link", "Link", Control::Text)
            .required()
            .shown_when("status", "ongoing"),
    ];

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn accepts_complete_record() {
        let d = data(json!({"name": "Rex", "year": 2024, "status": "closed"}));
        assert!(validate_required_fields(FIELDS, &d).is_ok());
    }

    #[test]
    fn blank_text_is_missing() {
        let d = data(json!({"name": "  ", "year": 2024}));
        assert_eq!(
            validate_required_fields(FIELDS, &d),
            Err(ValidationError::MissingField("Nome"))
        );
    }

    #[test]
    fn shown_conditional_field_is_required() {
        let d = data(json!({"name": "a", "year": 1, "status": "ongoing", "link": ""}));
        assert_eq!(
            validate_required_fields(FIELDS, &d),
            Err(ValidationError::MissingField("Link"))
        );
    }
}
