use std::collections::HashMap;
use std::str::FromStr;

use crate::database::models::InvalidValue;
use crate::error::ApiError;

/// Collects per-field problems so a request can report all of them at once
#[derive(Debug, Default)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, problem: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| problem.into());
    }

    /// Record the error of a failed check under `field`
    pub fn check<T, E: ToString>(&mut self, field: &str, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.add(field, e.to_string());
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Validation failed", Some(self.0)))
        }
    }
}

/// Trimmed, non-empty text no longer than `max_chars`
pub fn required_text(value: Option<&str>, max_chars: usize) -> Result<String, String> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err("is required".to_string());
    }
    if trimmed.chars().count() > max_chars {
        return Err(format!("must be at most {} characters", max_chars));
    }
    Ok(trimmed.to_string())
}

/// Blank strings collapse to `None`
pub fn optional_text(value: Option<&str>, max_chars: usize) -> Result<Option<String>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) if text.chars().count() > max_chars => {
            Err(format!("must be at most {} characters", max_chars))
        }
        Some(text) => Ok(Some(text.to_string())),
    }
}

/// Parse one of the enumerated text values; the error lists the allowed set
pub fn enum_value<T>(value: &str) -> Result<T, String>
where
    T: FromStr<Err = InvalidValue>,
{
    value
        .parse::<T>()
        .map_err(|e| format!("must be one of: {}", e.expected))
}

pub fn parse_enum<T>(field: &str, value: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = InvalidValue>,
{
    enum_value(value).map_err(|problem| ApiError::invalid_field(field, problem))
}

pub fn parse_optional_enum<T>(field: &str, value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = InvalidValue>,
{
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_enum(field, text).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Role, SessionType};

    #[test]
    fn required_text_trims_and_bounds() {
        assert_eq!(required_text(Some("  hello "), 10).unwrap(), "hello");
        assert!(required_text(Some("   "), 10).is_err());
        assert!(required_text(None, 10).is_err());
        assert!(required_text(Some("abcdefghijk"), 10).is_err());
    }

    #[test]
    fn optional_text_collapses_blank() {
        assert_eq!(optional_text(Some("  "), 5).unwrap(), None);
        assert_eq!(optional_text(Some(" hi "), 5).unwrap(), Some("hi".to_string()));
        assert!(optional_text(Some("toolong"), 5).is_err());
    }

    #[test]
    fn enum_errors_list_allowed_values() {
        let err = parse_enum::<SessionType>("sessionType", "video").unwrap_err();
        let body = err.to_json();
        assert_eq!(body["field_errors"]["sessionType"], "must be one of: one_on_one, group");

        assert_eq!(parse_optional_enum::<Role>("role", Some("")).unwrap(), None);
        assert_eq!(parse_optional_enum::<Role>("role", Some("nurse")).unwrap(), Some(Role::Nurse));
    }

    #[test]
    fn field_errors_keep_first_problem() {
        let mut errors = FieldErrors::new();
        assert!(errors.is_empty());
        errors.add("email", "is required");
        errors.add("email", "is invalid");
        assert_eq!(errors.check::<i32, _>("age", Err("must be positive")), None);

        let body = errors.into_result().unwrap_err().to_json();
        assert_eq!(body["field_errors"]["email"], "is required");
        assert_eq!(body["field_errors"]["age"], "must be positive");
    }
}
