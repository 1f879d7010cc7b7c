//! Validation rules
//!
//! Two rule families: pattern validation (text, list entries, map keys and
//! values) and required-subset validation (checkboxes). Results are data
//! attached to a field id; nothing here panics or aborts a submit on its own.

use regex::Regex;
use thiserror::Error;

use crate::domain::field::Field;
use crate::domain::value::FieldValue;

/// Separator used when listing missing options
pub const LIST_SEPARATOR: &str = ", ";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The configured pattern does not compile
    #[error("validation pattern \"{pattern}\" is invalid")]
    InvalidPattern { pattern: String },

    #[error("value does not match pattern \"{pattern}\"")]
    PatternMismatch { pattern: String },

    /// Checkbox selection lacks required options
    #[error("{message}")]
    RequiredMissing { missing: Vec<String>, message: String },

    #[error("entry {}: {error}", .index + 1)]
    Entry { index: usize, error: Box<ValidationError> },

    #[error("key \"{key}\": {error}")]
    MapKey { key: String, error: Box<ValidationError> },

    #[error("value of \"{key}\": {error}")]
    MapValue { key: String, error: Box<ValidationError> },
}

impl ValidationError {
    /// Innermost error, with list/map location stripped
    pub fn root(&self) -> &ValidationError {
        match self {
            ValidationError::Entry { error, .. }
            | ValidationError::MapKey { error, .. }
            | ValidationError::MapValue { error, .. } => error.root(),
            other => other,
        }
    }
}

/// Test `candidate` against an optional pattern.
///
/// No pattern is always valid. A pattern that fails to compile is reported
/// as [`ValidationError::InvalidPattern`] whatever the candidate is.
pub fn check_pattern(pattern: Option<&str>, candidate: &str) -> Result<(), ValidationError> {
    let Some(pattern) = pattern else {
        return Ok(());
    };
    let regex = Regex::new(pattern).map_err(|_| ValidationError::InvalidPattern {
        pattern: pattern.to_string(),
    })?;
    if regex.is_match(candidate) {
        Ok(())
    } else {
        Err(ValidationError::PatternMismatch {
            pattern: pattern.to_string(),
        })
    }
}

/// Whether `pattern` compiles
pub fn pattern_compiles(pattern: &str) -> Result<(), regex::Error> {
    Regex::new(pattern).map(|_| ())
}

/// Required-subset rule: every required option must be checked
pub fn check_required(
    required: &[String],
    checked: &[String],
    custom_message: Option<&str>,
) -> Result<(), ValidationError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|option| !checked.contains(option))
        .cloned()
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    let message = match custom_message.filter(|m| !m.is_empty()) {
        Some(custom) => custom.to_string(),
        None => format!("The following options are required: {}", missing.join(LIST_SEPARATOR)),
    };
    Err(ValidationError::RequiredMissing { missing, message })
}

/// Evaluate `value` against `field`'s rules.
///
/// A value of the wrong shape for the field's kind is treated as empty.
pub fn validate_value(field: &Field, value: &FieldValue) -> Option<ValidationError> {
    match field {
        Field::Text(f) => {
            let text = value.as_text().unwrap_or_default();
            check_pattern(f.validation_regex.as_deref(), text).err()
        }
        Field::Radio(_) => None,
        Field::Checkbox(f) => {
            let required = f.required_options.as_deref().unwrap_or_default();
            let checked = value.as_selection().unwrap_or_default();
            check_required(required, checked, f.error_message.as_deref()).err()
        }
        Field::List(f) => {
            let entries = value.as_selection().unwrap_or_default();
            entries.iter().enumerate().find_map(|(index, entry)| {
                check_pattern(f.validation_regex.as_deref(), entry)
                    .err()
                    .map(|error| ValidationError::Entry { index, error: Box::new(error) })
            })
        }
        Field::Map(f) => {
            let entries = value.as_entries()?;
            entries.iter().find_map(|(key, val)| {
                if let Err(error) = check_pattern(f.key_validation_regex.as_deref(), key) {
                    return Some(ValidationError::MapKey { key: key.clone(), error: Box::new(error) });
                }
                check_pattern(f.value_validation_regex.as_deref(), val)
                    .err()
                    .map(|error| ValidationError::MapValue { key: key.clone(), error: Box::new(error) })
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::field::{FieldKind, ListField, MapField, TextField};
    use indexmap::IndexMap;
    use proptest::prelude::*;

    fn text_field(pattern: &str) -> Field {
        let mut field = Field::new(FieldKind::Text, "t");
        if let Field::Text(TextField { validation_regex, .. }) = &mut field {
            *validation_regex = Some(pattern.to_string());
        }
        field
    }

    #[test]
    fn test_no_pattern_is_valid() {
        assert!(check_pattern(None, "anything").is_ok());
    }

    #[test]
    fn test_mismatch_message_contains_pattern() {
        let err = check_pattern(Some("^[0-9]+$"), "12a3").unwrap_err();
        assert!(err.to_string().contains("^[0-9]+$"));
        assert!(matches!(err, ValidationError::PatternMismatch { .. }));
        assert!(check_pattern(Some("^[0-9]+$"), "123").is_ok());
    }

    #[test]
    fn test_invalid_pattern_is_distinct() {
        let err = check_pattern(Some("([a-z"), "abc").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPattern { .. }));
        assert_ne!(err, ValidationError::PatternMismatch { pattern: "([a-z".into() });
    }

    #[test]
    fn test_required_uses_custom_message() {
        let required = vec!["A".to_string()];
        let err = check_required(&required, &[], Some("Please accept A")).unwrap_err();
        assert_eq!(err.to_string(), "Please accept A");

        let err = check_required(&["A".into(), "B".into()], &["B".into()], None).unwrap_err();
        assert_eq!(err.to_string(), "The following options are required: A");
    }

    #[test]
    fn test_list_entries_report_index() {
        let field = Field::List(ListField {
            common: Default::default(),
            default_value: None,
            validation_regex: Some("^[a-z]+$".into()),
        });
        let value = FieldValue::Selection(vec!["ok".into(), "NO".into()]);
        let err = validate_value(&field, &value).unwrap();
        assert!(err.to_string().starts_with("entry 2:"));
        assert!(matches!(err.root(), ValidationError::PatternMismatch { .. }));
    }

    #[test]
    fn test_map_key_checked_before_value() {
        let field = Field::Map(MapField {
            common: Default::default(),
            default_value: None,
            key_validation_regex: Some("^[a-z_]+$".into()),
            value_validation_regex: Some("^[0-9]+$".into()),
        });
        let mut entries = IndexMap::new();
        entries.insert("port".to_string(), "80a".to_string());
        let err = validate_value(&field, &FieldValue::Entries(entries.clone())).unwrap();
        assert!(matches!(err, ValidationError::MapValue { .. }));

        entries.insert("Bad Key".to_string(), "1".to_string());
        entries.shift_remove("port");
        let err = validate_value(&field, &FieldValue::Entries(entries)).unwrap();
        assert!(matches!(err, ValidationError::MapKey { .. }));
    }

    proptest! {
        #[test]
        fn prop_text_valid_iff_pattern_matches(candidate in "[0-9a-z]{0,8}") {
            let field = text_field("^[0-9]+$");
            let expected = !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_digit());
            let result = validate_value(&field, &FieldValue::Text(candidate));
            prop_assert_eq!(result.is_none(), expected);
        }

        #[test]
        fn prop_uncompilable_pattern_always_invalid(candidate in ".{0,12}") {
            let field = text_field("(unclosed");
            let result = validate_value(&field, &FieldValue::Text(candidate));
            let invalid = matches!(result, Some(ValidationError::InvalidPattern { .. }));
            prop_assert!(invalid, "expected an invalid pattern error");
        }

        #[test]
        fn prop_required_subset(
            required in proptest::sample::subsequence(vec!["A", "B", "C", "D"], 0..=4),
            checked in proptest::sample::subsequence(vec!["A", "B", "C", "D"], 0..=4),
        ) {
            let required: Vec<String> = required.into_iter().map(String::from).collect();
            let checked: Vec<String> = checked.into_iter().map(String::from).collect();
            let subset = required.iter().all(|r| checked.contains(r));
            prop_assert_eq!(check_required(&required, &checked, None).is_ok(), subset);
        }
    }
}
