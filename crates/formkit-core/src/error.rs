//! Error types for the form engine

use thiserror::Error;

use crate::domain::field::FieldKind;

/// Rejected JSON import; the document is left untouched
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("failed to parse JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("JSON must be an array of fields or an object with a \"fields\" array")]
    UnsupportedShape,

    #[error("invalid field definition: {0}")]
    InvalidDefinition(#[source] serde_json::Error),
}

/// Session operation addressed a field it cannot apply to
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no field with id {0}")]
    UnknownField(String),

    #[error("field {id} is a {actual} field, expected {expected}")]
    WrongKind {
        id: String,
        expected: FieldKind,
        actual: FieldKind,
    },

    #[error("field {id} has no option {option:?}")]
    UnknownOption { id: String, option: String },

    #[error("field {id} has no entry at index {index}")]
    EntryOutOfRange { id: String, index: usize },

    #[error("value does not fit {kind} field {id}")]
    ValueShape { id: String, kind: FieldKind },
}

/// Why a submit could not start
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitBlocked {
    #[error("the form has validation errors")]
    ValidationErrors,

    #[error("a submission is already in flight")]
    AlreadySubmitting,
}
