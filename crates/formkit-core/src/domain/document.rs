//! Form Document
//!
//! Ordered fields plus groups. Field order is both edit order and render
//! order. The document is the unit of JSON import/export.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::domain::field::Field;
use crate::domain::group::Group;
use crate::error::ImportError;
use crate::validation::pattern_compiles;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDocument {
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

/// JSON export shape
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Bare array of fields
    FieldsOnly,
    /// `{ "fields": [...], "groups": [...] }`
    #[default]
    WithGroups,
}

/// Parsed import payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentPayload {
    /// Bare array: replaces fields, leaves groups alone
    Fields(Vec<Field>),
    /// Object form: replaces fields and groups
    Document(FormDocument),
}

impl DocumentPayload {
    pub fn fields(&self) -> &[Field] {
        match self {
            DocumentPayload::Fields(fields) => fields,
            DocumentPayload::Document(doc) => &doc.fields,
        }
    }

    /// Turn into a standalone document
    pub fn into_document(self) -> FormDocument {
        match self {
            DocumentPayload::Fields(fields) => FormDocument { fields, groups: Vec::new() },
            DocumentPayload::Document(doc) => doc,
        }
    }
}

impl FormDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id() == id)
    }

    pub fn field_mut(&mut self, id: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.id() == id)
    }

    pub fn field_index(&self, id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.id() == id)
    }

    pub fn field_by_label(&self, label: &str) -> Option<&Field> {
        self.fields.iter().rev().find(|f| f.label() == label)
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_mut(&mut self, id: &str) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    pub fn has_group(&self, id: &str) -> bool {
        self.group(id).is_some()
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self, format: ExportFormat) -> Result<String, serde_json::Error> {
        match format {
            ExportFormat::FieldsOnly => serde_json::to_string_pretty(&self.fields),
            ExportFormat::WithGroups => serde_json::to_string_pretty(self),
        }
    }

    /// Parse either import shape without touching any document
    pub fn parse_json(text: &str) -> Result<DocumentPayload, ImportError> {
        let value: Value = serde_json::from_str(text).map_err(ImportError::Syntax)?;
        let has_fields = value.get("fields").map_or(false, Value::is_array);
        if value.is_array() {
            serde_json::from_value(value)
                .map(DocumentPayload::Fields)
                .map_err(ImportError::InvalidDefinition)
        } else if value.is_object() && has_fields {
            serde_json::from_value(value)
                .map(DocumentPayload::Document)
                .map_err(ImportError::InvalidDefinition)
        } else {
            Err(ImportError::UnsupportedShape)
        }
    }

    /// Replace contents with an imported payload, atomically
    pub fn apply(&mut self, payload: DocumentPayload) {
        match payload {
            DocumentPayload::Fields(fields) => self.fields = fields,
            DocumentPayload::Document(doc) => *self = doc,
        }
    }

    /// Structural findings; never blocks editing
    pub fn lint(&self) -> Vec<LintFinding> {
        let mut findings = Vec::new();

        let mut seen_ids = HashSet::new();
        for field in &self.fields {
            if !seen_ids.insert(field.id()) {
                findings.push(LintFinding::for_field(field, LintKind::DuplicateFieldId));
            }
        }

        let mut seen_groups = HashSet::new();
        for group in &self.groups {
            if !seen_groups.insert(group.id.as_str()) {
                findings.push(LintFinding {
                    field_id: None,
                    kind: LintKind::DuplicateGroupId { group_id: group.id.clone() },
                });
            }
        }

        let mut by_label: HashMap<&str, Vec<String>> = HashMap::new();
        for field in &self.fields {
            by_label.entry(field.label()).or_default().push(field.id().to_string());
        }
        let mut collisions: Vec<_> = by_label.into_iter().filter(|(_, ids)| ids.len() > 1).collect();
        collisions.sort_by(|a, b| a.0.cmp(b.0));
        for (label, field_ids) in collisions {
            findings.push(LintFinding {
                field_id: None,
                kind: LintKind::DuplicateLabel { label: label.to_string(), field_ids },
            });
        }

        for field in &self.fields {
            if let Some(group_id) = field.group_id() {
                if !seen_groups.contains(group_id) {
                    findings.push(LintFinding::for_field(
                        field,
                        LintKind::DanglingGroup { group_id: group_id.to_string() },
                    ));
                }
            }
            for pattern in field.patterns() {
                if let Err(e) = pattern_compiles(pattern) {
                    findings.push(LintFinding::for_field(
                        field,
                        LintKind::InvalidPattern { pattern: pattern.to_string(), reason: e.to_string() },
                    ));
                }
            }
            findings.extend(Self::lint_options(field));
        }

        findings
    }

    fn lint_options(field: &Field) -> Vec<LintFinding> {
        let mut findings = Vec::new();
        match field {
            Field::Radio(f) => {
                if f.options.is_empty() {
                    findings.push(LintFinding::for_field(field, LintKind::NoOptions));
                }
                if let Some(default) = &f.default_value {
                    if !f.options.contains(default) {
                        findings.push(LintFinding::for_field(
                            field,
                            LintKind::DefaultNotAnOption { value: default.clone() },
                        ));
                    }
                }
            }
            Field::Checkbox(f) => {
                if f.options.is_empty() {
                    findings.push(LintFinding::for_field(field, LintKind::NoOptions));
                }
                for value in f.default_value.iter().flatten() {
                    if !f.options.contains(value) {
                        findings.push(LintFinding::for_field(
                            field,
                            LintKind::DefaultNotAnOption { value: value.clone() },
                        ));
                    }
                }
                for value in f.required_options.iter().flatten() {
                    if !f.options.contains(value) {
                        findings.push(LintFinding::for_field(
                            field,
                            LintKind::RequiredNotAnOption { value: value.clone() },
                        ));
                    }
                }
            }
            Field::Text(_) | Field::List(_) | Field::Map(_) => {}
        }
        findings
    }
}

/// How serious a lint finding is
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LintKind {
    DuplicateFieldId,
    DuplicateGroupId { group_id: String },
    /// Fields sharing a label overwrite each other in the output object
    DuplicateLabel { label: String, field_ids: Vec<String> },
    DanglingGroup { group_id: String },
    InvalidPattern { pattern: String, reason: String },
    NoOptions,
    DefaultNotAnOption { value: String },
    RequiredNotAnOption { value: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LintFinding {
    pub field_id: Option<String>,
    #[serde(flatten)]
    pub kind: LintKind,
}

impl LintFinding {
    fn for_field(field: &Field, kind: LintKind) -> Self {
        Self { field_id: Some(field.id().to_string()), kind }
    }

    pub fn severity(&self) -> Severity {
        match self.kind {
            LintKind::DuplicateFieldId
            | LintKind::DuplicateGroupId { .. }
            | LintKind::InvalidPattern { .. } => Severity::Error,
            LintKind::DuplicateLabel { .. }
            | LintKind::DanglingGroup { .. }
            | LintKind::NoOptions
            | LintKind::DefaultNotAnOption { .. }
            | LintKind::RequiredNotAnOption { .. } => Severity::Warning,
        }
    }
}

impl fmt::Display for LintFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = &self.field_id {
            write!(f, "field {}: ", id)?;
        }
        match &self.kind {
            LintKind::DuplicateFieldId => write!(f, "duplicate field id"),
            LintKind::DuplicateGroupId { group_id } => write!(f, "duplicate group id {}", group_id),
            LintKind::DuplicateLabel { label, field_ids } => write!(
                f,
                "label {:?} is shared by fields {}; the last one wins in submissions",
                label,
                field_ids.join(", ")
            ),
            LintKind::DanglingGroup { group_id } => write!(f, "references missing group {}", group_id),
            LintKind::InvalidPattern { pattern, reason } => write!(f, "pattern {:?} does not compile: {}", pattern, reason),
            LintKind::NoOptions => write!(f, "has no options"),
            LintKind::DefaultNotAnOption { value } => write!(f, "default {:?} is not one of the options", value),
            LintKind::RequiredNotAnOption { value } => write!(f, "required option {:?} is not one of the options", value),
        }
    }
}
