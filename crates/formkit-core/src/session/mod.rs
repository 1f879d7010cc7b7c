//! User-side form session
//!
//! Holds the live values a user has entered against a read-only
//! [`FormDocument`], validates on every change, partitions fields into
//! sections and assembles the label-keyed output object on submit.
//!
//! Value resolution for a field, in order:
//! 1. an explicit edit made in this session
//! 2. the field's static default
//! 3. the empty value for its kind
//!
//! A checkbox counts as touched from its first check or uncheck onward. An
//! emptied selection is then kept as is and never falls back to the default.

mod notice;

pub use notice::{Notice, NoticeKind, NOTICE_LIFETIME};

use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::document::FormDocument;
use crate::domain::field::{Field, FieldKind};
use crate::domain::group::Group;
use crate::domain::submission::{FormData, Submission};
use crate::domain::value::FieldValue;
use crate::error::{SessionError, SubmitBlocked};
use crate::validation::{validate_value, ValidationError};

/// Whether the next submit creates or updates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionMode {
    #[default]
    Create,
    Edit { submission_id: i64 },
}

/// What the caller should send to the persistence service
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitRequest {
    Create { form_data: FormData },
    Update { id: i64, form_data: FormData },
}

impl SubmitRequest {
    pub fn form_data(&self) -> &FormData {
        match self {
            SubmitRequest::Create { form_data } | SubmitRequest::Update { form_data, .. } => form_data,
        }
    }
}

/// One rendered block of fields
#[derive(Clone, Debug, PartialEq)]
pub struct Section<'a> {
    /// `None` for the ungrouped pass
    pub group: Option<&'a Group>,
    pub fields: Vec<&'a Field>,
    pub collapsed: bool,
}

#[derive(Debug)]
pub struct FormSession {
    document: FormDocument,
    values: HashMap<String, FieldValue>,
    errors: BTreeMap<String, ValidationError>,
    collapsed: HashMap<String, bool>,
    mode: SessionMode,
    submitting: bool,
    notice: Option<Notice>,
}

impl FormSession {
    pub fn new(document: FormDocument) -> Self {
        Self {
            document,
            values: HashMap::new(),
            errors: BTreeMap::new(),
            collapsed: HashMap::new(),
            mode: SessionMode::Create,
            submitting: false,
            notice: None,
        }
    }

    pub fn document(&self) -> &FormDocument {
        &self.document
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    // =========================================================================
    // Values
    // =========================================================================

    /// Current value of a field, `None` for an unknown id
    pub fn resolved_value(&self, id: &str) -> Option<FieldValue> {
        let field = self.document.field(id)?;
        Some(self.resolve(field))
    }

    fn resolve(&self, field: &Field) -> FieldValue {
        if let Some(value) = self.values.get(field.id()) {
            return value.clone();
        }
        if let Field::Checkbox(f) = field {
            let checked = f
                .default_value
                .iter()
                .flatten()
                .filter(|v| f.options.contains(v))
                .cloned()
                .collect();
            return FieldValue::Selection(checked);
        }
        FieldValue::default_for(field).unwrap_or_else(|| FieldValue::empty_for(field.kind()))
    }

    /// Value as submitted: untouched fields send their default unfiltered
    fn output_value(&self, field: &Field) -> FieldValue {
        self.values
            .get(field.id())
            .cloned()
            .or_else(|| FieldValue::default_for(field))
            .unwrap_or_else(|| FieldValue::empty_for(field.kind()))
    }

    pub fn is_touched(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    pub fn set_text(&mut self, id: &str, text: &str) -> Result<(), SessionError> {
        self.expect_kind(id, FieldKind::Text)?;
        self.store(id, FieldValue::Text(text.to_string()));
        Ok(())
    }

    pub fn select_option(&mut self, id: &str, option: &str) -> Result<(), SessionError> {
        let field = self.expect_kind(id, FieldKind::Radio)?;
        Self::expect_option(field, option)?;
        self.store(id, FieldValue::Text(option.to_string()));
        Ok(())
    }

    /// Check or uncheck one checkbox option
    pub fn set_checked(&mut self, id: &str, option: &str, checked: bool) -> Result<(), SessionError> {
        let field = self.expect_kind(id, FieldKind::Checkbox)?;
        Self::expect_option(field, option)?;
        let mut selection = self.selection(id);
        if checked {
            if !selection.iter().any(|o| o == option) {
                selection.push(option.to_string());
            }
        } else {
            selection.retain(|o| o != option);
        }
        self.store(id, FieldValue::Selection(selection));
        Ok(())
    }

    pub fn is_option_checked(&self, id: &str, option: &str) -> bool {
        self.resolved_value(id)
            .and_then(|v| v.as_selection().map(|s| s.iter().any(|o| o == option)))
            .unwrap_or(false)
    }

    /// Append an empty list entry and return its index
    pub fn add_list_entry(&mut self, id: &str) -> Result<usize, SessionError> {
        self.expect_kind(id, FieldKind::List)?;
        let mut entries = self.selection(id);
        entries.push(String::new());
        let index = entries.len() - 1;
        self.store(id, FieldValue::Selection(entries));
        Ok(index)
    }

    pub fn set_list_entry(&mut self, id: &str, index: usize, value: &str) -> Result<(), SessionError> {
        self.expect_kind(id, FieldKind::List)?;
        let mut entries = self.selection(id);
        let entry = entries
            .get_mut(index)
            .ok_or_else(|| SessionError::EntryOutOfRange { id: id.to_string(), index })?;
        *entry = value.to_string();
        self.store(id, FieldValue::Selection(entries));
        Ok(())
    }

    pub fn remove_list_entry(&mut self, id: &str, index: usize) -> Result<(), SessionError> {
        self.expect_kind(id, FieldKind::List)?;
        let mut entries = self.selection(id);
        if index >= entries.len() {
            return Err(SessionError::EntryOutOfRange { id: id.to_string(), index });
        }
        entries.remove(index);
        self.store(id, FieldValue::Selection(entries));
        Ok(())
    }

    /// Insert or overwrite one map entry
    pub fn set_map_entry(&mut self, id: &str, key: &str, value: &str) -> Result<(), SessionError> {
        self.expect_kind(id, FieldKind::Map)?;
        let mut entries = self.entries(id);
        entries.insert(key.to_string(), value.to_string());
        self.store(id, FieldValue::Entries(entries));
        Ok(())
    }

    pub fn remove_map_entry(&mut self, id: &str, key: &str) -> Result<(), SessionError> {
        self.expect_kind(id, FieldKind::Map)?;
        let mut entries = self.entries(id);
        entries.shift_remove(key);
        self.store(id, FieldValue::Entries(entries));
        Ok(())
    }

    /// Replace a field's value wholesale; the shape must fit the kind
    pub fn set_value(&mut self, id: &str, value: FieldValue) -> Result<(), SessionError> {
        let field = self
            .document
            .field(id)
            .ok_or_else(|| SessionError::UnknownField(id.to_string()))?;
        let fits = match (field, &value) {
            (Field::Text(_), FieldValue::Text(_)) => true,
            (Field::Radio(f), FieldValue::Text(choice)) => choice.is_empty() || f.options.contains(choice),
            (Field::Checkbox(f), FieldValue::Selection(items)) => items.iter().all(|i| f.options.contains(i)),
            (Field::List(_), FieldValue::Selection(_)) => true,
            (Field::Map(_), FieldValue::Entries(_)) => true,
            _ => false,
        };
        if !fits {
            return Err(SessionError::ValueShape { id: id.to_string(), kind: field.kind() });
        }
        self.store(id, value);
        Ok(())
    }

    fn selection(&self, id: &str) -> Vec<String> {
        self.resolved_value(id)
            .and_then(|v| v.as_selection().map(<[String]>::to_vec))
            .unwrap_or_default()
    }

    fn entries(&self, id: &str) -> IndexMap<String, String> {
        self.resolved_value(id)
            .and_then(|v| v.as_entries().cloned())
            .unwrap_or_default()
    }

    fn expect_kind(&self, id: &str, expected: FieldKind) -> Result<&Field, SessionError> {
        let field = self
            .document
            .field(id)
            .ok_or_else(|| SessionError::UnknownField(id.to_string()))?;
        if field.kind() != expected {
            return Err(SessionError::WrongKind {
                id: id.to_string(),
                expected,
                actual: field.kind(),
            });
        }
        Ok(field)
    }

    fn expect_option(field: &Field, option: &str) -> Result<(), SessionError> {
        let known = field.options().map_or(false, |opts| opts.iter().any(|o| o == option));
        if known {
            Ok(())
        } else {
            Err(SessionError::UnknownOption {
                id: field.id().to_string(),
                option: option.to_string(),
            })
        }
    }

    fn store(&mut self, id: &str, value: FieldValue) {
        self.values.insert(id.to_string(), value);
        self.revalidate(id);
    }

    fn revalidate(&mut self, id: &str) {
        let Some(field) = self.document.field(id) else {
            return;
        };
        match validate_value(field, &self.resolve(field)) {
            Some(error) => {
                debug!(field_id = %id, %error, "validation failed");
                self.errors.insert(id.to_string(), error);
            }
            None => {
                self.errors.remove(id);
            }
        }
    }

    // =========================================================================
    // Errors
    // =========================================================================

    pub fn error(&self, id: &str) -> Option<&ValidationError> {
        self.errors.get(id)
    }

    /// Errors keyed by field id
    pub fn errors(&self) -> &BTreeMap<String, ValidationError> {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Submit control state
    pub fn can_submit(&self) -> bool {
        !self.has_errors() && !self.submitting
    }

    // =========================================================================
    // Sections
    // =========================================================================

    /// Fields partitioned by group in group order, then a trailing ungrouped
    /// section. Without groups there is a single ungrouped section.
    pub fn sections(&self) -> Vec<Section<'_>> {
        let groups = &self.document.groups;
        if groups.is_empty() {
            return vec![Section {
                group: None,
                fields: self.document.fields.iter().collect(),
                collapsed: false,
            }];
        }

        let mut sections: Vec<Section<'_>> = groups
            .iter()
            .map(|group| Section {
                group: Some(group),
                fields: self
                    .document
                    .fields
                    .iter()
                    .filter(|f| f.group_id() == Some(group.id.as_str()))
                    .collect(),
                collapsed: self.is_collapsed(&group.id),
            })
            .collect();

        let ungrouped: Vec<&Field> = self
            .document
            .fields
            .iter()
            .filter(|f| f.group_id().map_or(true, |gid| !self.document.has_group(gid)))
            .collect();
        if !ungrouped.is_empty() {
            sections.push(Section { group: None, fields: ungrouped, collapsed: false });
        }
        sections
    }

    pub fn is_collapsed(&self, group_id: &str) -> bool {
        match self.collapsed.get(group_id) {
            Some(collapsed) => *collapsed,
            None => self
                .document
                .group(group_id)
                .map_or(false, Group::collapsed_by_default),
        }
    }

    /// Flip a group's collapsed state; returns the new state
    pub fn toggle_group(&mut self, group_id: &str) -> Option<bool> {
        self.document.group(group_id)?;
        let collapsed = !self.is_collapsed(group_id);
        self.collapsed.insert(group_id.to_string(), collapsed);
        Some(collapsed)
    }

    // =========================================================================
    // Output & submit
    // =========================================================================

    /// Label-keyed output object in document order. Fields sharing a label
    /// overwrite each other; the later field wins.
    pub fn assemble_output(&self) -> FormData {
        let mut output = FormData::new();
        for field in &self.document.fields {
            output.insert(field.label().to_string(), self.output_value(field).to_json());
        }
        output
    }

    /// Enter the submitting state and hand back what to send
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, SubmitBlocked> {
        if self.submitting {
            return Err(SubmitBlocked::AlreadySubmitting);
        }
        if self.has_errors() {
            warn!(errors = self.errors.len(), "submit blocked by validation errors");
            return Err(SubmitBlocked::ValidationErrors);
        }
        self.submitting = true;
        let form_data = self.assemble_output();
        Ok(match self.mode {
            SessionMode::Create => SubmitRequest::Create { form_data },
            SessionMode::Edit { submission_id } => SubmitRequest::Update { id: submission_id, form_data },
        })
    }

    /// Leave the submitting state and raise a notice. Values, errors and
    /// mode are left as they are whatever the outcome.
    pub fn finish_submit<E: Display>(&mut self, outcome: Result<i64, E>, now: Instant) {
        self.submitting = false;
        let notice = match (outcome, self.mode) {
            (Ok(id), SessionMode::Create) => {
                info!(submission_id = id, "submission created");
                Notice::new(NoticeKind::Success, format!("Form submitted successfully (id {})", id), now)
            }
            (Ok(id), SessionMode::Edit { .. }) => {
                info!(submission_id = id, "submission updated");
                Notice::new(NoticeKind::Success, format!("Submission {} updated", id), now)
            }
            (Err(e), _) => {
                warn!(error = %e, "submission failed");
                Notice::new(NoticeKind::Failure, format!("Submission failed: {}", e), now)
            }
        };
        self.notice = Some(notice);
    }

    /// The current notice while it is still visible
    pub fn notice(&self, now: Instant) -> Option<&Notice> {
        self.notice.as_ref().filter(|n| n.is_visible(now))
    }

    // =========================================================================
    // Edit mode
    // =========================================================================

    /// Populate values from a saved submission and switch to edit mode.
    ///
    /// Values are matched to fields by label. Returns the labels that matched
    /// no field or whose stored value did not fit the field.
    pub fn load_submission(&mut self, submission: &Submission) -> Vec<String> {
        self.values.clear();
        self.errors.clear();
        let mut unmatched = Vec::new();

        for (label, json) in &submission.form_data {
            let targets: Vec<(String, FieldKind)> = self
                .document
                .fields
                .iter()
                .filter(|f| f.label() == label)
                .map(|f| (f.id().to_string(), f.kind()))
                .collect();
            let mut matched = false;
            for (id, kind) in targets {
                if let Some(value) = FieldValue::from_json(kind, json) {
                    matched |= self.set_value(&id, value).is_ok();
                }
            }
            if !matched {
                unmatched.push(label.clone());
            }
        }

        self.mode = SessionMode::Edit { submission_id: submission.id };
        if !unmatched.is_empty() {
            warn!(submission_id = submission.id, ?unmatched, "labels without a matching field");
        }
        debug!(submission_id = submission.id, "editing submission");
        unmatched
    }

    /// Leave edit mode and clear entered values
    pub fn start_new_entry(&mut self) {
        self.values.clear();
        self.errors.clear();
        self.mode = SessionMode::Create;
    }
}
