//! Admin Editor
//!
//! Owns the live [`FormDocument`] and a textual JSON buffer kept in step with
//! it. Every mutation is keyed by field or group id and is a no-op (returning
//! `false`) when the target is absent or of the wrong kind.
//!
//! With auto-update on, each applied mutation re-serializes the document into
//! the buffer. With it off the buffer is free text until [`AdminEditor::import_json`]
//! replaces the document wholesale.

mod map_rows;

pub use map_rows::MapRow;

use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::document::{ExportFormat, FormDocument};
use crate::domain::field::{Field, FieldKind, NEW_OPTION_LABEL};
use crate::domain::group::Group;
use crate::error::ImportError;

/// Which side of a map entry a pattern applies to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternTarget {
    Key,
    Value,
}

#[derive(Debug)]
pub struct AdminEditor {
    document: FormDocument,
    json_buffer: String,
    auto_update: bool,
    export_format: ExportFormat,
    /// Transient row buffers for map defaults, keyed by field id
    map_rows: HashMap<String, Vec<MapRow>>,
}

impl Default for AdminEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminEditor {
    pub fn new() -> Self {
        Self::with_document(FormDocument::new())
    }

    pub fn with_document(document: FormDocument) -> Self {
        let mut editor = Self {
            document,
            json_buffer: String::new(),
            auto_update: true,
            export_format: ExportFormat::default(),
            map_rows: HashMap::new(),
        };
        editor.sync();
        editor
    }

    pub fn document(&self) -> &FormDocument {
        &self.document
    }

    pub fn into_document(self) -> FormDocument {
        self.document
    }

    // =========================================================================
    // Fields
    // =========================================================================

    /// Append a field of `kind` and return its generated id
    pub fn add_field(&mut self, kind: FieldKind) -> String {
        let id = Uuid::new_v4().to_string();
        self.document.fields.push(Field::new(kind, id.clone()));
        debug!(field_id = %id, kind = %kind, "field added");
        self.sync();
        id
    }

    pub fn update_label(&mut self, id: &str, label: &str) -> bool {
        self.with_field(id, |field| {
            field.common_mut().label = label.to_string();
            true
        })
    }

    pub fn update_description(&mut self, id: &str, description: &str) -> bool {
        self.with_field(id, |field| {
            field.common_mut().description = non_empty(description);
            true
        })
    }

    /// Assign a field to a group; `None` or an empty id makes it ungrouped.
    /// An id naming no existing group is rejected.
    pub fn update_group_id(&mut self, id: &str, group_id: Option<&str>) -> bool {
        let group_id = group_id.and_then(non_empty);
        if let Some(gid) = &group_id {
            if !self.document.has_group(gid) {
                warn!(field_id = %id, group_id = %gid, "unknown group");
                return false;
            }
        }
        self.with_field(id, |field| {
            field.common_mut().group_id = group_id;
            true
        })
    }

    /// Replace the options of a radio or checkbox field
    pub fn update_options(&mut self, id: &str, options: Vec<String>) -> bool {
        self.with_field(id, |field| match field.options_mut() {
            Some(current) => {
                *current = options;
                true
            }
            None => false,
        })
    }

    /// Append the placeholder option
    pub fn add_option(&mut self, id: &str) -> bool {
        self.with_field(id, |field| match field.options_mut() {
            Some(options) => {
                options.push(NEW_OPTION_LABEL.to_string());
                true
            }
            None => false,
        })
    }

    /// Remove the option at `index`, pruning it from the default and, for
    /// checkboxes, from the required options
    pub fn remove_option(&mut self, id: &str, index: usize) -> bool {
        self.with_field(id, |field| match field {
            Field::Radio(f) if index < f.options.len() => {
                let removed = f.options.remove(index);
                if f.default_value.as_deref() == Some(removed.as_str()) {
                    f.default_value = None;
                }
                true
            }
            Field::Checkbox(f) if index < f.options.len() => {
                let removed = f.options.remove(index);
                for list in [&mut f.default_value, &mut f.required_options] {
                    *list = list
                        .take()
                        .map(|mut items| {
                            items.retain(|option| *option != removed);
                            items
                        })
                        .and_then(non_empty_list);
                }
                true
            }
            _ => false,
        })
    }

    /// Pattern for text fields and list entries; empty clears it.
    /// Stored verbatim, compiled only when validating.
    pub fn update_validation_regex(&mut self, id: &str, pattern: Option<&str>) -> bool {
        let pattern = pattern.and_then(non_empty);
        self.with_field(id, |field| match field {
            Field::Text(f) => {
                f.validation_regex = pattern;
                true
            }
            Field::List(f) => {
                f.validation_regex = pattern;
                true
            }
            _ => false,
        })
    }

    pub fn update_map_validation_regex(&mut self, id: &str, target: PatternTarget, pattern: Option<&str>) -> bool {
        let pattern = pattern.and_then(non_empty);
        self.with_field(id, |field| match field {
            Field::Map(f) => {
                match target {
                    PatternTarget::Key => f.key_validation_regex = pattern,
                    PatternTarget::Value => f.value_validation_regex = pattern,
                }
                true
            }
            _ => false,
        })
    }

    /// Comma-separated required options for a checkbox; empty clears them
    pub fn update_required_options(&mut self, id: &str, raw: &str) -> bool {
        let required = split_comma_list(raw);
        self.with_field(id, |field| match field {
            Field::Checkbox(f) => {
                f.required_options = non_empty_list(required);
                true
            }
            _ => false,
        })
    }

    pub fn update_error_message(&mut self, id: &str, message: &str) -> bool {
        self.with_field(id, |field| match field {
            Field::Checkbox(f) => {
                f.error_message = non_empty(message);
                true
            }
            _ => false,
        })
    }

    /// Parse `raw` according to the field's kind:
    ///
    /// - text, radio: taken as-is, empty clears
    /// - checkbox, list: comma-split, trimmed, empty entries dropped
    /// - map: a JSON object of string values, anything else clears
    pub fn update_default_value(&mut self, id: &str, raw: &str) -> bool {
        let applied = self.with_field(id, |field| {
            match field {
                Field::Text(f) => f.default_value = non_empty(raw),
                Field::Radio(f) => f.default_value = non_empty(raw),
                Field::Checkbox(f) => f.default_value = non_empty_list(split_comma_list(raw)),
                Field::List(f) => f.default_value = non_empty_list(split_comma_list(raw)),
                Field::Map(f) => f.default_value = parse_string_map(raw),
            }
            true
        });
        if applied {
            self.map_rows.remove(id);
        }
        applied
    }

    /// Move the field at `from` to position `to`; both must be in range
    pub fn move_field(&mut self, from: usize, to: usize) -> bool {
        let len = self.document.fields.len();
        if from >= len || to >= len {
            warn!(from, to, len, "field move out of range");
            return false;
        }
        if from != to {
            let field = self.document.fields.remove(from);
            self.document.fields.insert(to, field);
            self.sync();
        }
        true
    }

    pub fn remove_field(&mut self, id: &str) -> bool {
        let Some(index) = self.document.field_index(id) else {
            warn!(field_id = %id, "unknown field");
            return false;
        };
        self.document.fields.remove(index);
        self.map_rows.remove(id);
        debug!(field_id = %id, "field removed");
        self.sync();
        true
    }

    // =========================================================================
    // Map rows
    // =========================================================================

    /// Current rows of a map field's default, seeded from it if untouched
    pub fn map_rows(&self, id: &str) -> Vec<MapRow> {
        if let Some(rows) = self.map_rows.get(id) {
            return rows.clone();
        }
        match self.document.field(id) {
            Some(Field::Map(f)) => map_rows::seed(f.default_value.as_ref()),
            _ => Vec::new(),
        }
    }

    pub fn add_map_row(&mut self, id: &str) -> bool {
        self.edit_map_rows(id, |rows| {
            rows.push(MapRow::default());
            true
        })
    }

    pub fn remove_map_row(&mut self, id: &str, index: usize) -> bool {
        self.edit_map_rows(id, |rows| {
            if index >= rows.len() {
                return false;
            }
            rows.remove(index);
            true
        })
    }

    pub fn update_map_row_key(&mut self, id: &str, index: usize, key: &str) -> bool {
        self.edit_map_rows(id, |rows| match rows.get_mut(index) {
            Some(row) => {
                row.key = key.to_string();
                true
            }
            None => false,
        })
    }

    pub fn update_map_row_value(&mut self, id: &str, index: usize, value: &str) -> bool {
        self.edit_map_rows(id, |rows| match rows.get_mut(index) {
            Some(row) => {
                row.value = value.to_string();
                true
            }
            None => false,
        })
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Append a group named `Group N` and return its id
    pub fn add_group(&mut self) -> String {
        let id = format!("g_{}", Uuid::new_v4().simple());
        let name = format!("Group {}", self.document.groups.len() + 1);
        self.document.groups.push(Group::new(id.clone(), name));
        debug!(group_id = %id, "group added");
        self.sync();
        id
    }

    pub fn update_group_name(&mut self, id: &str, name: &str) -> bool {
        self.with_group(id, |group| group.name = name.to_string())
    }

    pub fn update_group_description(&mut self, id: &str, description: &str) -> bool {
        self.with_group(id, |group| group.description = non_empty(description))
    }

    pub fn update_group_padding(&mut self, id: &str, padding: bool) -> bool {
        self.with_group(id, |group| group.padding = padding)
    }

    /// Delete a group; member fields become ungrouped and are kept
    pub fn remove_group(&mut self, id: &str) -> bool {
        let before = self.document.groups.len();
        self.document.groups.retain(|g| g.id != id);
        if self.document.groups.len() == before {
            warn!(group_id = %id, "unknown group");
            return false;
        }
        for field in &mut self.document.fields {
            let common = field.common_mut();
            if common.group_id.as_deref() == Some(id) {
                common.group_id = None;
            }
        }
        debug!(group_id = %id, "group removed");
        self.sync();
        true
    }

    // =========================================================================
    // JSON buffer
    // =========================================================================

    pub fn auto_update(&self) -> bool {
        self.auto_update
    }

    /// Turning auto-update back on re-serializes immediately
    pub fn set_auto_update(&mut self, enabled: bool) {
        self.auto_update = enabled;
        self.sync();
    }

    pub fn export_format(&self) -> ExportFormat {
        self.export_format
    }

    pub fn set_export_format(&mut self, format: ExportFormat) {
        self.export_format = format;
        self.sync();
    }

    pub fn json_buffer(&self) -> &str {
        &self.json_buffer
    }

    /// Hand-edit the buffer. Overwritten on the next mutation while
    /// auto-update is on.
    pub fn set_json_buffer(&mut self, text: impl Into<String>) {
        self.json_buffer = text.into();
    }

    /// Serialize the document in the current export format
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        self.document.to_json(self.export_format)
    }

    /// Replace the document from the buffer. On failure nothing changes.
    pub fn import_json(&mut self) -> Result<(), ImportError> {
        let payload = match FormDocument::parse_json(&self.json_buffer) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "form import rejected");
                return Err(e);
            }
        };
        self.document.apply(payload);
        self.map_rows.clear();
        info!(
            fields = self.document.fields.len(),
            groups = self.document.groups.len(),
            "form definition imported"
        );
        self.sync();
        Ok(())
    }

    /// Load `text` into the buffer and import it
    pub fn import_str(&mut self, text: &str) -> Result<(), ImportError> {
        self.set_json_buffer(text);
        self.import_json()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn with_field(&mut self, id: &str, edit: impl FnOnce(&mut Field) -> bool) -> bool {
        let Some(field) = self.document.field_mut(id) else {
            warn!(field_id = %id, "unknown field");
            return false;
        };
        if !edit(field) {
            debug!(field_id = %id, "edit does not apply to this field kind");
            return false;
        }
        self.sync();
        true
    }

    fn with_group(&mut self, id: &str, edit: impl FnOnce(&mut Group)) -> bool {
        let Some(group) = self.document.group_mut(id) else {
            warn!(group_id = %id, "unknown group");
            return false;
        };
        edit(group);
        self.sync();
        true
    }

    fn edit_map_rows(&mut self, id: &str, edit: impl FnOnce(&mut Vec<MapRow>) -> bool) -> bool {
        let Some(Field::Map(field)) = self.document.field_mut(id) else {
            warn!(field_id = %id, "not a map field");
            return false;
        };
        let rows = self
            .map_rows
            .entry(id.to_string())
            .or_insert_with(|| map_rows::seed(field.default_value.as_ref()));
        if !edit(rows) {
            return false;
        }
        field.default_value = Some(map_rows::compile(rows));
        self.sync();
        true
    }

    fn sync(&mut self) {
        if !self.auto_update {
            return;
        }
        match self.document.to_json(self.export_format) {
            Ok(json) => self.json_buffer = json,
            Err(e) => warn!(error = %e, "failed to serialize form document"),
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones
pub fn split_comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

fn non_empty_list(items: Vec<String>) -> Option<Vec<String>> {
    (!items.is_empty()).then_some(items)
}

fn parse_string_map(raw: &str) -> Option<IndexMap<String, String>> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    object
        .iter()
        .map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with(kind: FieldKind) -> (AdminEditor, String) {
        let mut editor = AdminEditor::new();
        let id = editor.add_field(kind);
        (editor, id)
    }

    #[test]
    fn test_add_field_syncs_buffer() {
        let (editor, id) = editor_with(FieldKind::Radio);
        assert!(editor.json_buffer().contains(&id));
        assert!(editor.json_buffer().contains("\"type\": \"radio\""));
        assert_eq!(editor.document().fields.len(), 1);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let (mut editor, _) = editor_with(FieldKind::Text);
        let before = editor.document().clone();
        assert!(!editor.update_label("missing", "x"));
        assert!(!editor.remove_field("missing"));
        assert_eq!(editor.document(), &before);
    }

    #[test]
    fn test_update_options_only_for_choice_fields() {
        let (mut editor, text_id) = editor_with(FieldKind::Text);
        assert!(!editor.update_options(&text_id, vec!["A".into()]));
        assert!(!editor.add_option(&text_id));

        let radio_id = editor.add_field(FieldKind::Radio);
        assert!(editor.update_options(&radio_id, vec!["A".into(), "B".into()]));
        assert!(editor.add_option(&radio_id));
        let options = editor.document().field(&radio_id).unwrap().options().unwrap().to_vec();
        assert_eq!(options, vec!["A", "B", NEW_OPTION_LABEL]);
    }

    #[test]
    fn test_remove_option_prunes_defaults() {
        let (mut editor, radio) = editor_with(FieldKind::Radio);
        editor.update_default_value(&radio, "Option 1");
        assert!(editor.remove_option(&radio, 0));
        match editor.document().field(&radio).unwrap() {
            Field::Radio(f) => assert_eq!(f.default_value, None),
            _ => unreachable!(),
        }

        let checkbox = editor.add_field(FieldKind::Checkbox);
        editor.update_default_value(&checkbox, "Item 1, Item 2");
        editor.update_required_options(&checkbox, "Item 2");
        assert!(editor.remove_option(&checkbox, 1));
        match editor.document().field(&checkbox).unwrap() {
            Field::Checkbox(f) => {
                assert_eq!(f.default_value, Some(vec!["Item 1".to_string()]));
                assert_eq!(f.required_options, None);
            }
            _ => unreachable!(),
        }
        assert!(!editor.remove_option(&checkbox, 5));

        assert!(editor.remove_option(&checkbox, 0));
        let json = editor.export_json().unwrap();
        assert!(!json.contains("requiredOptions"));
        assert!(!json.contains("defaultValue"));
    }

    #[test]
    fn test_default_value_parsing() {
        let (mut editor, text) = editor_with(FieldKind::Text);
        editor.update_default_value(&text, "");
        let list = editor.add_field(FieldKind::List);
        editor.update_default_value(&list, " a, ,b ,");
        let map = editor.add_field(FieldKind::Map);
        editor.update_default_value(&map, r#"{"k": "v", "x": "y"}"#);

        let doc = editor.document();
        assert!(matches!(doc.field(&text), Some(Field::Text(f)) if f.default_value.is_none()));
        assert!(matches!(doc.field(&list), Some(Field::List(f)) if f.default_value == Some(vec!["a".into(), "b".into()])));
        assert!(matches!(doc.field(&map), Some(Field::Map(f)) if f.default_value.as_ref().map(|m| m.len()) == Some(2)));

        editor.update_default_value(&map, r#"["not", "an", "object"]"#);
        assert!(matches!(editor.document().field(&map), Some(Field::Map(f)) if f.default_value.is_none()));
        editor.update_default_value(&map, r#"{"k": 1}"#);
        assert!(matches!(editor.document().field(&map), Some(Field::Map(f)) if f.default_value.is_none()));

        editor.update_default_value(&list, " , ");
        assert!(matches!(editor.document().field(&list), Some(Field::List(f)) if f.default_value.is_none()));
        let checkbox = editor.add_field(FieldKind::Checkbox);
        editor.update_default_value(&checkbox, "");
        assert!(matches!(editor.document().field(&checkbox), Some(Field::Checkbox(f)) if f.default_value.is_none()));
    }

    #[test]
    fn test_move_field_bounds() {
        let mut editor = AdminEditor::new();
        let a = editor.add_field(FieldKind::Text);
        let b = editor.add_field(FieldKind::List);
        assert!(!editor.move_field(0, 2));
        assert!(editor.move_field(1, 0));
        let ids: Vec<_> = editor.document().fields.iter().map(|f| f.id().to_string()).collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[test]
    fn test_remove_group_keeps_fields() {
        let (mut editor, field) = editor_with(FieldKind::Text);
        let group = editor.add_group();
        assert_eq!(editor.document().group(&group).unwrap().name, "Group 1");
        assert!(editor.update_group_id(&field, Some(group.as_str())));
        assert!(!editor.update_group_id(&field, Some("g_missing")));

        assert!(editor.remove_group(&group));
        assert_eq!(editor.document().fields.len(), 1);
        assert_eq!(editor.document().field(&field).unwrap().group_id(), None);
        assert!(editor.document().groups.is_empty());
    }

    #[test]
    fn test_map_row_editing() {
        let (mut editor, id) = editor_with(FieldKind::Map);
        editor.add_map_row(&id);
        editor.update_map_row_key(&id, 0, "host");
        editor.update_map_row_value(&id, 0, "a");
        editor.add_map_row(&id);
        editor.update_map_row_key(&id, 1, "host");
        editor.update_map_row_value(&id, 1, "b");
        editor.add_map_row(&id);

        assert_eq!(editor.map_rows(&id).len(), 3);
        match editor.document().field(&id).unwrap() {
            Field::Map(f) => {
                let map = f.default_value.as_ref().unwrap();
                assert_eq!(map.len(), 1);
                assert_eq!(map["host"], "b");
            }
            _ => unreachable!(),
        }

        assert!(editor.remove_field(&id));
        assert!(editor.map_rows(&id).is_empty());
    }

    #[test]
    fn test_manual_buffer_then_import() {
        let (mut editor, _) = editor_with(FieldKind::Text);
        editor.set_auto_update(false);
        editor.set_json_buffer(r#"[{"id": "x", "type": "list", "label": "Tags"}]"#);
        editor.add_field(FieldKind::Radio);
        assert!(editor.json_buffer().contains("Tags"));

        editor.import_json().unwrap();
        assert_eq!(editor.document().fields.len(), 1);
        assert_eq!(editor.document().fields[0].label(), "Tags");
    }

    #[test]
    fn test_failed_import_leaves_document() {
        let (mut editor, _) = editor_with(FieldKind::Checkbox);
        let before = editor.document().clone();
        assert!(matches!(editor.import_str("{\"not\": \"fields\"}"), Err(ImportError::UnsupportedShape)));
        assert!(editor.import_str("not json").is_err());
        assert_eq!(editor.document(), &before);
    }

    #[test]
    fn test_fields_only_export_omits_groups() {
        let mut editor = AdminEditor::new();
        editor.add_group();
        editor.add_field(FieldKind::Text);
        editor.set_export_format(ExportFormat::FieldsOnly);
        assert!(editor.json_buffer().trim_start().starts_with('['));
        editor.set_export_format(ExportFormat::WithGroups);
        assert!(editor.export_json().unwrap().contains("\"groups\""));
    }
}
