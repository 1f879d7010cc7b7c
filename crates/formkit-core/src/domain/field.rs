//! Field descriptors
//!
//! A [`Field`] is a tagged variant discriminated by its `type` attribute in
//! the JSON interchange format. Every consumer (editor, validator, session,
//! serializer) matches on it exhaustively, so a new kind is a compile-time
//! exercise.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder text for options appended in the editor
pub const NEW_OPTION_LABEL: &str = "New option";

/// Attributes shared by every field kind
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCommon {
    /// Unique within a document; join key for live values and errors
    pub id: String,
    /// Display label; also the key in the assembled submission output
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl FieldCommon {
    fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            group_id: None,
        }
    }
}

/// Single-line text input
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_regex: Option<String>,
}

/// Exactly one of a fixed set of options
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadioField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// Any subset of a fixed set of options
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Free-form ordered list of strings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Vec<String>>,
    /// Applied to every entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_regex: Option<String>,
}

/// String-to-string mapping with unique keys
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_validation_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_validation_regex: Option<String>,
}

/// One form input descriptor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Field {
    Text(TextField),
    Radio(RadioField),
    Checkbox(CheckboxField),
    List(ListField),
    Map(MapField),
}

impl Field {
    /// Build a field of `kind` with the editor's default label and placeholders
    pub fn new(kind: FieldKind, id: impl Into<String>) -> Self {
        let common = FieldCommon::new(id, kind.default_label());
        match kind {
            FieldKind::Text => Field::Text(TextField {
                common,
                default_value: None,
                validation_regex: None,
            }),
            FieldKind::Radio => Field::Radio(RadioField {
                common,
                options: vec!["Option 1".into(), "Option 2".into()],
                default_value: None,
            }),
            FieldKind::Checkbox => Field::Checkbox(CheckboxField {
                common,
                options: vec!["Item 1".into(), "Item 2".into()],
                default_value: None,
                required_options: None,
                error_message: None,
            }),
            FieldKind::List => Field::List(ListField {
                common,
                default_value: Some(Vec::new()),
                validation_regex: None,
            }),
            FieldKind::Map => Field::Map(MapField {
                common,
                default_value: Some(IndexMap::new()),
                key_validation_regex: None,
                value_validation_regex: None,
            }),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Text(_) => FieldKind::Text,
            Field::Radio(_) => FieldKind::Radio,
            Field::Checkbox(_) => FieldKind::Checkbox,
            Field::List(_) => FieldKind::List,
            Field::Map(_) => FieldKind::Map,
        }
    }

    pub fn common(&self) -> &FieldCommon {
        match self {
            Field::Text(f) => &f.common,
            Field::Radio(f) => &f.common,
            Field::Checkbox(f) => &f.common,
            Field::List(f) => &f.common,
            Field::Map(f) => &f.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut FieldCommon {
        match self {
            Field::Text(f) => &mut f.common,
            Field::Radio(f) => &mut f.common,
            Field::Checkbox(f) => &mut f.common,
            Field::List(f) => &mut f.common,
            Field::Map(f) => &mut f.common,
        }
    }

    pub fn id(&self) -> &str { &self.common().id }
    pub fn label(&self) -> &str { &self.common().label }
    pub fn description(&self) -> Option<&str> { self.common().description.as_deref() }
    pub fn group_id(&self) -> Option<&str> { self.common().group_id.as_deref() }

    /// Options of a choice field; `None` for kinds without options
    pub fn options(&self) -> Option<&[String]> {
        match self {
            Field::Radio(f) => Some(&f.options),
            Field::Checkbox(f) => Some(&f.options),
            Field::Text(_) | Field::List(_) | Field::Map(_) => None,
        }
    }

    pub fn options_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            Field::Radio(f) => Some(&mut f.options),
            Field::Checkbox(f) => Some(&mut f.options),
            Field::Text(_) | Field::List(_) | Field::Map(_) => None,
        }
    }

    /// Every regular expression the field carries, for linting
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            Field::Text(f) => f.validation_regex.as_deref().into_iter().collect(),
            Field::List(f) => f.validation_regex.as_deref().into_iter().collect(),
            Field::Map(f) => f
                .key_validation_regex
                .as_deref()
                .into_iter()
                .chain(f.value_validation_regex.as_deref())
                .collect(),
            Field::Radio(_) | Field::Checkbox(_) => Vec::new(),
        }
    }
}

/// Field discriminator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Radio,
    Checkbox,
    List,
    Map,
}

impl FieldKind {
    pub const ALL: [FieldKind; 5] = [
        FieldKind::Text,
        FieldKind::Radio,
        FieldKind::Checkbox,
        FieldKind::List,
        FieldKind::Map,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Radio => "radio",
            FieldKind::Checkbox => "checkbox",
            FieldKind::List => "list",
            FieldKind::Map => "map",
        }
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            FieldKind::Text => "Text",
            FieldKind::Radio => "Radio",
            FieldKind::Checkbox => "Checkbox",
            FieldKind::List => "List",
            FieldKind::Map => "Map",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown field kind: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_field_defaults() {
        let radio = Field::new(FieldKind::Radio, "r1");
        assert_eq!(radio.label(), "Radio");
        assert_eq!(radio.options().unwrap().len(), 2);

        let map = Field::new(FieldKind::Map, "m1");
        match map {
            Field::Map(m) => assert_eq!(m.default_value, Some(IndexMap::new())),
            other => panic!("expected map field, got {:?}", other.kind()),
        }

        assert!(Field::new(FieldKind::Text, "t1").options().is_none());
    }

    #[test]
    fn test_json_uses_type_tag_and_camel_case() {
        let mut field = Field::new(FieldKind::Checkbox, "c1");
        if let Field::Checkbox(c) = &mut field {
            c.required_options = Some(vec!["Item 1".into()]);
            c.common.group_id = Some("g_1".into());
        }
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], "checkbox");
        assert_eq!(value["groupId"], "g_1");
        assert_eq!(value["requiredOptions"], json!(["Item 1"]));
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_parse_minimal_text_field() {
        let field: Field = serde_json::from_value(json!({
            "id": "1", "type": "text", "label": "Name", "validationRegex": "^[a-z]+$"
        }))
        .unwrap();
        assert_eq!(field.kind(), FieldKind::Text);
        assert_eq!(field.patterns(), vec!["^[a-z]+$"]);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let parsed = serde_json::from_value::<Field>(json!({ "id": "1", "type": "slider", "label": "x" }));
        assert!(parsed.is_err());
        assert!("slider".parse::<FieldKind>().is_err());
        assert_eq!("MAP".parse::<FieldKind>().unwrap(), FieldKind::Map);
    }
}
