//! Live field values
//!
//! What a user has entered for one field. The JSON form of a value is what
//! lands in the submission output object.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::field::{Field, FieldKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text input or radio selection
    Text(String),
    /// Checked checkbox options or list entries
    Selection(Vec<String>),
    /// Map entries
    Entries(IndexMap<String, String>),
}

impl FieldValue {
    /// Empty value of the shape `kind` expects
    pub fn empty_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text | FieldKind::Radio => FieldValue::Text(String::new()),
            FieldKind::Checkbox | FieldKind::List => FieldValue::Selection(Vec::new()),
            FieldKind::Map => FieldValue::Entries(IndexMap::new()),
        }
    }

    /// The field's static default, if it has one
    pub fn default_for(field: &Field) -> Option<Self> {
        match field {
            Field::Text(f) => f.default_value.clone().map(FieldValue::Text),
            Field::Radio(f) => f.default_value.clone().map(FieldValue::Text),
            Field::Checkbox(f) => f.default_value.clone().map(FieldValue::Selection),
            Field::List(f) => f.default_value.clone().map(FieldValue::Selection),
            Field::Map(f) => f.default_value.clone().map(FieldValue::Entries),
        }
    }

    /// Interpret a stored JSON value as input for `kind`.
    ///
    /// Returns `None` when the JSON does not have the expected shape.
    pub fn from_json(kind: FieldKind, value: &Value) -> Option<Self> {
        match kind {
            FieldKind::Text | FieldKind::Radio => value.as_str().map(|s| FieldValue::Text(s.to_string())),
            FieldKind::Checkbox | FieldKind::List => {
                let items = value.as_array()?;
                items
                    .iter()
                    .map(|v| v.as_str().map(String::from))
                    .collect::<Option<Vec<_>>>()
                    .map(FieldValue::Selection)
            }
            FieldKind::Map => {
                let object = value.as_object()?;
                object
                    .iter()
                    .map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect::<Option<IndexMap<_, _>>>()
                    .map(FieldValue::Entries)
            }
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Selection(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
            FieldValue::Entries(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_selection(&self) -> Option<&[String]> {
        match self {
            FieldValue::Selection(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_entries(&self) -> Option<&IndexMap<String, String>> {
        match self {
            FieldValue::Entries(map) => Some(map),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_shapes() {
        assert_eq!(
            FieldValue::from_json(FieldKind::Text, &json!("Alice")),
            Some(FieldValue::Text("Alice".into()))
        );
        assert_eq!(
            FieldValue::from_json(FieldKind::Checkbox, &json!(["A", "B"])),
            Some(FieldValue::Selection(vec!["A".into(), "B".into()]))
        );
        assert_eq!(FieldValue::from_json(FieldKind::List, &json!(["A", 1])), None);
        assert_eq!(FieldValue::from_json(FieldKind::Radio, &json!(3)), None);

        let entries = FieldValue::from_json(FieldKind::Map, &json!({ "k": "v" })).unwrap();
        assert_eq!(entries.as_entries().unwrap().get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn test_to_json_matches_output_shape() {
        let mut map = IndexMap::new();
        map.insert("b".to_string(), "2".to_string());
        map.insert("a".to_string(), "1".to_string());
        let value = FieldValue::Entries(map).to_json();
        assert_eq!(value, json!({ "b": "2", "a": "1" }));
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
