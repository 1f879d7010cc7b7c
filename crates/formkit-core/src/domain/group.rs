//! Field groups

use serde::{Deserialize, Serialize};

/// Named, collapsible partition of fields
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Rendered collapsed by default when set
    #[serde(default)]
    pub padding: bool,
}

impl Group {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            padding: true,
        }
    }

    pub fn collapsed_by_default(&self) -> bool {
        self.padding
    }
}
