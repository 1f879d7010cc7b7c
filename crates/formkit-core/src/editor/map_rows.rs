//! Map row buffers
//!
//! A map field's default is edited as an ordered list of rows. Rows may be
//! half-filled or repeat a key; only compiling them produces the map.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRow {
    pub key: String,
    pub value: String,
}

impl MapRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Rows for an existing map, in its order
pub(crate) fn seed(entries: Option<&IndexMap<String, String>>) -> Vec<MapRow> {
    entries
        .map(|map| map.iter().map(|(k, v)| MapRow::new(k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

/// Rows to map: empty keys are skipped, a repeated key keeps its first
/// position and takes the last value
pub(crate) fn compile(rows: &[MapRow]) -> IndexMap<String, String> {
    let mut map = IndexMap::with_capacity(rows.len());
    for row in rows.iter().filter(|r| !r.key.is_empty()) {
        map.insert(row.key.clone(), row.value.clone());
    }
    map
}
