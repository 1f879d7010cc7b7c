//! Persisted submissions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Submission output object, keyed by field label
pub type FormData = serde_json::Map<String, serde_json::Value>;

/// One persisted instance of user-filled form output
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Server-assigned, monotonically increasing
    pub id: i64,
    pub form_data: FormData,
    pub created_at: DateTime<Utc>,
}

/// Acknowledgement returned by create, update and delete
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionAck {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl SubmissionAck {
    pub fn ok(message: impl Into<String>, id: Option<i64>) -> Self {
        Self { success: true, message: message.into(), id }
    }
}
