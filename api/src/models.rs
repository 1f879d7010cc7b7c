//! API Models

use chrono::{DateTime, Utc};
use formkit_core::{FormData, Submission};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Acknowledgement for create, update and delete
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl AckResponse {
    pub fn ok(message: &str, id: Option<i64>) -> Self {
        Self { success: true, message: message.into(), id }
    }
}

/// Stored submission
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmissionResponse {
    pub id: i64,
    /// Form output object keyed by field label
    #[schema(value_type = Object)]
    pub form_data: FormData,
    pub created_at: DateTime<Utc>,
}

impl From<Submission> for SubmissionResponse {
    fn from(s: Submission) -> Self {
        Self { id: s.id, form_data: s.form_data, created_at: s.created_at }
    }
}
