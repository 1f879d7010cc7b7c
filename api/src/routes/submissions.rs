//! Submission endpoints

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use formkit_core::FormData;
use serde_json::Value;

use crate::error::ApiError;
use crate::models::*;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/submit-form", post(create_submission))
        .route("/submissions", get(list_submissions))
        .route(
            "/submissions/:id",
            get(get_submission).put(update_submission).delete(delete_submission),
        )
}

/// Store a new submission
#[utoipa::path(
    post,
    path = "/api/submit-form",
    request_body(content = Object, description = "Form output object keyed by field label"),
    responses(
        (status = 201, description = "Submission stored", body = AckResponse),
        (status = 400, description = "Missing or malformed body", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    ),
    tag = "submissions"
)]
pub async fn create_submission(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<AckResponse>), ApiError> {
    let form_data = form_data(body)?;
    let id = state
        .repo
        .create(form_data)
        .await
        .map_err(ApiError::from_repository("Failed to save form data"))?;
    Ok((
        StatusCode::CREATED,
        Json(AckResponse::ok("Form data saved successfully", Some(id))),
    ))
}

/// List submissions, newest first
#[utoipa::path(
    get,
    path = "/api/submissions",
    responses(
        (status = 200, description = "All submissions", body = [SubmissionResponse]),
        (status = 500, description = "Storage failure", body = ErrorBody)
    ),
    tag = "submissions"
)]
pub async fn list_submissions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    let submissions = state
        .repo
        .list()
        .await
        .map_err(ApiError::from_repository("Failed to fetch submissions"))?;
    Ok(Json(submissions.into_iter().map(SubmissionResponse::from).collect()))
}

/// Get one submission
#[utoipa::path(
    get,
    path = "/api/submissions/{id}",
    params(("id" = i64, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission", body = SubmissionResponse),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ),
    tag = "submissions"
)]
pub async fn get_submission(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let id = submission_id(id)?;
    state
        .repo
        .get(id)
        .await
        .map_err(ApiError::from_repository("Failed to fetch submission"))?
        .map(|s| Json(s.into()))
        .ok_or(ApiError::NotFound)
}

/// Replace a submission's data; id and timestamp are kept
#[utoipa::path(
    put,
    path = "/api/submissions/{id}",
    params(("id" = i64, Path, description = "Submission ID")),
    request_body(content = Object, description = "Replacement form output object"),
    responses(
        (status = 200, description = "Submission updated", body = AckResponse),
        (status = 400, description = "Missing or malformed body", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ),
    tag = "submissions"
)]
pub async fn update_submission(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AckResponse>, ApiError> {
    let id = submission_id(id)?;
    let form_data = form_data(body)?;
    state
        .repo
        .update(id, form_data)
        .await
        .map_err(ApiError::from_repository("Failed to update form data"))?;
    Ok(Json(AckResponse::ok("Form data updated successfully", Some(id))))
}

/// Delete a submission
#[utoipa::path(
    delete,
    path = "/api/submissions/{id}",
    params(("id" = i64, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission deleted", body = AckResponse),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ),
    tag = "submissions"
)]
pub async fn delete_submission(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<AckResponse>, ApiError> {
    let id = submission_id(id)?;
    state
        .repo
        .delete(id)
        .await
        .map_err(ApiError::from_repository("Failed to delete form data"))?;
    Ok(Json(AckResponse::ok("Form data deleted successfully", None)))
}

fn submission_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|_| ApiError::BadRequest("Submission id must be an integer".into()))
}

/// The body must be a JSON object
fn form_data(body: Result<Json<Value>, JsonRejection>) -> Result<FormData, ApiError> {
    match body {
        Ok(Json(Value::Object(map))) => Ok(map),
        Ok(_) => Err(ApiError::BadRequest("Form data must be a JSON object".into())),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => Err(ApiError::PayloadTooLarge),
        Err(JsonRejection::MissingJsonContentType(_)) => Err(ApiError::BadRequest("Form data is required".into())),
        Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
    }
}
