//! Formkit Submission Service
//!
//! REST surface over a single-table SQLite store of form submissions.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        REST API                          │
//! │  POST /api/submit-form        GET  /api/submissions      │
//! │  GET|PUT|DELETE /api/submissions/:id     GET /health     │
//! └────────────────────────────┬─────────────────────────────┘
//!                              │ Arc<dyn SubmissionRepository>
//! ┌────────────────────────────▼─────────────────────────────┐
//! │             SqliteSubmissionRepository                   │
//! │  form_submissions(id, form_data TEXT, created_at TEXT)   │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{Json, Router};
use formkit_core::SubmissionRepository;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub use config::ServerConfig;
pub use error::ApiError;
pub use models::*;
pub use store::SqliteSubmissionRepository;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn SubmissionRepository>,
}

impl AppState {
    pub fn new(repo: Arc<dyn SubmissionRepository>) -> Self {
        Self { repo }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Formkit Submission API",
        description = "Persistence service for dynamic form submissions",
        license(name = "Apache-2.0")
    ),
    paths(
        routes::health::health_check,
        routes::submissions::create_submission,
        routes::submissions::list_submissions,
        routes::submissions::get_submission,
        routes::submissions::update_submission,
        routes::submissions::delete_submission,
    ),
    components(schemas(ErrorBody, AckResponse, SubmissionResponse)),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "submissions", description = "Form submission storage")
    )
)]
pub struct ApiDoc;

/// Build the API router
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = if config.cors_permissive {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api", routes::submissions::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(config.request_body_limit_bytes)),
        )
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn server() -> TestServer {
        let store = SqliteSubmissionRepository::open_in_memory().unwrap();
        let app = build_router(AppState::new(Arc::new(store)), &ServerConfig::default());
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let server = server();
        let response = server.get("/health").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[tokio::test]
    async fn test_submission_lifecycle() {
        let server = server();

        let response = server.post("/api/submit-form").json(&json!({ "Name": "Alice" })).await;
        response.assert_status(StatusCode::CREATED);
        let ack: Value = response.json();
        assert_eq!(ack["success"], json!(true));
        let id = ack["id"].as_i64().unwrap();
        assert_eq!(id, 1);

        let list: Value = server.get("/api/submissions").await.json();
        assert_eq!(list[0]["id"], json!(id));
        assert_eq!(list[0]["form_data"], json!({ "Name": "Alice" }));
        let created_at = list[0]["created_at"].clone();
        assert!(created_at.is_string());

        let one: Value = server.get("/api/submissions/1").await.json();
        assert_eq!(one["form_data"]["Name"], json!("Alice"));

        let response = server.put("/api/submissions/1").json(&json!({ "Name": "Bob" })).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["id"], json!(1));

        let one: Value = server.get("/api/submissions/1").await.json();
        assert_eq!(one["id"], json!(1));
        assert_eq!(one["form_data"], json!({ "Name": "Bob" }));
        assert_eq!(one["created_at"], created_at);

        let response = server.delete("/api/submissions/1").await;
        response.assert_status_ok();
        assert!(response.json::<Value>().get("id").is_none());

        let response = server.get("/api/submissions/1").expect_failure().await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["error"], json!("Submission not found"));
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let server = server();
        server
            .put("/api/submissions/99")
            .json(&json!({ "a": "b" }))
            .expect_failure()
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .delete("/api/submissions/99")
            .expect_failure()
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bad_input_is_rejected() {
        let server = server();

        let response = server.post("/api/submit-form").expect_failure().await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], json!("Form data is required"));

        server
            .post("/api/submit-form")
            .json(&json!(["not", "an", "object"]))
            .expect_failure()
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server.post("/api/submit-form").json(&json!({ "Name": "Alice" })).await;
        let response = server.put("/api/submissions/1").expect_failure().await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], json!("Form data is required"));

        server
            .get("/api/submissions/abc")
            .expect_failure()
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let server = server();
        for name in ["first", "second"] {
            server.post("/api/submit-form").json(&json!({ "Name": name })).await;
        }
        let list: Value = server.get("/api/submissions").await.json();
        assert_eq!(list[0]["form_data"]["Name"], json!("second"));
        assert_eq!(list[1]["form_data"]["Name"], json!("first"));
    }

    #[tokio::test]
    async fn test_openapi_document() {
        let doc: Value = server().get("/api-docs/openapi.json").await.json();
        assert!(doc["paths"].get("/api/submit-form").is_some());
        assert!(doc["paths"].get("/api/submissions/{id}").is_some());
    }
}
