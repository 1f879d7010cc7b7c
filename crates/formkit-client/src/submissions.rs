//! Submission client
//!
//! | Operation | Request |
//! |---|---|
//! | create | `POST {base}/submit-form` |
//! | list | `GET {base}/submissions` |
//! | get | `GET {base}/submissions/{id}` |
//! | update | `PUT {base}/submissions/{id}` |
//! | delete | `DELETE {base}/submissions/{id}` |

use formkit_core::{FormData, Submission, SubmissionAck, SubmitRequest};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;

pub struct SubmissionClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl SubmissionClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Url::parse(&config.base_url).map_err(|e| ClientError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { config, http })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Store a new submission and return its id
    pub async fn create(&self, form_data: &FormData) -> Result<i64, ClientError> {
        let resp = self
            .http
            .post(self.url("/submit-form"))
            .json(form_data)
            .send()
            .await?;
        let ack: SubmissionAck = Self::decode(resp).await?;
        ack.id.ok_or_else(|| ClientError::Decode("acknowledgement has no id".into()))
    }

    /// All submissions, newest first
    pub async fn list(&self) -> Result<Vec<Submission>, ClientError> {
        let resp = self.http.get(self.url("/submissions")).send().await?;
        Self::decode(resp).await
    }

    pub async fn get(&self, id: i64) -> Result<Submission, ClientError> {
        let resp = self.http.get(self.submission_url(id)).send().await?;
        Self::decode(resp).await
    }

    /// Replace a submission's data; returns the unchanged id
    pub async fn update(&self, id: i64, form_data: &FormData) -> Result<i64, ClientError> {
        let resp = self
            .http
            .put(self.submission_url(id))
            .json(form_data)
            .send()
            .await?;
        let ack: SubmissionAck = Self::decode(resp).await?;
        Ok(ack.id.unwrap_or(id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        let resp = self.http.delete(self.submission_url(id)).send().await?;
        let _: SubmissionAck = Self::decode(resp).await?;
        Ok(())
    }

    /// Send what a form session produced
    pub async fn execute(&self, request: &SubmitRequest) -> Result<i64, ClientError> {
        match request {
            SubmitRequest::Create { form_data } => self.create(form_data).await,
            SubmitRequest::Update { id, form_data } => self.update(*id, form_data).await,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn submission_url(&self, id: i64) -> String {
        self.url(&format!("/submissions/{}", id))
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
        let resp = Self::check(resp).await?;
        resp.json::<T>().await.map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn check(resp: Response) -> Result<Response, ClientError> {
        let status = resp.status();
        debug!(status = status.as_u16(), url = %resp.url(), "response");
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let server_message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from))
            .filter(|m| !m.is_empty());
        warn!(status = status.as_u16(), message = ?server_message, "request failed");

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(server_message.unwrap_or_else(|| "not found".into())));
        }
        Err(ClientError::Http {
            status: status.as_u16(),
            message: server_message.unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> SubmissionClient {
        SubmissionClient::new(ClientConfig::new(format!("{}/api/", server.uri()))).unwrap()
    }

    fn form_data(name: &str) -> FormData {
        let mut data = FormData::new();
        data.insert("Name".into(), json!(name));
        data
    }

    #[tokio::test]
    async fn test_create_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/submit-form"))
            .and(body_json(json!({ "Name": "Alice" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true, "message": "Form data saved successfully", "id": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.create(&form_data("Alice")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_decodes_submissions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/submissions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 2, "form_data": { "Name": "Bob" }, "created_at": "2024-05-01T10:00:00Z" },
                { "id": 1, "form_data": { "Name": "Alice" }, "created_at": "2024-05-01T09:00:00Z" }
            ])))
            .mount(&server)
            .await;

        let list = client_for(&server).await.list().await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, 2);
        assert_eq!(list[1].form_data["Name"], json!("Alice"));
    }

    #[tokio::test]
    async fn test_error_body_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/submissions/9"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "Form data is required" })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/submissions/9"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.update(9, &form_data("x")).await.unwrap_err();
        assert!(matches!(err, ClientError::Http { status: 400, .. }));
        assert_eq!(err.to_string(), "Form data is required");

        let err = client.delete(9).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 503");
    }

    #[tokio::test]
    async fn test_missing_submission_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/submissions/42"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "Submission not found" })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.get(42).await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(ref m) if m == "Submission not found"));
    }

    #[tokio::test]
    async fn test_not_found_without_body_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/submissions/7"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).await.delete(7).await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(ref m) if m == "not found"));
    }

    #[tokio::test]
    async fn test_execute_update_keeps_id() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/submissions/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "message": "Form data updated successfully", "id": 3
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = SubmitRequest::Update { id: 3, form_data: form_data("Bob") };
        assert_eq!(client_for(&server).await.execute(&request).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/submissions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let config = ClientConfig::new(format!("{}/api", server.uri())).with_timeout(Duration::from_secs(1));
        let client = SubmissionClient::new(config).unwrap();
        assert!(matches!(client.list().await, Err(ClientError::Timeout)));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let result = SubmissionClient::new(ClientConfig::new("not a url"));
        assert!(matches!(result, Err(ClientError::InvalidUrl { .. })));
    }
}
