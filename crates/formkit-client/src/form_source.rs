//! Form definition sources
//!
//! A form definition is located by, in order of precedence: an explicit
//! parameter, the `FORMKIT_FORM_CONFIG_URL` environment override, or the
//! static file `form-config.json`. `http://` and `https://` locations are
//! fetched; anything else is a path on disk.

use formkit_core::FormDocument;
use std::fmt;
use std::path::PathBuf;
use tracing::info;
use url::Url;

use crate::error::ClientError;
use crate::submissions::SubmissionClient;

pub const FORM_CONFIG_ENV: &str = "FORMKIT_FORM_CONFIG_URL";
pub const DEFAULT_FORM_CONFIG_FILE: &str = "form-config.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormLocation {
    Remote(Url),
    File(PathBuf),
}

impl FormLocation {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            if let Ok(url) = Url::parse(raw) {
                return FormLocation::Remote(url);
            }
        }
        FormLocation::File(PathBuf::from(raw))
    }

    /// Apply the precedence rules against the process environment
    pub fn resolve(explicit: Option<&str>) -> Self {
        Self::resolve_with(explicit, std::env::var(FORM_CONFIG_ENV).ok())
    }

    pub fn resolve_with(explicit: Option<&str>, env_override: Option<String>) -> Self {
        let chosen = explicit
            .map(str::to_string)
            .filter(|s| !s.trim().is_empty())
            .or_else(|| env_override.filter(|s| !s.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_FORM_CONFIG_FILE.to_string());
        Self::parse(&chosen)
    }

    /// Read and parse the definition. Accepts both import shapes.
    pub async fn load(&self, client: &SubmissionClient) -> Result<FormDocument, ClientError> {
        let text = match self {
            FormLocation::Remote(url) => {
                let resp = client.http().get(url.clone()).send().await?;
                if !resp.status().is_success() {
                    return Err(self.source_error(format!("HTTP {}", resp.status().as_u16())));
                }
                resp.text().await?
            }
            FormLocation::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| self.source_error(e.to_string()))?,
        };
        let document = FormDocument::parse_json(&text)?.into_document();
        info!(location = %self, fields = document.fields.len(), "form definition loaded");
        Ok(document)
    }

    fn source_error(&self, reason: String) -> ClientError {
        ClientError::FormSource { location: self.to_string(), reason }
    }
}

impl fmt::Display for FormLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormLocation::Remote(url) => write!(f, "{}", url),
            FormLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}
