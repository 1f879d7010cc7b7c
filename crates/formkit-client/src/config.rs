//! Client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding the service base URL
pub const API_URL_ENV: &str = "FORMKIT_API_URL";

pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL the endpoint paths are appended to
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.into(),
            timeout_secs: 10,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize(base_url.into()),
            ..Self::default()
        }
    }

    /// Defaults, with the base URL taken from `FORMKIT_API_URL` when set
    pub fn from_env() -> Self {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn normalize(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
