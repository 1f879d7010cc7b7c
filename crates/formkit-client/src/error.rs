//! Client errors

use formkit_core::ImportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response; message is the server's `error` field or `HTTP <status>`
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("invalid base url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("cannot read form definition from {location}: {reason}")]
    FormSource { location: String, reason: String },

    #[error("invalid form definition: {0}")]
    FormDefinition(#[from] ImportError),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e)
        }
    }
}
