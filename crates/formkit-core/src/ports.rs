//! Outbound ports
//!
//! Persistence interface for submissions; the REST service supplies the
//! SQLite adapter, tests supply in-memory ones.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::submission::{FormData, Submission};

/// Submission repository port
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Store a new submission and return its assigned id
    async fn create(&self, form_data: FormData) -> Result<i64, RepositoryError>;

    /// All submissions, newest first
    async fn list(&self) -> Result<Vec<Submission>, RepositoryError>;

    async fn get(&self, id: i64) -> Result<Option<Submission>, RepositoryError>;

    /// Replace the data of an existing submission
    async fn update(&self, id: i64, form_data: FormData) -> Result<(), RepositoryError>;

    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("submission {0} not found")]
    NotFound(i64),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),
}
