//! Formkit Client
//!
//! Talks to the submission service over HTTP and loads form definitions
//! from a URL or a local file.
//!
//! Every call is a single request: no retries, bounded by the configured
//! timeout. Failures come back as [`ClientError`] values for the caller to
//! surface; nothing here touches form or editor state.

pub mod config;
pub mod error;
pub mod form_source;
pub mod submissions;

pub use config::ClientConfig;
pub use error::ClientError;
pub use form_source::FormLocation;
pub use submissions::SubmissionClient;
