//! Formkit Core
//!
//! Schema-driven form engine: field descriptors, the admin-side editor,
//! validation rules and the user-side form session.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐  export/import  ┌────────────────────┐
//! │   AdminEditor    │ ──── JSON ────▶ │    FormSession     │
//! │ (FormDocument +  │                 │ (live values,      │
//! │  JSON buffer)    │                 │  errors, output)   │
//! └────────┬─────────┘                 └─────────┬──────────┘
//!          │                                     │ SubmitRequest
//!          ▼                                     ▼
//!   domain::{Field, Group}              ports::SubmissionRepository
//! ```
//!
//! - **Domain Layer**: fields, groups, documents, live values, submissions
//! - **Editor**: pure transformations over the document, JSON sync
//! - **Validation**: pattern and required-subset rules
//! - **Session**: value resolution, grouping, output assembly, submit state
//! - **Ports**: persistence interface implemented by the REST service

pub mod domain;
pub mod editor;
pub mod error;
pub mod markup;
pub mod ports;
pub mod session;
pub mod validation;

// Re-exports for convenience
pub use domain::document::{DocumentPayload, ExportFormat, FormDocument, LintFinding, LintKind, Severity};
pub use domain::field::{CheckboxField, Field, FieldCommon, FieldKind, ListField, MapField, RadioField, TextField};
pub use domain::group::Group;
pub use domain::submission::{FormData, Submission, SubmissionAck};
pub use domain::value::FieldValue;
pub use editor::{AdminEditor, MapRow, PatternTarget};
pub use error::{ImportError, SessionError, SubmitBlocked};
pub use ports::{RepositoryError, SubmissionRepository};
pub use session::{FormSession, Notice, NoticeKind, Section, SessionMode, SubmitRequest};
pub use validation::ValidationError;
