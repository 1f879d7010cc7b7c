//! Domain layer
//!
//! Field descriptors, groups, the form document and the values a user enters.

pub mod document;
pub mod field;
pub mod group;
pub mod submission;
pub mod value;

pub use document::FormDocument;
pub use field::{Field, FieldKind};
pub use group::Group;
pub use submission::Submission;
pub use value::FieldValue;
