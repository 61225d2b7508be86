//! medproto-core
//!
//! Pure domain types for medical protocols: the 13 numbered sections, the
//! standard and clinical flowchart schemas, and validation report types.
//! No I/O. This is the shared vocabulary of the workspace.

pub mod error;
pub mod json;
pub mod models;
pub mod sections;
