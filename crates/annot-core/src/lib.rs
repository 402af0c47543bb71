//! # annot-core
//!
//! Core types, traits, and abstractions for the annotation engine.
//!
//! This crate provides the shared data model (annotations, history
//! entries, status enumeration), the error taxonomy, and the
//! repository trait definitions that `annot-db` implements.

pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::{
    status_values, Annotation, HistoryEntry, HistoryOperation, Status, UpdateAnnotationRequest,
    MIN_ID_LENGTH, SEARCHABLE_FIELDS,
};
pub use traits::{AnnotationRepository, AnnotationSearch, HistoryRepository};
