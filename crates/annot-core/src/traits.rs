//! Repository traits for the annotation engine.
//!
//! These traits define the collaborator-facing surface consumed by the
//! request-handling layer, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Annotation, HistoryEntry, UpdateAnnotationRequest};

/// Repository for annotation lifecycle operations.
///
/// Every mutation composes its row change with a history append inside
/// one atomic transaction: both commit or neither does.
#[async_trait]
pub trait AnnotationRepository: Send + Sync {
    /// Create an annotation with default field values.
    ///
    /// Returns `Conflict` if a live row already exists for the pair.
    async fn create(&self, data_source_id: &str, id: &str) -> Result<Annotation>;

    /// Fetch the live annotation, or `NotFound`.
    async fn get(&self, data_source_id: &str, id: &str) -> Result<Annotation>;

    /// Replace `content`, `assign_to`, `status`, and `updated_by`
    /// wholesale and set `last_updated`. Returns `NotFound` when no
    /// live row matches.
    async fn update(
        &self,
        data_source_id: &str,
        id: &str,
        req: UpdateAnnotationRequest,
    ) -> Result<Annotation>;

    /// Remove the live row, recording a DELETE history entry with the
    /// pre-deletion snapshot. Returns `NotFound` when no live row
    /// matches.
    async fn delete(&self, data_source_id: &str, id: &str) -> Result<()>;

    /// Check whether a live row exists for the pair.
    async fn exists(&self, data_source_id: &str, id: &str) -> Result<bool>;
}

/// Read side of the append-only history ledger.
///
/// Appends happen inside the mutating transaction and are exposed as
/// transaction-aware methods on the concrete repository, not here.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// All history entries for the pair in ascending insertion order.
    ///
    /// Returns an empty sequence (not an error) when the id has no
    /// history, and works whether or not the live row still exists.
    async fn list(&self, data_source_id: &str, annotation_id: &str) -> Result<Vec<HistoryEntry>>;
}

/// Substring search over live annotations within one data source.
#[async_trait]
pub trait AnnotationSearch: Send + Sync {
    /// Live rows whose `id`, `content`, or `assign_to` contains `query`
    /// as a substring, ordered by `id` descending, at most one page.
    ///
    /// `offset` skips that many matching rows (`None` means 0).
    async fn search(
        &self,
        data_source_id: &str,
        query: &str,
        offset: Option<i64>,
    ) -> Result<Vec<Annotation>>;
}
