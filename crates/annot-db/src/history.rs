//! Append-only history ledger for annotation mutations.
//!
//! Entries are never updated or deleted. For a given
//! `(data_source_id, annotation_id)` the entries, read in insertion
//! order, exactly reconstruct the sequence of operations applied,
//! including for identifiers whose live row no longer exists.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::trace;

use annot_core::{
    Annotation, Error, HistoryEntry, HistoryOperation, HistoryRepository, Result, Status,
};

/// PostgreSQL implementation of the history ledger.
pub struct PgHistoryRepository {
    pool: PgPool,
}

impl PgHistoryRepository {
    /// Create a new PgHistoryRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one immutable entry inside the caller's transaction.
    ///
    /// There is no independent commit boundary: the entry becomes
    /// visible only when the surrounding mutation commits, and rolls
    /// back with it.
    pub async fn append_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        operation: HistoryOperation,
        snapshot: &Annotation,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO annotation_history
                 (data_source_id, annotation_id, operation, content, assign_to, status, updated_by, last_updated)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&snapshot.data_source_id)
        .bind(&snapshot.id)
        .bind(operation.as_str())
        .bind(&snapshot.content)
        .bind(&snapshot.assign_to)
        .bind(snapshot.status.as_str())
        .bind(&snapshot.updated_by)
        .bind(snapshot.last_updated)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        trace!(
            subsystem = "database",
            component = "history",
            op = operation.as_str(),
            data_source_id = %snapshot.data_source_id,
            annotation_id = %snapshot.id,
            "History point taken"
        );

        Ok(())
    }
}

fn map_row_to_history_entry(row: sqlx::postgres::PgRow) -> Result<HistoryEntry> {
    let operation: String = row.get("operation");
    let status: String = row.get("status");

    Ok(HistoryEntry {
        data_source_id: row.get("data_source_id"),
        annotation_id: row.get("annotation_id"),
        operation: HistoryOperation::from_str(&operation).map_err(Error::Internal)?,
        content: row.get("content"),
        assign_to: row.get("assign_to"),
        status: Status::from_str(&status).map_err(Error::Internal)?,
        updated_by: row.get("updated_by"),
        last_updated: row.get("last_updated"),
    })
}

#[async_trait]
impl HistoryRepository for PgHistoryRepository {
    async fn list(&self, data_source_id: &str, annotation_id: &str) -> Result<Vec<HistoryEntry>> {
        // entry_id is the insertion-order surrogate; it orders the read
        // but never leaves this query.
        let rows = sqlx::query(
            "SELECT data_source_id, annotation_id, operation, content, assign_to, status, updated_by, last_updated
             FROM annotation_history
             WHERE data_source_id = $1 AND annotation_id = $2
             ORDER BY entry_id ASC",
        )
        .bind(data_source_id)
        .bind(annotation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(map_row_to_history_entry).collect()
    }
}
