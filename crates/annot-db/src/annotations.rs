//! Annotation repository implementation.
//!
//! Each write composes its own state change with a history append
//! inside one transaction; any failure rolls back both. sqlx rolls an
//! un-committed transaction back when the handle drops, so every early
//! return leaves no partial state.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::debug;

use annot_core::{
    Annotation, AnnotationRepository, Error, HistoryOperation, Result, Status,
    UpdateAnnotationRequest, MIN_ID_LENGTH,
};

use crate::history::PgHistoryRepository;

/// PostgreSQL implementation of AnnotationRepository.
pub struct PgAnnotationRepository {
    pool: PgPool,
    history: PgHistoryRepository,
}

impl PgAnnotationRepository {
    /// Create a new PgAnnotationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        let history = PgHistoryRepository::new(pool.clone());
        Self { pool, history }
    }

    fn now_millis() -> i64 {
        Utc::now().timestamp_millis()
    }

    fn validate_key(data_source_id: &str, id: &str) -> Result<()> {
        if data_source_id.len() < MIN_ID_LENGTH {
            return Err(Error::InvalidInput(
                "data_source_id must not be empty".to_string(),
            ));
        }
        if id.len() < MIN_ID_LENGTH {
            return Err(Error::InvalidInput("id must not be empty".to_string()));
        }
        Ok(())
    }
}

pub(crate) fn map_row_to_annotation(row: sqlx::postgres::PgRow) -> Result<Annotation> {
    let status: String = row.get("status");

    Ok(Annotation {
        data_source_id: row.get("data_source_id"),
        id: row.get("id"),
        content: row.get("content"),
        assign_to: row.get("assign_to"),
        status: Status::from_str(&status).map_err(Error::Internal)?,
        updated_by: row.get("updated_by"),
        last_updated: row.get("last_updated"),
    })
}

#[async_trait]
impl AnnotationRepository for PgAnnotationRepository {
    async fn create(&self, data_source_id: &str, id: &str) -> Result<Annotation> {
        Self::validate_key(data_source_id, id)?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let annotation = self.create_tx(&mut tx, data_source_id, id).await?;
        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "annotations",
            op = "create",
            data_source_id = %data_source_id,
            annotation_id = %id,
            "Annotation created"
        );

        Ok(annotation)
    }

    async fn get(&self, data_source_id: &str, id: &str) -> Result<Annotation> {
        Self::validate_key(data_source_id, id)?;

        let row = sqlx::query(
            "SELECT data_source_id, id, content, assign_to, status, updated_by, last_updated
             FROM annotation
             WHERE data_source_id = $1 AND id = $2",
        )
        .bind(data_source_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound(format!("Annotation {}/{}", data_source_id, id)))?;

        map_row_to_annotation(row)
    }

    async fn update(
        &self,
        data_source_id: &str,
        id: &str,
        req: UpdateAnnotationRequest,
    ) -> Result<Annotation> {
        Self::validate_key(data_source_id, id)?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let annotation = self.update_tx(&mut tx, data_source_id, id, req).await?;
        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "annotations",
            op = "update",
            data_source_id = %data_source_id,
            annotation_id = %id,
            "Annotation updated"
        );

        Ok(annotation)
    }

    async fn delete(&self, data_source_id: &str, id: &str) -> Result<()> {
        Self::validate_key(data_source_id, id)?;

        // Advisory read to populate the history snapshot. The
        // transactional delete below re-checks row visibility, so a
        // concurrent delete surfaces as NotFound rather than a stale
        // committed snapshot.
        let snapshot = self.get(data_source_id, id).await?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        self.delete_tx(&mut tx, data_source_id, id, &snapshot)
            .await?;
        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "annotations",
            op = "delete",
            data_source_id = %data_source_id,
            annotation_id = %id,
            "Annotation deleted"
        );

        Ok(())
    }

    async fn exists(&self, data_source_id: &str, id: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM annotation WHERE data_source_id = $1 AND id = $2)",
        )
        .bind(data_source_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(exists)
    }
}

/// Transaction-aware variants.
///
/// These methods accept an existing transaction, allowing the row
/// mutation and its history append to commit or roll back as one unit,
/// and letting callers compose further work into the same boundary.
impl PgAnnotationRepository {
    /// Insert an annotation with default field values within an
    /// existing transaction, appending its CREATE history entry.
    ///
    /// Two concurrent creates for the same pair race at the primary
    /// key: exactly one commits, the other observes `Conflict`.
    pub async fn create_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        data_source_id: &str,
        id: &str,
    ) -> Result<Annotation> {
        let now = Self::now_millis();

        sqlx::query(
            "INSERT INTO annotation (data_source_id, id, content, assign_to, status, updated_by, last_updated)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(data_source_id)
        .bind(id)
        .bind(Annotation::DEFAULT_CONTENT)
        .bind(Annotation::DEFAULT_ASSIGNEE)
        .bind(Annotation::DEFAULT_STATUS.as_str())
        .bind(Annotation::DEFAULT_UPDATED_BY)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => Error::Conflict(format!(
                "Annotation {}/{} already exists",
                data_source_id, id
            )),
            _ => Error::Database(e),
        })?;

        let annotation = self.get_tx(tx, data_source_id, id).await?;
        self.history
            .append_tx(tx, HistoryOperation::Create, &annotation)
            .await?;

        Ok(annotation)
    }

    /// Fetch an annotation within an existing transaction.
    pub async fn get_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        data_source_id: &str,
        id: &str,
    ) -> Result<Annotation> {
        let row = sqlx::query(
            "SELECT data_source_id, id, content, assign_to, status, updated_by, last_updated
             FROM annotation
             WHERE data_source_id = $1 AND id = $2",
        )
        .bind(data_source_id)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound(format!("Annotation {}/{}", data_source_id, id)))?;

        map_row_to_annotation(row)
    }

    /// Replace the mutable fields within an existing transaction,
    /// appending an UPDATE history entry with the post-update state.
    ///
    /// Full replace, not a merge: every mutable field is overwritten.
    /// There is no version token guarding against interleaved writers;
    /// the last transaction to commit wins.
    pub async fn update_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        data_source_id: &str,
        id: &str,
        req: UpdateAnnotationRequest,
    ) -> Result<Annotation> {
        let now = Self::now_millis();

        let result = sqlx::query(
            "UPDATE annotation
             SET content = $3, assign_to = $4, status = $5, updated_by = $6, last_updated = $7
             WHERE data_source_id = $1 AND id = $2",
        )
        .bind(data_source_id)
        .bind(id)
        .bind(&req.content)
        .bind(&req.assign_to)
        .bind(req.status.as_str())
        .bind(&req.updated_by)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!(
                "Annotation {}/{}",
                data_source_id, id
            )));
        }

        let annotation = self.get_tx(tx, data_source_id, id).await?;
        self.history
            .append_tx(tx, HistoryOperation::Update, &annotation)
            .await?;

        Ok(annotation)
    }

    /// Delete the live row within an existing transaction, appending a
    /// DELETE history entry carrying `snapshot` (the state as read
    /// before deletion).
    ///
    /// Zero affected rows means the row vanished since the snapshot
    /// was taken; the transaction rolls back and `NotFound` surfaces.
    pub async fn delete_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        data_source_id: &str,
        id: &str,
        snapshot: &Annotation,
    ) -> Result<()> {
        let result = sqlx::query("DELETE FROM annotation WHERE data_source_id = $1 AND id = $2")
            .bind(data_source_id)
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!(
                "Annotation {}/{}",
                data_source_id, id
            )));
        }

        self.history
            .append_tx(tx, HistoryOperation::Delete, snapshot)
            .await?;

        Ok(())
    }

    /// Check whether a live row exists within an existing transaction.
    pub async fn exists_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        data_source_id: &str,
        id: &str,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM annotation WHERE data_source_id = $1 AND id = $2)",
        )
        .bind(data_source_id)
        .bind(id)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)?;
        Ok(exists)
    }
}
