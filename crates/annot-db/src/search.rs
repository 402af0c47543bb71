//! Substring search over live annotations.
//!
//! Read-only scan of the current-state table, scoped to one data
//! source. Offset-based paging over a mutable table is not stable
//! under concurrent inserts/deletes between pages; this is a
//! best-effort scan, not a cursor or snapshot read.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use annot_core::{Annotation, AnnotationSearch, Error, Result, SEARCHABLE_FIELDS};

use crate::annotations::map_row_to_annotation;
use crate::escape_like;

/// Fixed maximum number of search results returned per call.
pub const SEARCH_PAGE_LIMIT: i64 = 10;

/// PostgreSQL implementation of AnnotationSearch.
pub struct PgAnnotationSearch {
    pool: PgPool,
}

impl PgAnnotationSearch {
    /// Create a new PgAnnotationSearch with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Unanchored substring pattern with LIKE wildcards in the query text
/// escaped, so user input always matches literally. An empty query
/// becomes `%%` and matches every row.
fn build_like_pattern(query: &str) -> String {
    format!("%{}%", escape_like(query))
}

/// OR-clause over the searchable columns, each matched against the
/// same pattern parameter.
fn build_match_clause() -> String {
    SEARCHABLE_FIELDS
        .iter()
        .map(|field| format!("{} LIKE $2 ESCAPE '\\'", field))
        .collect::<Vec<_>>()
        .join(" OR ")
}

#[async_trait]
impl AnnotationSearch for PgAnnotationSearch {
    async fn search(
        &self,
        data_source_id: &str,
        query: &str,
        offset: Option<i64>,
    ) -> Result<Vec<Annotation>> {
        let seek_position = offset.unwrap_or(0);

        info!(
            subsystem = "search",
            component = "annotations",
            op = "search",
            data_source_id = %data_source_id,
            query = %query,
            seek_position = seek_position,
            "Searching annotations"
        );

        let sql = format!(
            "SELECT data_source_id, id, content, assign_to, status, updated_by, last_updated
             FROM annotation
             WHERE data_source_id = $1 AND ({})
             ORDER BY id DESC
             LIMIT $3 OFFSET $4",
            build_match_clause()
        );

        let rows = sqlx::query(&sql)
            .bind(data_source_id)
            .bind(build_like_pattern(query))
            .bind(SEARCH_PAGE_LIMIT)
            .bind(seek_position)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        rows.into_iter().map(map_row_to_annotation).collect()
    }
}
