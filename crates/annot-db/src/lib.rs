//! # annot-db
//!
//! PostgreSQL storage layer for the annotation engine.
//!
//! This crate provides:
//! - Connection pool management
//! - The annotation repository (create/get/update/delete), where every
//!   mutation commits atomically with its history append
//! - The append-only history ledger with ordered reads
//! - Substring search with stable ordering and bounded pagination
//!
//! ## Example
//!
//! ```rust,ignore
//! use annot_db::Database;
//! use annot_core::AnnotationRepository;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/annot").await?;
//!
//!     let annotation = db.annotations.create("src1", "a1").await?;
//!     println!("Created annotation: {}", annotation.id);
//!     Ok(())
//! }
//! ```

pub mod annotations;
pub mod history;
pub mod pool;
pub mod search;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use annot_core::*;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// Re-export repository implementations
pub use annotations::PgAnnotationRepository;
pub use history::PgHistoryRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use search::{PgAnnotationSearch, SEARCH_PAGE_LIMIT};

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Annotation repository for lifecycle operations.
    pub annotations: PgAnnotationRepository,
    /// Append-only history ledger.
    pub history: PgHistoryRepository,
    /// Substring search over live annotations.
    pub search: PgAnnotationSearch,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            annotations: PgAnnotationRepository::new(pool.clone()),
            history: PgHistoryRepository::new(pool.clone()),
            search: PgAnnotationSearch::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    ///
    /// Pool sizing honors the `DATABASE_*` environment overrides (see
    /// [`PoolConfig::from_env`]).
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
