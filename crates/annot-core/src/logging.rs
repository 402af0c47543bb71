//! Structured logging schema and field name constants.
//!
//! All crates use these constants for consistent structured logging
//! fields, so log aggregation tools can query by standardized names
//! across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, search requests |
//! | DEBUG | Decision points, operation completions |
//! | TRACE | Per-item events (history points taken) |
//!
//! Expected outcomes (`NotFound`, `Conflict`) are returned to the
//! caller and never logged at WARN or above.

/// Subsystem originating the log event.
/// Values: "database", "search"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "annotations", "history", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create", "update", "delete", "search"
pub const OPERATION: &str = "op";

/// Data source (partition) being operated on.
pub const DATA_SOURCE_ID: &str = "data_source_id";

/// Annotation identifier being operated on.
pub const ANNOTATION_ID: &str = "annotation_id";

/// Search query text.
pub const QUERY: &str = "query";

/// Pagination position for search.
pub const SEEK_POSITION: &str = "seek_position";

/// Number of results returned by a search or query.
pub const RESULT_COUNT: &str = "result_count";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
