//! Data model for annotations and their audit history.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Minimum length for `data_source_id` and `id` values.
pub const MIN_ID_LENGTH: usize = 1;

/// Workflow states an annotation can hold.
///
/// Stored as SCREAMING_SNAKE_CASE text in the database. The set is
/// caller-facing (see [`status_values`]) but not load-bearing for the
/// transactional contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Open,
    OpenEscalated,
    Closed,
}

impl Status {
    /// All status values in display order.
    pub const VALUES: [Status; 3] = [Status::Open, Status::OpenEscalated, Status::Closed];

    /// The stored (wire) form of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "OPEN",
            Status::OpenEscalated => "OPEN_ESCALATED",
            Status::Closed => "CLOSED",
        }
    }

    /// Human-readable display text.
    pub fn display_text(&self) -> &'static str {
        match self {
            Status::Open => "Open",
            Status::OpenEscalated => "Open - Escalated",
            Status::Closed => "Closed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Status::Open),
            "OPEN_ESCALATED" => Ok(Status::OpenEscalated),
            "CLOSED" => Ok(Status::Closed),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Map of status name to display text, as served to callers.
pub fn status_values() -> BTreeMap<String, String> {
    Status::VALUES
        .iter()
        .map(|s| (s.as_str().to_string(), s.display_text().to_string()))
        .collect()
}

/// Kind of mutation a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryOperation {
    Create,
    Update,
    Delete,
}

impl HistoryOperation {
    /// The stored (wire) form of this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryOperation::Create => "CREATE",
            HistoryOperation::Update => "UPDATE",
            HistoryOperation::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HistoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryOperation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(HistoryOperation::Create),
            "UPDATE" => Ok(HistoryOperation::Update),
            "DELETE" => Ok(HistoryOperation::Delete),
            other => Err(format!("unknown history operation '{}'", other)),
        }
    }
}

/// The mutable current-state record for one identifier within a data
/// source. At most one live row exists per `(data_source_id, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Owning partition key; with `id` forms the primary key.
    pub data_source_id: String,
    /// Caller-supplied identifier, unique within a data source.
    pub id: String,
    pub content: String,
    pub assign_to: String,
    pub status: Status,
    pub updated_by: String,
    /// Epoch millis, set on every write.
    pub last_updated: i64,
}

impl Annotation {
    pub const DATA_SOURCE_ID: &'static str = "data_source_id";
    pub const ID: &'static str = "id";
    pub const CONTENT: &'static str = "content";
    pub const ASSIGN_TO: &'static str = "assign_to";
    pub const STATUS: &'static str = "status";
    pub const UPDATED_BY: &'static str = "updated_by";
    pub const LAST_UPDATED: &'static str = "last_updated";

    pub const DEFAULT_CONTENT: &'static str = "";
    pub const DEFAULT_ASSIGNEE: &'static str = "";
    pub const DEFAULT_UPDATED_BY: &'static str = "SYSTEM";
    pub const DEFAULT_STATUS: Status = Status::Open;
}

/// Columns matched by substring search, in WHERE-clause order.
///
/// An explicit field list instead of a queryable-entity hierarchy: the
/// search scan matches `id`, `content`, and `assign_to` only.
pub const SEARCHABLE_FIELDS: [&str; 3] = [
    Annotation::ID,
    Annotation::CONTENT,
    Annotation::ASSIGN_TO,
];

/// One immutable audit record: the operation plus a full snapshot of
/// the annotation as of that operation (for deletes, as of immediately
/// before removal).
///
/// Insertion order is a database surrogate used only for ordered
/// retrieval; it is never exposed as an identity callers can query by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub data_source_id: String,
    pub annotation_id: String,
    pub operation: HistoryOperation,
    pub content: String,
    pub assign_to: String,
    pub status: Status,
    pub updated_by: String,
    pub last_updated: i64,
}

/// Full-replace update request. Every mutable field is overwritten,
/// so a field omitted by the caller still resets to its default — this
/// is deliberate, not a field-level merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateAnnotationRequest {
    pub content: String,
    pub assign_to: String,
    pub status: Status,
    pub updated_by: String,
}
