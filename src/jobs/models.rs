use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of a job.
///
/// Any value is a legal successor of any other; the service records
/// transitions without consulting a state machine.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatusType {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatusType {
    pub const ALL: [JobStatusType; 4] = [
        JobStatusType::Pending,
        JobStatusType::Running,
        JobStatusType::Completed,
        JobStatusType::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatusType::Pending => "PENDING",
            JobStatusType::Running => "RUNNING",
            JobStatusType::Completed => "COMPLETED",
            JobStatusType::Failed => "FAILED",
        }
    }

    pub fn allowed_values() -> Vec<&'static str> {
        Self::ALL.iter().map(JobStatusType::as_str).collect()
    }
}

impl fmt::Display for JobStatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown job status `{0}`")]
pub struct UnknownStatus(pub String);

impl FromStr for JobStatusType {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

// Used by sqlx when decoding TEXT columns into rows.
impl TryFrom<String> for JobStatusType {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Ordering applied to job listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobSort {
    NameAsc,
    NameDesc,
    CreatedAtAsc,
    #[default]
    CreatedAtDesc,
}

impl JobSort {
    pub const ALL: [JobSort; 4] = [
        JobSort::NameAsc,
        JobSort::NameDesc,
        JobSort::CreatedAtAsc,
        JobSort::CreatedAtDesc,
    ];

    /// Query-string spelling; a leading `-` means descending.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobSort::NameAsc => "name",
            JobSort::NameDesc => "-name",
            JobSort::CreatedAtAsc => "created_at",
            JobSort::CreatedAtDesc => "-created_at",
        }
    }

    /// SQL ORDER BY body. Ties on `created_at` fall back to insertion order
    /// in the same direction.
    pub fn order_clause(&self) -> &'static str {
        match self {
            JobSort::NameAsc => "name ASC, id ASC",
            JobSort::NameDesc => "name DESC, id DESC",
            JobSort::CreatedAtAsc => "created_at ASC, id ASC",
            JobSort::CreatedAtDesc => "created_at DESC, id DESC",
        }
    }

    pub fn allowed_values() -> Vec<&'static str> {
        Self::ALL.iter().map(JobSort::as_str).collect()
    }
}

impl FromStr for JobSort {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|sort| sort.as_str() == s).ok_or(())
    }
}

/// Validated list query: optional status filter plus ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub status: Option<JobStatusType>,
    pub sort: JobSort,
}

/// Offset/limit window pushed down to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

impl PageWindow {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }
}

/// One page of results together with the total number of matching rows.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: i64,
}
