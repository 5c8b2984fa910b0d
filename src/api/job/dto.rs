use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::models::{JobRow, JobStatusRow};
use crate::jobs::JobStatusType;

/// Job representation returned by detail, create and update endpoints
#[derive(Debug, Serialize)]
pub struct JobDetail {
    pub id: i64,
    pub name: String,
    pub current_status_type: JobStatusType,
    pub current_status_timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List items share the detail shape
pub type JobSummary = JobDetail;

impl From<JobRow> for JobDetail {
    fn from(row: JobRow) -> Self {
        JobDetail {
            id: row.id,
            name: row.name,
            current_status_type: row.current_status_type,
            current_status_timestamp: row.current_status_timestamp,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// One status history entry
#[derive(Debug, Serialize)]
pub struct StatusEntry {
    pub id: i64,
    pub status_type: JobStatusType,
    pub timestamp: DateTime<Utc>,
}

impl From<JobStatusRow> for StatusEntry {
    fn from(row: JobStatusRow) -> Self {
        StatusEntry {
            id: row.id,
            status_type: row.status_type,
            timestamp: row.timestamp,
        }
    }
}
