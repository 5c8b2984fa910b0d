use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::jobs::JobStatusType;

/// Database representation of a job with its denormalized current status
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct JobRow {
    pub id: i64,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub current_status_type: JobStatusType,
    /// Null only inside the creating transaction
    pub current_status_timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One immutable entry of a job's status history
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct JobStatusRow {
    pub id: i64,
    pub job_id: i64,
    #[sqlx(try_from = "String")]
    pub status_type: JobStatusType,
    pub timestamp: DateTime<Utc>,
}
