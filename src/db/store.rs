use async_trait::async_trait;
use thiserror::Error;

use crate::db::models::{JobRow, JobStatusRow};
use crate::jobs::{JobFilter, JobStatusType, Listing, PageWindow};

/// Storage-level failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }
        StoreError::Database(err)
    }
}

/// Persistence boundary for jobs and their status history.
///
/// Each write method is a single atomic unit: either every row it touches is
/// committed or none is.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a job together with its initial PENDING history entry.
    async fn insert_job(&self, name: &str) -> Result<(JobRow, JobStatusRow), StoreError>;

    /// Append a history entry and mirror it onto the job row.
    ///
    /// Returns `None` when the job no longer exists.
    async fn append_status(
        &self,
        job_id: i64,
        status: JobStatusType,
    ) -> Result<Option<(JobRow, JobStatusRow)>, StoreError>;

    /// Delete a job and, by cascade, its history. Returns whether a job was removed.
    async fn delete_job(&self, job_id: i64) -> Result<bool, StoreError>;

    async fn find_job(&self, job_id: i64) -> Result<Option<JobRow>, StoreError>;

    async fn find_job_by_name(&self, name: &str) -> Result<Option<JobRow>, StoreError>;

    async fn list_jobs(
        &self,
        filter: &JobFilter,
        window: PageWindow,
    ) -> Result<Listing<JobRow>, StoreError>;

    /// History newest first, ties broken by highest id.
    async fn list_statuses(
        &self,
        job_id: i64,
        window: PageWindow,
    ) -> Result<Listing<JobStatusRow>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
