use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::db::models::{JobRow, JobStatusRow};
use crate::db::store::{JobStore, StoreError};
use super::models::{JobFilter, JobSort, JobStatusType, Listing, PageWindow};

/// Longest accepted job name, in characters
pub const MAX_NAME_LENGTH: usize = 255;

pub const DUPLICATE_NAME_MESSAGE: &str = "A job with this name already exists.";

/// Service-level errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input was malformed or outside the allowed set
    #[error("Validation error on `{field}`: {message}")]
    Validation {
        field: &'static str,
        message: String,
        allowed: Option<Vec<&'static str>>,
    },

    /// Job not found
    #[error("Job not found: {0}")]
    NotFound(i64),

    /// Another job already uses this name
    #[error("Job name already exists: {0}")]
    Conflict(String),

    /// Storage operation failed
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ServiceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field,
            message: message.into(),
            allowed: None,
        }
    }

    fn not_allowed(field: &'static str, value: &str, allowed: Vec<&'static str>) -> Self {
        ServiceError::Validation {
            field,
            message: format!(
                "Invalid {} '{}'. Allowed values: {}",
                field,
                value,
                allowed.join(", ")
            ),
            allowed: Some(allowed),
        }
    }
}

impl JobFilter {
    /// Build a list query from raw query-string values.
    ///
    /// Absent or empty values fall back to "no filter" and the default ordering.
    pub fn parse(status: Option<&str>, sort: Option<&str>) -> Result<Self, ServiceError> {
        let status = match status.filter(|s| !s.is_empty()) {
            Some(raw) => Some(raw.parse::<JobStatusType>().map_err(|_| {
                ServiceError::not_allowed("status", raw, JobStatusType::allowed_values())
            })?),
            None => None,
        };

        let sort = match sort.filter(|s| !s.is_empty()) {
            Some(raw) => raw
                .parse::<JobSort>()
                .map_err(|_| ServiceError::not_allowed("sort", raw, JobSort::allowed_values()))?,
            None => JobSort::default(),
        };

        Ok(JobFilter { status, sort })
    }
}

/// Job lifecycle service: the only writer of jobs and their history
pub struct JobService {
    store: Arc<dyn JobStore>,
}

impl JobService {
    /// Create a new JobService instance
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Create a job with its initial PENDING history entry
    ///
    /// # Business Logic
    /// - Trims the name and rejects empty or over-long names
    /// - Rejects names already in use, both on the pre-check and when the
    ///   storage unique constraint fires at commit time
    ///
    /// # Returns
    /// - `Ok(JobRow)` - Job created with exactly one history entry
    /// - `Err(ServiceError::Conflict)` - Name taken
    pub async fn create_job(&self, name: &str) -> Result<JobRow, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            warn!("Service: Rejected empty job name");
            return Err(ServiceError::validation(
                "name",
                "Job name cannot be empty or whitespace only.",
            ));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            warn!("Service: Rejected job name longer than {} characters", MAX_NAME_LENGTH);
            return Err(ServiceError::validation(
                "name",
                format!("Job name must be at most {} characters.", MAX_NAME_LENGTH),
            ));
        }

        info!("Service: Creating job with name={}", name);

        if self.store.find_job_by_name(name).await?.is_some() {
            warn!("Service: Job name already exists: {}", name);
            return Err(ServiceError::Conflict(name.to_string()));
        }

        match self.store.insert_job(name).await {
            Ok((job, status)) => {
                info!(
                    "Service: Job created successfully with id={}, initial status id={}",
                    job.id, status.id
                );
                Ok(job)
            }
            Err(StoreError::UniqueViolation(constraint)) => {
                warn!(
                    "Service: Concurrent create for name={} rejected by constraint {}",
                    name, constraint
                );
                Err(ServiceError::Conflict(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Record a new status for a job. Any status may follow any other.
    pub async fn update_job_status(
        &self,
        job: &JobRow,
        new_status: JobStatusType,
    ) -> Result<JobStatusRow, ServiceError> {
        info!(
            "Service: Job id={} status {} -> {}",
            job.id, job.current_status_type, new_status
        );

        let (_, entry) = self
            .store
            .append_status(job.id, new_status)
            .await?
            .ok_or(ServiceError::NotFound(job.id))?;

        Ok(entry)
    }

    /// Delete a job and its entire history
    pub async fn delete_job(&self, job: &JobRow) -> Result<(), ServiceError> {
        info!("Service: Deleting job id={}", job.id);

        if !self.store.delete_job(job.id).await? {
            return Err(ServiceError::NotFound(job.id));
        }
        Ok(())
    }

    pub async fn get_job(&self, job_id: i64) -> Result<JobRow, ServiceError> {
        debug!("Service: Fetching job id={}", job_id);

        self.store
            .find_job(job_id)
            .await?
            .ok_or(ServiceError::NotFound(job_id))
    }

    pub async fn list_jobs(
        &self,
        filter: &JobFilter,
        window: PageWindow,
    ) -> Result<Listing<JobRow>, ServiceError> {
        Ok(self.store.list_jobs(filter, window).await?)
    }

    /// History newest first. An unknown job simply has no entries.
    pub async fn get_status_history(
        &self,
        job_id: i64,
        window: PageWindow,
    ) -> Result<Listing<JobStatusRow>, ServiceError> {
        Ok(self.store.list_statuses(job_id, window).await?)
    }

    pub async fn check_storage(&self) -> Result<(), ServiceError> {
        Ok(self.store.ping().await?)
    }
}
