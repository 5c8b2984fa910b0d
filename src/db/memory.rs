//! In-process `JobStore` used by unit and HTTP tests.
//!
//! A single mutex guards both tables, so every write is atomic in the same
//! sense as a committed transaction.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::db::models::{JobRow, JobStatusRow};
use crate::db::store::{JobStore, StoreError};
use crate::jobs::{JobFilter, JobSort, JobStatusType, Listing, PageWindow};

#[derive(Default)]
struct Tables {
    jobs: BTreeMap<i64, JobRow>,
    statuses: Vec<JobStatusRow>,
    next_job_id: i64,
    next_status_id: i64,
}

impl Tables {
    fn push_status(&mut self, job_id: i64, status_type: JobStatusType) -> JobStatusRow {
        self.next_status_id += 1;
        let entry = JobStatusRow {
            id: self.next_status_id,
            job_id,
            status_type,
            timestamp: Utc::now(),
        };
        self.statuses.push(entry.clone());
        entry
    }
}

fn page<T: Clone>(rows: &[T], window: PageWindow) -> Vec<T> {
    rows.iter()
        .skip(window.offset.max(0) as usize)
        .take(window.limit.max(0) as usize)
        .cloned()
        .collect()
}

#[derive(Default)]
pub struct MemoryJobStore {
    tables: Mutex<Tables>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored history entry, including those of other jobs.
    pub fn status_count(&self) -> usize {
        self.tables.lock().unwrap().statuses.len()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert_job(&self, name: &str) -> Result<(JobRow, JobStatusRow), StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.jobs.values().any(|job| job.name == name) {
            return Err(StoreError::UniqueViolation("jobs_name_key".to_string()));
        }

        tables.next_job_id += 1;
        let id = tables.next_job_id;
        let now = Utc::now();
        let status = tables.push_status(id, JobStatusType::Pending);
        let job = JobRow {
            id,
            name: name.to_string(),
            current_status_type: JobStatusType::Pending,
            current_status_timestamp: Some(status.timestamp),
            created_at: now,
            updated_at: status.timestamp,
        };
        tables.jobs.insert(id, job.clone());
        Ok((job, status))
    }

    async fn append_status(
        &self,
        job_id: i64,
        status: JobStatusType,
    ) -> Result<Option<(JobRow, JobStatusRow)>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.jobs.contains_key(&job_id) {
            return Ok(None);
        }

        let entry = tables.push_status(job_id, status);
        let Some(job) = tables.jobs.get_mut(&job_id) else {
            return Ok(None);
        };
        job.current_status_type = entry.status_type;
        job.current_status_timestamp = Some(entry.timestamp);
        job.updated_at = entry.timestamp;
        Ok(Some((job.clone(), entry)))
    }

    async fn delete_job(&self, job_id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.jobs.remove(&job_id).is_none() {
            return Ok(false);
        }
        tables.statuses.retain(|entry| entry.job_id != job_id);
        Ok(true)
    }

    async fn find_job(&self, job_id: i64) -> Result<Option<JobRow>, StoreError> {
        Ok(self.tables.lock().unwrap().jobs.get(&job_id).cloned())
    }

    async fn find_job_by_name(&self, name: &str) -> Result<Option<JobRow>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.jobs.values().find(|job| job.name == name).cloned())
    }

    async fn list_jobs(
        &self,
        filter: &JobFilter,
        window: PageWindow,
    ) -> Result<Listing<JobRow>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<JobRow> = tables
            .jobs
            .values()
            .filter(|job| filter.status.map_or(true, |s| job.current_status_type == s))
            .cloned()
            .collect();

        rows.sort_by(|a, b| match filter.sort {
            JobSort::NameAsc => a.name.cmp(&b.name).then(a.id.cmp(&b.id)),
            JobSort::NameDesc => b.name.cmp(&a.name).then(b.id.cmp(&a.id)),
            JobSort::CreatedAtAsc => a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)),
            JobSort::CreatedAtDesc => b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)),
        });

        Ok(Listing {
            items: page(&rows, window),
            total: rows.len() as i64,
        })
    }

    async fn list_statuses(
        &self,
        job_id: i64,
        window: PageWindow,
    ) -> Result<Listing<JobStatusRow>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<JobStatusRow> = tables
            .statuses
            .iter()
            .filter(|entry| entry.job_id == job_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

        Ok(Listing {
            items: page(&rows, window),
            total: rows.len() as i64,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
