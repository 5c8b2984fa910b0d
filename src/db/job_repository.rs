use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};
use tracing::debug;

use crate::db::models::{JobRow, JobStatusRow};
use crate::db::store::{JobStore, StoreError};
use crate::jobs::{JobFilter, JobStatusType, Listing, PageWindow};

const JOB_COLUMNS: &str =
    "id, name, current_status_type, current_status_timestamp, created_at, updated_at";

/// PostgreSQL-backed job storage
pub struct JobRepository {
    pool: Pool<Postgres>,
}

impl JobRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) {
        if let Some(status) = filter.status {
            builder
                .push(" WHERE current_status_type = ")
                .push_bind(status.as_str());
        }
    }
}

#[async_trait]
impl JobStore for JobRepository {
    async fn insert_job(&self, name: &str) -> Result<(JobRow, JobStatusRow), StoreError> {
        debug!("Inserting job: name={}", name);

        let mut tx = self.pool.begin().await?;

        let job_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO jobs (name, current_status_type, current_status_timestamp)
            VALUES ($1, $2, NULL)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(JobStatusType::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let status = sqlx::query_as::<_, JobStatusRow>(
            r#"
            INSERT INTO job_statuses (job_id, status_type)
            VALUES ($1, $2)
            RETURNING id, job_id, status_type, timestamp
            "#,
        )
        .bind(job_id)
        .bind(JobStatusType::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let job = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            UPDATE jobs
            SET current_status_timestamp = $2, updated_at = clock_timestamp()
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(status.timestamp)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!("Job inserted with id={}", job.id);
        Ok((job, status))
    }

    async fn append_status(
        &self,
        job_id: i64,
        status: JobStatusType,
    ) -> Result<Option<(JobRow, JobStatusRow)>, StoreError> {
        debug!("Appending status: job_id={}, status={}", job_id, status);

        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent writers of the same job
        let locked: Option<i64> = sqlx::query_scalar("SELECT id FROM jobs WHERE id = $1 FOR UPDATE")
            .bind(job_id)
            .fetch_optional(&mut *tx)
            .await?;

        if locked.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let entry = sqlx::query_as::<_, JobStatusRow>(
            r#"
            INSERT INTO job_statuses (job_id, status_type)
            VALUES ($1, $2)
            RETURNING id, job_id, status_type, timestamp
            "#,
        )
        .bind(job_id)
        .bind(status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let job = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            UPDATE jobs
            SET current_status_type = $2,
                current_status_timestamp = $3,
                updated_at = clock_timestamp()
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(entry.status_type.as_str())
        .bind(entry.timestamp)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!("Status entry id={} recorded for job id={}", entry.id, job_id);
        Ok(Some((job, entry)))
    }

    async fn delete_job(&self, job_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;

        debug!("Delete job id={}: {} rows affected", job_id, result.rows_affected());
        Ok(result.rows_affected() > 0)
    }

    async fn find_job(&self, job_id: i64) -> Result<Option<JobRow>, StoreError> {
        let job = sqlx::query_as::<_, JobRow>(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"))
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    async fn find_job_by_name(&self, name: &str) -> Result<Option<JobRow>, StoreError> {
        let job = sqlx::query_as::<_, JobRow>(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE name = $1"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    async fn list_jobs(
        &self,
        filter: &JobFilter,
        window: PageWindow,
    ) -> Result<Listing<JobRow>, StoreError> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM jobs");
        Self::push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut page_query = QueryBuilder::<Postgres>::new(format!("SELECT {JOB_COLUMNS} FROM jobs"));
        Self::push_filter(&mut page_query, filter);
        page_query
            .push(" ORDER BY ")
            .push(filter.sort.order_clause())
            .push(" LIMIT ")
            .push_bind(window.limit)
            .push(" OFFSET ")
            .push_bind(window.offset);

        let items = page_query
            .build_query_as::<JobRow>()
            .fetch_all(&self.pool)
            .await?;

        debug!(
            "Listed {} of {} jobs (status={:?}, sort={})",
            items.len(),
            total,
            filter.status,
            filter.sort.as_str()
        );
        Ok(Listing { items, total })
    }

    async fn list_statuses(
        &self,
        job_id: i64,
        window: PageWindow,
    ) -> Result<Listing<JobStatusRow>, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM job_statuses WHERE job_id = $1")
            .bind(job_id)
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, JobStatusRow>(
            r#"
            SELECT id, job_id, status_type, timestamp
            FROM job_statuses
            WHERE job_id = $1
            ORDER BY timestamp DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(job_id)
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(Listing { items, total })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

/// These run against a live PostgreSQL instance: `DATABASE_URL=... cargo test -- --ignored`
#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobSort;
    use sqlx::PgPool;

    fn window() -> PageWindow {
        PageWindow::new(100, 0)
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn insert_creates_job_with_single_pending_entry(pool: PgPool) {
        let repo = JobRepository::new(pool);

        let (job, status) = repo.insert_job("Alpha").await.unwrap();

        assert_eq!(job.current_status_type, JobStatusType::Pending);
        assert_eq!(job.current_status_timestamp, Some(status.timestamp));
        let history = repo.list_statuses(job.id, window()).await.unwrap();
        assert_eq!(history.total, 1);
        assert_eq!(history.items[0], status);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn duplicate_name_is_reported_as_unique_violation(pool: PgPool) {
        let repo = JobRepository::new(pool);
        repo.insert_job("X").await.unwrap();

        let err = repo.insert_job("X").await.unwrap_err();

        assert!(matches!(err, StoreError::UniqueViolation(ref c) if c == "jobs_name_key"));
        let all = repo.list_jobs(&JobFilter::default(), window()).await.unwrap();
        assert_eq!(all.total, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn append_status_mirrors_latest_entry(pool: PgPool) {
        let repo = JobRepository::new(pool);
        let (job, _) = repo.insert_job("Alpha").await.unwrap();

        let (updated, entry) = repo
            .append_status(job.id, JobStatusType::Running)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.current_status_type, JobStatusType::Running);
        assert_eq!(updated.current_status_timestamp, Some(entry.timestamp));
        assert!(updated.updated_at >= job.updated_at);
        assert_eq!(updated.created_at, job.created_at);

        let history = repo.list_statuses(job.id, window()).await.unwrap();
        let kinds: Vec<_> = history.items.iter().map(|s| s.status_type).collect();
        assert_eq!(kinds, vec![JobStatusType::Running, JobStatusType::Pending]);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn delete_cascades_to_history(pool: PgPool) {
        let repo = JobRepository::new(pool.clone());
        let (job, _) = repo.insert_job("Doomed").await.unwrap();
        repo.append_status(job.id, JobStatusType::Failed).await.unwrap();

        assert!(repo.delete_job(job.id).await.unwrap());
        assert!(!repo.delete_job(job.id).await.unwrap());

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM job_statuses WHERE job_id = $1")
            .bind(job.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
        assert!(repo.append_status(job.id, JobStatusType::Running).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn list_filters_sorts_and_pages(pool: PgPool) {
        let repo = JobRepository::new(pool);
        for name in ["Charlie", "Alpha", "Bravo"] {
            repo.insert_job(name).await.unwrap();
        }
        let bravo = repo.find_job_by_name("Bravo").await.unwrap().unwrap();
        repo.append_status(bravo.id, JobStatusType::Running).await.unwrap();

        let by_name = JobFilter { status: None, sort: JobSort::NameAsc };
        let page = repo.list_jobs(&by_name, PageWindow::new(2, 0)).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(page.total, 3);
        assert_eq!(names, vec!["Alpha", "Bravo"]);

        let running = JobFilter { status: Some(JobStatusType::Running), ..JobFilter::default() };
        let page = repo.list_jobs(&running, window()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Bravo");

        let newest_first = repo.list_jobs(&JobFilter::default(), window()).await.unwrap();
        let names: Vec<_> = newest_first.items.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["Bravo", "Alpha", "Charlie"]);
    }
}
