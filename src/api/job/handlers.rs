use actix_web::{
    HttpRequest, HttpResponse, delete, get, patch, post,
    web::{Bytes, Data, Path, Query, ServiceConfig, scope},
};
use actix_web_validator::Json;

use crate::api::pagination::{PageParams, Paginated};
use crate::api::validation::describe_payload_error;
use crate::db::models::JobRow;
use crate::jobs::{JobFilter, JobService, JobStatusType, ServiceError};
use super::dto::{JobDetail, JobSummary, StatusEntry};
use super::models::{CreateJobRequest, ListJobsParams, UpdateJobStatusRequest};

/// Ids arrive as raw path segments so a non-integer is a 400, not a routing miss
fn parse_job_id(raw: &str) -> Result<i64, ServiceError> {
    raw.parse::<i64>()
        .map_err(|_| ServiceError::validation("id", "Invalid job id. It must be an integer."))
}

async fn load_job(service: &JobService, raw_id: &str) -> Result<JobRow, ServiceError> {
    let job_id = parse_job_id(raw_id)?;
    service.get_job(job_id).await
}

/// Decoded only after the job is loaded, so an unknown id wins over a bad body
fn parse_status_body(body: &[u8]) -> Result<UpdateJobStatusRequest, ServiceError> {
    serde_json::from_slice(body).map_err(|err| ServiceError::Validation {
        field: "status_type",
        message: describe_payload_error(&err.to_string()),
        allowed: Some(JobStatusType::allowed_values()),
    })
}

#[get("")]
async fn list_jobs(
    req: HttpRequest,
    service: Data<JobService>,
    params: Query<ListJobsParams>,
    page: Query<PageParams>,
) -> Result<HttpResponse, ServiceError> {
    let filter = JobFilter::parse(params.status.as_deref(), params.sort.as_deref())?;
    let window = page.window();

    let listing = service.list_jobs(&filter, window).await?;
    let results: Vec<JobSummary> = listing.items.into_iter().map(JobSummary::from).collect();

    Ok(HttpResponse::Ok().json(Paginated::new(&req, window, listing.total, results)))
}

#[post("")]
async fn create_job(
    service: Data<JobService>,
    body: Json<CreateJobRequest>,
) -> Result<HttpResponse, ServiceError> {
    let job = service.create_job(&body.name).await?;
    Ok(HttpResponse::Created().json(JobDetail::from(job)))
}

#[get("/{id}")]
async fn get_job(
    service: Data<JobService>,
    path: Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let job = load_job(&service, &path).await?;
    Ok(HttpResponse::Ok().json(JobDetail::from(job)))
}

#[patch("/{id}")]
async fn update_job_status(
    service: Data<JobService>,
    path: Path<String>,
    body: Bytes,
) -> Result<HttpResponse, ServiceError> {
    let job = load_job(&service, &path).await?;
    let request = parse_status_body(&body)?;
    service.update_job_status(&job, request.status_type).await?;

    let updated = service.get_job(job.id).await?;
    Ok(HttpResponse::Ok().json(JobDetail::from(updated)))
}

#[delete("/{id}")]
async fn delete_job(
    service: Data<JobService>,
    path: Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let job = load_job(&service, &path).await?;
    service.delete_job(&job).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/{id}/statuses")]
async fn list_job_statuses(
    req: HttpRequest,
    service: Data<JobService>,
    path: Path<String>,
    page: Query<PageParams>,
) -> Result<HttpResponse, ServiceError> {
    let job = load_job(&service, &path).await?;
    let window = page.window();

    let listing = service.get_status_history(job.id, window).await?;
    let results: Vec<StatusEntry> = listing.items.into_iter().map(StatusEntry::from).collect();

    Ok(HttpResponse::Ok().json(Paginated::new(&req, window, listing.total, results)))
}

pub fn job_config(config: &mut ServiceConfig) {
    config.service(
        scope("/jobs")
            .service(list_jobs)
            .service(create_job)
            .service(list_job_statuses)
            .service(get_job)
            .service(update_job_status)
            .service(delete_job),
    );
}
