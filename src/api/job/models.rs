use std::borrow::Cow;

use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::jobs::JobStatusType;
use crate::jobs::service::MAX_NAME_LENGTH;

/// Body of `POST /jobs`
#[derive(Deserialize, Debug, Validate)]
pub struct CreateJobRequest {
    #[validate(custom(function = "validate_job_name"))]
    pub name: String,
}

/// Body of `PATCH /jobs/{id}`
#[derive(Deserialize, Debug)]
pub struct UpdateJobStatusRequest {
    pub status_type: JobStatusType,
}

/// Query parameters of `GET /jobs`; validated by `JobFilter::parse`
#[derive(Deserialize, Debug, Default)]
pub struct ListJobsParams {
    pub status: Option<String>,
    pub sort: Option<String>,
}

fn validate_job_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    let message = if trimmed.is_empty() {
        "Job name cannot be empty or whitespace only.".to_string()
    } else if trimmed.chars().count() > MAX_NAME_LENGTH {
        format!("Job name must be at most {} characters.", MAX_NAME_LENGTH)
    } else {
        return Ok(());
    };

    let mut err = ValidationError::new("name");
    err.message = Some(Cow::Owned(message));
    Err(err)
}
