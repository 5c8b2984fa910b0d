use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::api::validation::ErrorResponse;
use crate::jobs::service::{DUPLICATE_NAME_MESSAGE, ServiceError};

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation { .. } | ServiceError::Conflict(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Validation { field, message, allowed } => {
                warn!("Validation error on {}: {}", field, message);
                HttpResponse::BadRequest().json(ErrorResponse::field(
                    field,
                    vec![message.clone()],
                    allowed.as_deref(),
                ))
            }
            ServiceError::Conflict(name) => {
                warn!("Duplicate job name: {}", name);
                HttpResponse::BadRequest().json(ErrorResponse::field(
                    "name",
                    vec![DUPLICATE_NAME_MESSAGE.to_string()],
                    None,
                ))
            }
            ServiceError::NotFound(id) => {
                warn!("Job not found: {}", id);
                HttpResponse::NotFound().json(ErrorResponse::message(
                    "Not found",
                    format!("Job with id {} not found", id),
                ))
            }
            ServiceError::Storage(e) => {
                error!("Storage error: {}", e);
                HttpResponse::InternalServerError().json(ErrorResponse::message(
                    "Failed to process request",
                    "Database error occurred",
                ))
            }
        }
    }
}
