use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;
use tracing::error;

use crate::jobs::JobService;

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Liveness check endpoint
///
/// Simple check that the process is alive. Does not check dependencies.
#[get("/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        database: None,
        error: None,
    })
}

/// Readiness check endpoint
///
/// Checks if service is ready to accept traffic (includes database check).
/// Returns 503 if storage is unavailable; the process recovers when it returns.
#[get("/ready")]
async fn readiness_check(service: web::Data<JobService>) -> impl Responder {
    match service.check_storage().await {
        Ok(()) => HttpResponse::Ok().json(HealthResponse {
            status: "ready".to_string(),
            database: Some("connected".to_string()),
            error: None,
        }),
        Err(e) => {
            error!("Readiness check failed: database unavailable: {:?}", e);
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "not_ready".to_string(),
                database: Some("disconnected".to_string()),
                error: Some(format!("Database unavailable: {}", e)),
            })
        }
    }
}

pub fn health_config(config: &mut web::ServiceConfig) {
    config.service(health_check).service(readiness_check);
}
