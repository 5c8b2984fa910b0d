pub mod error;
pub mod health;
pub mod job;
pub mod pagination;
pub mod validation;

use actix_web::web::ServiceConfig;

/// Register every HTTP route of the service
pub fn routes(config: &mut ServiceConfig) {
    config
        .configure(health::health_config)
        .configure(job::job_config);
}
