pub mod dto;
pub mod handlers;
pub mod models;

pub use handlers::job_config;
