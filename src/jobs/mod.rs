pub mod models;
pub mod service;

// Re-export commonly used types
pub use models::{JobFilter, JobSort, JobStatusType, Listing, PageWindow};
pub use service::{JobService, ServiceError};
