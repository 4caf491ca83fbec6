pub mod geometry;
pub mod job;
pub mod payload;

use thiserror::Error;

use crate::core::client::database::DatabaseError;
use crate::core::client::lock::error::LockError;
pub use geometry::GeometryError;
pub use job::JobError;
pub use payload::PayloadError;

/// Result type for ingestor operations
pub type IngestorResult<T> = Result<T, IngestorError>;

#[derive(Error, Debug)]
pub enum IngestorError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Lock error: {0}")]
    LockError(#[from] LockError),

    #[error("Job error: {0}")]
    JobError(#[from] JobError),

    #[error("Payload error: {0}")]
    PayloadError(#[from] PayloadError),

    #[error("Geometry error: {0}")]
    GeometryError(#[from] GeometryError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Run Command error
    #[error("Run Command Error: {0}")]
    RunCommandError(String),
}
