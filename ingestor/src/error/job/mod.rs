pub mod reshape;

use thiserror::Error;

use crate::core::client::database::DatabaseError;
use crate::core::client::lock::error::LockError;
use ingestor_provider_client_interface::ProviderError;
pub use reshape::ReshapeError;

pub type JobResult<T> = Result<T, JobError>;

/// Errors surfaced to the caller of a job run.
///
/// Per-polygon faults never show up here, they are recorded in the report.
#[derive(Error, Debug)]
pub enum JobError {
    /// Raised before any polygon is processed
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Report store error: {0}")]
    Persistence(#[from] DatabaseError),

    #[error("Lock store error: {0}")]
    LockStore(#[from] LockError),

    #[error("Job {key} is already running (held by {owner})")]
    AlreadyRunning { key: String, owner: String },

    #[error("Other error: {0}")]
    Other(String),
}

/// Failure of a single polygon.
#[derive(Error, Debug)]
pub enum PolygonFault {
    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Reshape(#[from] ReshapeError),

    #[error("Failed to write documents: {0}")]
    Write(#[source] DatabaseError),
}

impl PolygonFault {
    /// Transport faults may be systemic and halt the run.
    pub fn halts_run(&self) -> bool {
        matches!(self, PolygonFault::Provider(e) if e.is_transport())
    }
}
