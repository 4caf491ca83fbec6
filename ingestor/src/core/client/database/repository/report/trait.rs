use async_trait::async_trait;

use crate::core::client::database::error::DatabaseError;
use crate::types::jobs::{JobKey, JobReport, ReportUpdates};

/// Persistence of job reports, one per [`JobKey`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn get(&self, key: &JobKey) -> Result<Option<JobReport>, DatabaseError>;

    /// Writes `initial` unless a report for `key` exists.
    /// Returns true if this call created it.
    async fn create_if_absent(&self, key: &JobKey, initial: JobReport) -> Result<bool, DatabaseError>;

    /// Applies `updates` to the stored report in a single atomic write.
    async fn apply_update(&self, key: &JobKey, updates: &ReportUpdates) -> Result<(), DatabaseError>;
}
