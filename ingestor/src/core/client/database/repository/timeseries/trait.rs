use async_trait::async_trait;

use crate::core::client::database::error::DatabaseError;
use crate::types::timeseries::{TimeSeriesDocument, UpsertResult};

/// Extend-only sink for per-pixel time series.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TimeSeriesRepository: Send + Sync {
    /// Appends each document's records to the stored document with the same
    /// coordinate. Coordinates with no stored document are skipped.
    async fn upsert_batch(&self, documents: &[TimeSeriesDocument]) -> Result<UpsertResult, DatabaseError>;
}
