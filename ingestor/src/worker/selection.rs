use tracing::warn;

use crate::error::job::JobError;
use crate::types::jobs::{JobReport, ProcessingMode};

/// Indexes a run processes, in processing order.
///
/// `total` is the size of the current geometry set. Recorded error indexes
/// outside of it are dropped.
pub fn select_indexes(mode: ProcessingMode, report: Option<&JobReport>, total: u64) -> Result<Vec<u64>, JobError> {
    match (mode, report) {
        (ProcessingMode::Full, _) => Ok((0..total).collect()),
        (ProcessingMode::Resume, Some(report)) => {
            let start = report.summary.last_processed_index.map_or(0, |i| i.saturating_add(1));
            Ok((start..total).collect())
        }
        (ProcessingMode::RetryFailed, Some(report)) => {
            let (in_range, out_of_range): (Vec<u64>, Vec<u64>) =
                report.error_indexes().into_iter().partition(|i| *i < total);
            if !out_of_range.is_empty() {
                warn!(?out_of_range, total, "Skipping recorded errors outside of the geometry set");
            }
            Ok(in_range)
        }
        (mode, None) => Err(JobError::Configuration(format!("Mode `{mode}` requires an existing report"))),
    }
}
