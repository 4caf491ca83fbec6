use chrono::{DateTime, Utc};

use super::report::{JobReport, PolygonError, ReportStatus};
use crate::error::job::JobError;

/// Change to the resolved set carried by a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The index succeeded after having failed before
    Resolve(u64),
    /// A resolved index failed again
    Reopen(u64),
}

/// Change to `last_processed_index` carried by a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// Overwrite with the index, used by sweeps that walk upwards
    Set(u64),
    /// Keep the larger of the stored value and the index
    Raise(u64),
    /// Forget the stored checkpoint
    Clear,
}

/// Changes to apply to a stored report in one atomic write.
///
/// Counters are absolute values and `errors` are appended. `updated_at` is
/// always refreshed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportUpdates {
    pub status: Option<ReportStatus>,
    pub total_polygons: Option<u64>,
    pub success: Option<u64>,
    pub failed: Option<u64>,
    pub checkpoint: Option<Checkpoint>,
    pub errors: Vec<PolygonError>,
    pub resolution: Option<Resolution>,
}

impl ReportUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_status(mut self, status: ReportStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn update_counts(mut self, total_polygons: u64, success: u64, failed: u64) -> Self {
        self.total_polygons = Some(total_polygons);
        self.success = Some(success);
        self.failed = Some(failed);
        self
    }

    pub fn checkpoint(mut self, index: u64) -> Self {
        self.checkpoint = Some(Checkpoint::Set(index));
        self
    }

    pub fn raise_checkpoint(mut self, index: u64) -> Self {
        self.checkpoint = Some(Checkpoint::Raise(index));
        self
    }

    pub fn clear_checkpoint(mut self) -> Self {
        self.checkpoint = Some(Checkpoint::Clear);
        self
    }

    pub fn push_error(mut self, error: PolygonError) -> Self {
        self.errors.push(error);
        self
    }

    pub fn resolve(mut self, resolution: Option<Resolution>) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.total_polygons.is_none()
            && self.success.is_none()
            && self.failed.is_none()
            && self.checkpoint.is_none()
            && self.errors.is_empty()
            && self.resolution.is_none()
    }

    pub fn build(self) -> Result<ReportUpdates, JobError> {
        if self.is_empty() {
            Err(JobError::Other("No field to be updated, likely a false call".to_string()))
        } else {
            Ok(self)
        }
    }

    /// Applies the same changes the store applies, so an in-memory copy stays
    /// equal to the persisted one.
    pub fn apply_to(&self, report: &mut JobReport, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            report.status = status;
        }
        if let Some(total) = self.total_polygons {
            report.summary.total_polygons = total;
        }
        if let Some(success) = self.success {
            report.summary.success = success;
        }
        if let Some(failed) = self.failed {
            report.summary.failed = failed;
        }
        match self.checkpoint {
            Some(Checkpoint::Set(index)) => report.summary.last_processed_index = Some(index),
            Some(Checkpoint::Raise(index)) => {
                report.summary.last_processed_index = Some(report.summary.last_processed_index.map_or(index, |i| i.max(index)))
            }
            Some(Checkpoint::Clear) => report.summary.last_processed_index = None,
            None => {}
        }
        report.errors.extend(self.errors.iter().cloned());
        match self.resolution {
            Some(Resolution::Resolve(index)) if !report.resolved_indexes.contains(&index) => {
                report.resolved_indexes.push(index)
            }
            Some(Resolution::Reopen(index)) => report.resolved_indexes.retain(|i| *i != index),
            _ => {}
        }
        report.updated_at = now;
    }
}
