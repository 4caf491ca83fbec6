use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use super::key::JobKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportStatus {
    /// Run in progress, or finished with both successes and failures
    Partial,
    Success,
    Failed,
}

impl ReportStatus {
    /// Final status derived from the run counters.
    ///
    /// A run without failures is a success even if nothing was processed.
    pub fn from_counts(success: u64, failed: u64) -> Self {
        match (success, failed) {
            (_, 0) => ReportStatus::Success,
            (0, _) => ReportStatus::Failed,
            _ => ReportStatus::Partial,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_polygons: u64,
    pub success: u64,
    pub failed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_processed_index: Option<u64>,
}

/// One recorded per-polygon failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolygonError {
    pub polygon_index: u64,
    pub geocode: String,
    pub error: String,
}

/// Persistent record of one job execution.
///
/// `errors` only ever grows. `resolved_indexes` tracks error indexes whose most
/// recent outcome was a success, which lets later retries adjust the counters
/// without double counting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    pub job: String,
    pub coverage: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ReportStatus,
    pub summary: ReportSummary,
    #[serde(default)]
    pub errors: Vec<PolygonError>,
    #[serde(default)]
    pub resolved_indexes: Vec<u64>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl JobReport {
    /// Initial report written on the first `full` execution of a key.
    pub fn new(key: &JobKey, total_polygons: u64) -> Self {
        let now = Utc::now().round_subsecs(0);
        Self {
            job: key.job.clone(),
            coverage: key.coverage.clone(),
            start_date: key.start_date,
            end_date: key.end_date,
            status: ReportStatus::Partial,
            summary: ReportSummary { total_polygons, ..Default::default() },
            errors: Vec::new(),
            resolved_indexes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> JobKey {
        JobKey::new(&self.job, &self.coverage, self.start_date, self.end_date)
    }

    /// Distinct recorded error indexes in ascending order.
    pub fn error_indexes(&self) -> BTreeSet<u64> {
        self.errors.iter().map(|e| e.polygon_index).collect()
    }

    pub fn has_error_for(&self, index: u64) -> bool {
        self.errors.iter().any(|e| e.polygon_index == index)
    }

    pub fn is_resolved(&self, index: u64) -> bool {
        self.resolved_indexes.contains(&index)
    }
}
