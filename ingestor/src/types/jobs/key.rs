use std::fmt;

use chrono::NaiveDate;
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};

use crate::types::WTSS_JOB_NAME;

/// Identity of one job execution and natural key of its report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobKey {
    pub job: String,
    pub coverage: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl JobKey {
    pub fn new(job: impl Into<String>, coverage: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self { job: job.into(), coverage: coverage.into(), start_date, end_date }
    }

    pub fn wtss(coverage: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self::new(WTSS_JOB_NAME, coverage, start_date, end_date)
    }

    /// Filter matching the persisted report of this key.
    pub fn filter(&self) -> Document {
        doc! {
            "job": &self.job,
            "coverage": &self.coverage,
            "start_date": self.start_date.to_string(),
            "end_date": self.end_date.to_string(),
        }
    }

    /// Key of the single-flight lock guarding executions of this job.
    pub fn lock_key(&self) -> String {
        format!("{}:{}:{}:{}", self.job, self.coverage, self.start_date, self.end_date)
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}..{}", self.job, self.coverage, self.start_date, self.end_date)
    }
}
