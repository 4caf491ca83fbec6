
use chrono::NaiveDate;
use ingestor_provider_client_interface::Geometry;
use rstest::*;

use crate::types::geometry::GeometrySet;
use crate::types::jobs::{JobKey, JobReport, PolygonError};

pub use fakes::{
    InMemoryLockClient, InMemoryReportRepository, InMemoryTimeSeriesRepository, ScriptedOutcome, ScriptedProvider,
};

pub const TEST_COVERAGE: &str = "S2-16D-2";

#[fixture]
pub fn job_key() -> JobKey {
    JobKey::wtss(TEST_COVERAGE, date(2024, 1, 1), date(2024, 1, 31))
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Square polygon whose first vertex is `[index, 0]`, so fakes can tell which
/// polygon a request is for.
pub fn polygon(index: u64) -> Geometry {
    let x = index as f64;
    Geometry::Polygon {
        coordinates: vec![vec![vec![x, 0.0], vec![x + 1.0, 0.0], vec![x + 1.0, 1.0], vec![x, 1.0], vec![x, 0.0]]],
    }
}

pub fn polygon_index(geometry: &Geometry) -> u64 {
    let first = match geometry {
        Geometry::Polygon { coordinates } => coordinates.first().and_then(|ring| ring.first()),
        Geometry::MultiPolygon { coordinates } => {
            coordinates.first().and_then(|polygon| polygon.first()).and_then(|ring| ring.first())
        }
    };
    first.and_then(|position| position.first()).map(|x| *x as u64).unwrap_or_default()
}

/// Geometry set of `count` polygons with geocodes `"0"`, `"1"`, ...
pub fn geometry_set(count: u64) -> GeometrySet {
    GeometrySet::from_pairs((0..count).map(|i| (i.to_string(), polygon(i))))
}

/// Stored report for `key` with the given summary and error indexes.
pub fn stored_report(
    key: &JobKey,
    total: u64,
    success: u64,
    failed: u64,
    last_processed_index: Option<u64>,
    error_indexes: &[u64],
) -> JobReport {
    let mut report = JobReport::new(key, total);
    report.summary.success = success;
    report.summary.failed = failed;
    report.summary.last_processed_index = last_processed_index;
    report.errors = error_indexes
        .iter()
        .map(|i| PolygonError { polygon_index: *i, geocode: i.to_string(), error: "previous failure".to_string() })
        .collect();
    report
}
