use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use rstest::*;

use crate::core::client::database::repository::MockReportRepository;
use crate::core::client::database::DatabaseError;
use crate::error::job::JobError;
use crate::tests::common::{
    geometry_set, job_key, stored_report, InMemoryLockClient, InMemoryReportRepository, InMemoryTimeSeriesRepository,
    ScriptedOutcome, ScriptedProvider,
};
use crate::tests::config::TestConfigBuilder;
use crate::types::jobs::{JobKey, ProcessingMode, ReportStatus};
use crate::types::params::JobParams;
use crate::types::timeseries::{PointMetadata, TimeSeriesDocument};
use crate::worker::{JobCoordinator, StopReason};

#[rstest]
#[tokio::test]
async fn full_run_without_report_processes_every_index_in_order(job_key: JobKey) {
    let services = TestConfigBuilder::new().build();
    let geometry = geometry_set(4);

    let outcome = JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Full, &geometry).await.unwrap();

    assert_eq!(outcome.attempted_indexes, vec![0, 1, 2, 3]);
    assert_eq!(services.provider.calls(), vec![0, 1, 2, 3]);
    assert_eq!(outcome.stop_reason, StopReason::Completed);
    assert_eq!(outcome.documents_written, 8);

    let stored = services.reports.report(&job_key).unwrap();
    assert_eq!(stored.status, ReportStatus::Success);
    assert_eq!(stored.summary.total_polygons, 4);
    assert_eq!(stored.summary.success, 4);
    assert_eq!(stored.summary.failed, 0);
    assert_eq!(stored.summary.last_processed_index, Some(3));
    assert!(stored.errors.is_empty());
}

#[rstest]
#[tokio::test]
async fn resume_continues_after_checkpoint(job_key: JobKey) {
    let report = stored_report(&job_key, 5, 1, 1, Some(1), &[1]);
    let services = TestConfigBuilder::new().configure_reports(InMemoryReportRepository::with_report(report)).build();

    let outcome =
        JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Resume, &geometry_set(5)).await.unwrap();

    assert_eq!(outcome.attempted_indexes, vec![2, 3, 4]);
    assert_eq!(outcome.report.summary.success, 4);
    assert_eq!(outcome.report.summary.failed, 1);
    assert_eq!(outcome.report.summary.last_processed_index, Some(4));
    assert_eq!(outcome.report.status, ReportStatus::Partial);
}

#[rstest]
#[case(ProcessingMode::Resume)]
#[case(ProcessingMode::RetryFailed)]
#[tokio::test]
async fn modes_needing_a_report_fail_without_one(job_key: JobKey, #[case] mode: ProcessingMode) {
    let services = TestConfigBuilder::new().build();

    let result = JobCoordinator::new(services.config.clone()).run(&job_key, mode, &geometry_set(3)).await;

    assert_matches!(result, Err(JobError::Configuration(_)));
    assert!(services.provider.calls().is_empty());
    assert!(services.reports.report(&job_key).is_none());
    assert!(!services.locks.is_locked(&job_key.lock_key()));
}

#[rstest]
#[tokio::test]
async fn retry_failed_processes_distinct_sorted_errors(job_key: JobKey) {
    let report = stored_report(&job_key, 5, 3, 2, Some(4), &[3, 1, 3]);
    let services = TestConfigBuilder::new().configure_reports(InMemoryReportRepository::with_report(report)).build();

    let outcome = JobCoordinator::new(services.config.clone())
        .run(&job_key, ProcessingMode::RetryFailed, &geometry_set(5))
        .await
        .unwrap();

    assert_eq!(outcome.attempted_indexes, vec![1, 3]);
    assert_eq!(services.provider.calls(), vec![1, 3]);
    assert_eq!(outcome.report.summary.success, 5);
    assert_eq!(outcome.report.summary.failed, 0);
    assert_eq!(outcome.report.status, ReportStatus::Success);
    assert_eq!(outcome.report.resolved_indexes, vec![1, 3]);
    // Errors are never truncated
    assert_eq!(outcome.report.errors.len(), 3);
}

#[rstest]
#[tokio::test]
async fn retry_failure_of_a_resolved_index_reopens_it(job_key: JobKey) {
    let mut report = stored_report(&job_key, 3, 3, 0, Some(2), &[2]);
    report.resolved_indexes = vec![2];
    let services = TestConfigBuilder::new()
        .configure_reports(InMemoryReportRepository::with_report(report))
        .configure_provider(ScriptedProvider::new([(2, ScriptedOutcome::Data)]))
        .build();

    let outcome = JobCoordinator::new(services.config.clone())
        .run(&job_key, ProcessingMode::RetryFailed, &geometry_set(3))
        .await
        .unwrap();

    assert_eq!(outcome.report.summary.success, 2);
    assert_eq!(outcome.report.summary.failed, 1);
    assert!(outcome.report.resolved_indexes.is_empty());
    assert_eq!(outcome.report.errors.len(), 2);
    assert_eq!(outcome.report.status, ReportStatus::Partial);
}

#[rstest]
#[case(3, vec![], ReportStatus::Success, 3, 0)]
#[case(3, vec![1], ReportStatus::Partial, 2, 1)]
#[case(2, vec![0, 1], ReportStatus::Failed, 0, 2)]
#[tokio::test]
async fn final_status_follows_counters(
    job_key: JobKey,
    #[case] polygons: u64,
    #[case] failing: Vec<u64>,
    #[case] status: ReportStatus,
    #[case] success: u64,
    #[case] failed: u64,
) {
    let provider = ScriptedProvider::new(failing.into_iter().map(|i| (i, ScriptedOutcome::Data)));
    let services = TestConfigBuilder::new().configure_provider(provider).build();

    let outcome =
        JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Full, &geometry_set(polygons)).await.unwrap();

    assert_eq!(outcome.report.status, status);
    assert_eq!(outcome.report.summary.success, success);
    assert_eq!(outcome.report.summary.failed, failed);
    assert_eq!(outcome.report.errors.len() as u64, failed);
}

#[rstest]
#[tokio::test]
async fn transport_fault_halts_the_run(job_key: JobKey) {
    let services =
        TestConfigBuilder::new().configure_provider(ScriptedProvider::new([(2, ScriptedOutcome::Transport)])).build();

    let outcome =
        JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Full, &geometry_set(5)).await.unwrap();

    assert_eq!(outcome.attempted_indexes, vec![0, 1, 2]);
    assert_eq!(outcome.stop_reason, StopReason::TransportFault { index: 2 });
    assert_eq!(outcome.report.errors.len(), 1);
    assert_eq!(outcome.report.errors[0].polygon_index, 2);
    assert_eq!(outcome.report.errors[0].geocode, "2");
    assert_eq!(outcome.report.summary.last_processed_index, Some(2));
    assert_eq!(outcome.report.status, ReportStatus::Partial);
}

#[rstest]
#[tokio::test]
async fn data_fault_is_recorded_and_the_run_continues(job_key: JobKey) {
    let services = TestConfigBuilder::new().configure_provider(ScriptedProvider::new([(1, ScriptedOutcome::Data)])).build();

    let outcome =
        JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Full, &geometry_set(4)).await.unwrap();

    assert_eq!(outcome.attempted_indexes, vec![0, 1, 2, 3]);
    assert_eq!(outcome.stop_reason, StopReason::Completed);
    assert_eq!(outcome.report.errors.len(), 1);
    assert!(outcome.report.errors[0].error.contains("Invalid response data"));
}

#[rstest]
#[tokio::test]
async fn five_consecutive_empty_series_stop_the_run(job_key: JobKey) {
    let provider = ScriptedProvider::new((0..5).map(|i| (i, ScriptedOutcome::Empty)));
    let services = TestConfigBuilder::new().configure_provider(provider).build();

    let outcome =
        JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Full, &geometry_set(8)).await.unwrap();

    assert_eq!(outcome.attempted_indexes, vec![0, 1, 2, 3, 4]);
    assert_eq!(outcome.stop_reason, StopReason::EmptySeries);
    assert!(outcome.report.errors.is_empty());
    assert_eq!(outcome.report.summary.failed, 0);
    assert_eq!(outcome.report.summary.last_processed_index, None);
    assert_eq!(services.documents.batch_count(), 0);
}

#[rstest]
#[tokio::test]
async fn resume_after_empty_series_stop_revisits_the_streak(job_key: JobKey) {
    let provider = ScriptedProvider::new((2..7).map(|i| (i, ScriptedOutcome::Empty)));
    let services = TestConfigBuilder::new().configure_provider(provider).build();

    let outcome =
        JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Full, &geometry_set(8)).await.unwrap();

    assert_eq!(outcome.stop_reason, StopReason::EmptySeries);
    assert_eq!(outcome.attempted_indexes, vec![0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(outcome.report.summary.last_processed_index, Some(1));

    // The data has been published since, every polygon now has a series
    let stored = services.reports.report(&job_key).unwrap();
    let services = TestConfigBuilder::new().configure_reports(InMemoryReportRepository::with_report(stored)).build();

    let outcome =
        JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Resume, &geometry_set(8)).await.unwrap();

    assert_eq!(outcome.attempted_indexes, vec![2, 3, 4, 5, 6, 7]);
    assert_eq!(outcome.stop_reason, StopReason::Completed);
    assert_eq!(outcome.report.summary.success, 8);
    assert_eq!(outcome.report.summary.last_processed_index, Some(7));
    assert_eq!(outcome.report.status, ReportStatus::Success);
}

#[rstest]
#[tokio::test]
async fn a_series_resets_the_empty_streak(job_key: JobKey) {
    let provider = ScriptedProvider::new([0, 1, 2, 3, 5, 6, 7, 8].into_iter().map(|i| (i, ScriptedOutcome::Empty)));
    let services = TestConfigBuilder::new().configure_provider(provider).build();

    let outcome =
        JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Full, &geometry_set(9)).await.unwrap();

    assert_eq!(outcome.attempted_indexes.len(), 9);
    assert_eq!(outcome.stop_reason, StopReason::Completed);
    assert_eq!(outcome.report.summary.success, 1);
}

#[rstest]
#[tokio::test]
async fn fetch_timeout_is_a_transport_fault(job_key: JobKey) {
    let params = JobParams { fetch_timeout: Duration::from_millis(50), ..JobParams::default() };
    let services = TestConfigBuilder::new()
        .configure_params(params)
        .configure_provider(ScriptedProvider::new([(1, ScriptedOutcome::Delay(Duration::from_secs(5)))]))
        .build();

    let outcome =
        JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Full, &geometry_set(3)).await.unwrap();

    assert_eq!(outcome.stop_reason, StopReason::TransportFault { index: 1 });
    assert_eq!(outcome.attempted_indexes, vec![0, 1]);
    assert!(outcome.report.errors[0].error.contains("timed out"));
}

#[rstest]
#[tokio::test]
async fn reshape_error_is_recorded_and_the_run_continues(job_key: JobKey) {
    let services = TestConfigBuilder::new()
        .configure_provider(ScriptedProvider::new([(0, ScriptedOutcome::UnknownAttribute)]))
        .build();

    let outcome =
        JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Full, &geometry_set(2)).await.unwrap();

    assert_eq!(outcome.attempted_indexes, vec![0, 1]);
    assert_eq!(outcome.report.errors.len(), 1);
    assert!(outcome.report.errors[0].error.contains("SCL"));
    assert_eq!(outcome.report.status, ReportStatus::Partial);
}

#[rstest]
#[tokio::test]
async fn write_failure_is_recorded_and_the_run_continues(job_key: JobKey) {
    let services =
        TestConfigBuilder::new().configure_documents(InMemoryTimeSeriesRepository::failing_for(&["1"])).build();

    let outcome =
        JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Full, &geometry_set(3)).await.unwrap();

    assert_eq!(outcome.attempted_indexes, vec![0, 1, 2]);
    assert_eq!(outcome.report.summary.failed, 1);
    assert_eq!(outcome.report.errors[0].polygon_index, 1);
    assert!(outcome.report.errors[0].error.starts_with("Failed to write documents"));
}

#[rstest]
#[tokio::test]
async fn documents_extend_seeded_pixels(job_key: JobKey) {
    let documents = InMemoryTimeSeriesRepository::default();
    let pixel = ScriptedProvider::pixels(0)[0];
    documents.seed(TimeSeriesDocument {
        geocode: "0".to_string(),
        metadata: PointMetadata::point(pixel),
        timeseries: vec![],
    });
    let services = TestConfigBuilder::new().configure_documents(documents).build();

    JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Full, &geometry_set(1)).await.unwrap();
    JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Full, &geometry_set(1)).await.unwrap();

    // Entries are appended on every run, never deduplicated
    assert_eq!(services.documents.stored(pixel).unwrap().timeseries.len(), 4);
    assert!(services.documents.stored(ScriptedProvider::pixels(0)[1]).is_none());
}

#[rstest]
#[tokio::test]
async fn held_lock_rejects_the_run(job_key: JobKey) {
    let services =
        TestConfigBuilder::new().configure_locks(InMemoryLockClient::held_by(&job_key.lock_key(), "other-worker")).build();

    let result = JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Full, &geometry_set(2)).await;

    assert_matches!(result, Err(JobError::AlreadyRunning { owner, .. }) if owner == "other-worker");
    assert!(services.provider.calls().is_empty());
    assert!(services.reports.report(&job_key).is_none());
}

#[rstest]
#[tokio::test]
async fn lock_is_released_after_the_run(job_key: JobKey) {
    let services = TestConfigBuilder::new().build();
    let coordinator = JobCoordinator::new(services.config.clone());

    coordinator.run(&job_key, ProcessingMode::Full, &geometry_set(2)).await.unwrap();
    assert!(!services.locks.is_locked(&job_key.lock_key()));

    // A second run of the same key can take the lock again
    coordinator.run(&job_key, ProcessingMode::Resume, &geometry_set(2)).await.unwrap();
    assert!(!services.locks.is_locked(&job_key.lock_key()));
}

#[rstest]
#[tokio::test]
async fn full_run_keeps_an_existing_report(job_key: JobKey) {
    let report = stored_report(&job_key, 3, 2, 1, Some(2), &[1]);
    let created_at = report.created_at;
    let services = TestConfigBuilder::new().configure_reports(InMemoryReportRepository::with_report(report)).build();

    let outcome =
        JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Full, &geometry_set(3)).await.unwrap();

    assert_eq!(outcome.attempted_indexes, vec![0, 1, 2]);
    assert_eq!(outcome.report.created_at, created_at);
    assert_eq!(outcome.report.errors.len(), 1);
    assert_eq!(outcome.report.summary.success, 3);
    assert_eq!(outcome.report.summary.failed, 0);
    assert_eq!(outcome.report.resolved_indexes, vec![1]);
    assert_eq!(outcome.report.status, ReportStatus::Success);
}

#[rstest]
#[tokio::test]
async fn resume_after_halted_full_rerun_continues_past_the_fault(job_key: JobKey) {
    let report = stored_report(&job_key, 5, 5, 0, Some(4), &[]);
    let services = TestConfigBuilder::new()
        .configure_reports(InMemoryReportRepository::with_report(report))
        .configure_provider(ScriptedProvider::new([(1, ScriptedOutcome::Transport)]))
        .build();

    let outcome =
        JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Full, &geometry_set(5)).await.unwrap();

    assert_eq!(outcome.attempted_indexes, vec![0, 1]);
    assert_eq!(outcome.stop_reason, StopReason::TransportFault { index: 1 });
    assert_eq!(outcome.report.summary.last_processed_index, Some(1));
    assert_eq!((outcome.report.summary.success, outcome.report.summary.failed), (1, 1));
    assert_eq!(services.reports.report(&job_key).unwrap().summary.last_processed_index, Some(1));

    let stored = services.reports.report(&job_key).unwrap();
    let services = TestConfigBuilder::new().configure_reports(InMemoryReportRepository::with_report(stored)).build();

    let outcome =
        JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Resume, &geometry_set(5)).await.unwrap();

    assert_eq!(outcome.attempted_indexes, vec![2, 3, 4]);
    assert_eq!(outcome.report.summary.success, 4);
    assert_eq!(outcome.report.summary.failed, 1);
    assert_eq!(outcome.report.summary.last_processed_index, Some(4));
    assert_eq!(outcome.report.status, ReportStatus::Partial);
}

#[rstest]
#[tokio::test]
async fn report_store_failure_is_fatal(job_key: JobKey) {
    let mut reports = MockReportRepository::new();
    reports.expect_get().returning(|_| Ok(None));
    reports.expect_create_if_absent().times(1).returning(|_, _| Ok(true));
    reports
        .expect_apply_update()
        .times(1)
        .returning(|_, _| Err(DatabaseError::UpdateFailed("connection closed".to_string())));
    let services = TestConfigBuilder::new().configure_report_repository(Arc::new(reports)).build();

    let result = JobCoordinator::new(services.config.clone()).run(&job_key, ProcessingMode::Full, &geometry_set(3)).await;

    assert_matches!(result, Err(JobError::Persistence(_)));
    assert_eq!(services.provider.calls(), vec![0]);
    assert!(!services.locks.is_locked(&job_key.lock_key()));
}
