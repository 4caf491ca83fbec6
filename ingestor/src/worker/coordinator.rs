use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use ingestor_provider_client_interface::{ProviderError, TimeSeriesRequest};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::core::client::lock::LockResult;
use crate::core::config::Config;
use crate::error::job::{JobError, JobResult, PolygonFault};
use crate::types::geometry::{GeometrySet, PolygonUnit};
use crate::types::jobs::{JobKey, JobReport, PolygonError, ProcessingMode, ReportStatus, ReportUpdates, Resolution};
use crate::types::WTSS_ATTRIBUTES;
use crate::worker::reshaper::reshape;
use crate::worker::selection::select_indexes;

/// Why the polygon loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every selected index was processed
    Completed,
    /// Too many consecutive polygons returned no observations
    EmptySeries,
    /// A transport fault at `index` halted the run
    TransportFault { index: u64 },
}

/// Result of one job run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: JobReport,
    pub attempted_indexes: Vec<u64>,
    pub documents_written: u64,
    pub stop_reason: StopReason,
}

enum PolygonOutcome {
    Empty,
    Written { documents: u64 },
}

/// Success and failure counters of the run, bounded by the polygon count.
#[derive(Debug, Clone, Copy)]
struct Tally {
    total: u64,
    success: u64,
    failed: u64,
}

impl Tally {
    fn has_room(&self) -> bool {
        self.success + self.failed < self.total
    }

    fn add_success(&mut self) {
        if self.has_room() {
            self.success += 1;
        }
    }

    fn add_failure(&mut self) {
        if self.has_room() {
            self.failed += 1;
        }
    }

    fn move_to_success(&mut self) {
        if self.failed > 0 {
            self.failed -= 1;
            self.success += 1;
        } else {
            self.add_success();
        }
    }

    fn move_to_failed(&mut self) {
        if self.success > 0 {
            self.success -= 1;
            self.failed += 1;
        } else {
            self.add_failure();
        }
    }
}

/// In-memory copy of the report, the only writer of it during a run.
struct RunState {
    key: JobKey,
    mode: ProcessingMode,
    report: JobReport,
    tally: Tally,
}

impl RunState {
    fn new(key: JobKey, mode: ProcessingMode, report: JobReport, total: u64) -> Self {
        // A full sweep recounts from scratch, the other modes continue the stored summary.
        let (success, failed) = match mode {
            ProcessingMode::Full => (0, 0),
            _ => (report.summary.success, report.summary.failed),
        };
        let mut tally = Tally { total, success: 0, failed: 0 };
        tally.success = success.min(total);
        tally.failed = failed.min(total - tally.success);
        Self { key, mode, report, tally }
    }

    fn record_success(&mut self, index: u64) -> Option<Resolution> {
        let resolved = self.report.is_resolved(index);
        match self.mode {
            ProcessingMode::RetryFailed if !resolved => {
                self.tally.move_to_success();
                Some(Resolution::Resolve(index))
            }
            ProcessingMode::RetryFailed => None,
            _ => {
                self.tally.add_success();
                (self.report.has_error_for(index) && !resolved).then_some(Resolution::Resolve(index))
            }
        }
    }

    fn record_failure(&mut self, index: u64) -> Option<Resolution> {
        let resolved = self.report.is_resolved(index);
        match self.mode {
            ProcessingMode::RetryFailed if resolved => {
                self.tally.move_to_failed();
                Some(Resolution::Reopen(index))
            }
            // Still unresolved, its failure is already counted
            ProcessingMode::RetryFailed => None,
            _ => {
                self.tally.add_failure();
                resolved.then_some(Resolution::Reopen(index))
            }
        }
    }

    fn counts(&self) -> ReportUpdates {
        ReportUpdates::new().update_counts(self.tally.total, self.tally.success, self.tally.failed)
    }

    /// Counters plus the checkpoint at `index`. Full and resume sweeps walk
    /// upwards and overwrite it, a retry only raises it.
    fn checkpoint_at(&self, index: u64) -> ReportUpdates {
        match self.mode {
            ProcessingMode::RetryFailed => self.counts().raise_checkpoint(index),
            _ => self.counts().checkpoint(index),
        }
    }
}

/// Runs one job: selects polygon indexes, fetches and reshapes each polygon,
/// extends the stored documents and keeps the job report current.
pub struct JobCoordinator {
    config: Arc<Config>,
}

impl JobCoordinator {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Runs `key` over `geometry` while holding the single-flight lock of `key`.
    ///
    /// # Errors
    /// Configuration errors, a held lock and report or lock store failures.
    /// Per-polygon failures are recorded in the report instead.
    #[instrument(skip_all, fields(job = %key, mode = %mode))]
    pub async fn run(&self, key: &JobKey, mode: ProcessingMode, geometry: &GeometrySet) -> JobResult<RunOutcome> {
        let lock_key = key.lock_key();
        let owner = Uuid::new_v4().to_string();
        let lock_client = self.config.lock_client();

        match lock_client.acquire_lock(&lock_key, &owner, self.config.params().lock_ttl_secs).await? {
            LockResult::Acquired => debug!(lock_key = %lock_key, owner = %owner, "Job lock acquired"),
            LockResult::AlreadyHeld(current) => {
                return Err(JobError::AlreadyRunning { key: lock_key, owner: current });
            }
            other => return Err(JobError::Other(format!("Unexpected lock result {other:?}"))),
        }

        let result = self.run_locked(key, mode, geometry).await;

        // The lock expires on its own, a failed release only delays the next run.
        if let Err(e) = lock_client.release_lock(&lock_key, &owner).await {
            warn!(lock_key = %lock_key, error = %e, "Failed to release job lock");
        }
        result
    }

    async fn run_locked(&self, key: &JobKey, mode: ProcessingMode, geometry: &GeometrySet) -> JobResult<RunOutcome> {
        let started = Instant::now();
        let reports = self.config.report_repository();
        let total = geometry.len();

        let existing = reports.get(key).await?;
        let indexes = select_indexes(mode, existing.as_ref(), total)?;
        let report = match existing {
            Some(report) => report,
            None => {
                let initial = JobReport::new(key, total);
                if reports.create_if_absent(key, initial.clone()).await? {
                    info!(total_polygons = total, "Created job report");
                    initial
                } else {
                    reports
                        .get(key)
                        .await?
                        .ok_or_else(|| JobError::Other(format!("Report for {key} vanished after creation")))?
                }
            }
        };
        info!(total_polygons = total, selected = indexes.len(), "Starting job run");

        let mut state = RunState::new(key.clone(), mode, report, total);
        if mode == ProcessingMode::Full && state.report.summary.last_processed_index.is_some() {
            // A new sweep forgets where the previous one stopped.
            let updates = state.counts().clear_checkpoint();
            self.checkpoint(&mut state, updates).await?;
        }
        let mut attempted_indexes = Vec::with_capacity(indexes.len());
        let mut documents_written = 0u64;
        let mut empty_streak = 0u32;
        let mut stop_reason = StopReason::Completed;
        let empty_series_limit = self.config.params().empty_series_limit;

        for index in indexes {
            let Some(unit) = geometry.get(index) else { continue };
            attempted_indexes.push(index);
            let polygon_started = Instant::now();

            match self.process_polygon(key, unit).await {
                Ok(PolygonOutcome::Written { documents }) => {
                    empty_streak = 0;
                    documents_written += documents;
                    let resolution = state.record_success(index);
                    let updates = state.checkpoint_at(index).resolve(resolution);
                    self.checkpoint(&mut state, updates).await?;
                    info!(
                        index,
                        geocode = %unit.geocode,
                        documents,
                        elapsed_ms = polygon_started.elapsed().as_millis() as u64,
                        "Polygon processed"
                    );
                }
                // Empty polygons leave the checkpoint where it is.
                Ok(PolygonOutcome::Empty) => {
                    empty_streak += 1;
                    warn!(index, geocode = %unit.geocode, empty_streak, "Polygon returned an empty series");
                    if empty_streak >= empty_series_limit {
                        warn!(empty_streak, "Too many consecutive empty series, stopping early");
                        stop_reason = StopReason::EmptySeries;
                        break;
                    }
                }
                Err(fault) => {
                    empty_streak = 0;
                    let resolution = state.record_failure(index);
                    let entry =
                        PolygonError { polygon_index: index, geocode: unit.geocode.clone(), error: fault.to_string() };
                    let updates = state.checkpoint_at(index).push_error(entry).resolve(resolution);
                    self.checkpoint(&mut state, updates).await?;
                    warn!(
                        index,
                        geocode = %unit.geocode,
                        error = %fault,
                        elapsed_ms = polygon_started.elapsed().as_millis() as u64,
                        "Polygon failed"
                    );
                    if fault.halts_run() {
                        warn!(index, "Transport fault, halting run");
                        stop_reason = StopReason::TransportFault { index };
                        break;
                    }
                }
            }
        }

        let status = ReportStatus::from_counts(state.tally.success, state.tally.failed);
        let updates = state.counts().update_status(status);
        self.checkpoint(&mut state, updates).await?;
        info!(
            status = %status,
            success = state.tally.success,
            failed = state.tally.failed,
            documents_written,
            elapsed_secs = started.elapsed().as_secs(),
            stop_reason = ?stop_reason,
            "Job run finished"
        );

        Ok(RunOutcome { report: state.report, attempted_indexes, documents_written, stop_reason })
    }

    async fn process_polygon(&self, key: &JobKey, unit: &PolygonUnit) -> Result<PolygonOutcome, PolygonFault> {
        let params = self.config.params();
        let request = TimeSeriesRequest {
            coverage: key.coverage.clone(),
            attributes: WTSS_ATTRIBUTES.iter().map(|a| a.to_string()).collect(),
            geometry: unit.geometry.clone(),
            start_date: key.start_date,
            end_date: key.end_date,
        };

        let table = tokio::time::timeout(params.fetch_timeout, self.config.provider().fetch(&request))
            .await
            .map_err(|_| ProviderError::Timeout(params.fetch_timeout))??;
        if table.is_empty() {
            return Ok(PolygonOutcome::Empty);
        }

        let documents = reshape(&unit.geocode, &table)?;
        let result =
            self.config.timeseries_repository().upsert_batch(&documents).await.map_err(PolygonFault::Write)?;
        debug!(index = unit.index, matched = result.matched, modified = result.modified, "Documents extended");
        Ok(PolygonOutcome::Written { documents: documents.len() as u64 })
    }

    /// Persists `updates` and mirrors them in the in-memory report.
    async fn checkpoint(&self, state: &mut RunState, updates: ReportUpdates) -> JobResult<()> {
        let updates = updates.build()?;
        self.config.report_repository().apply_update(&state.key, &updates).await?;
        updates.apply_to(&mut state.report, Utc::now());
        debug!(
            last_processed_index = ?state.report.summary.last_processed_index,
            success = state.tally.success,
            failed = state.tally.failed,
            "Checkpoint written"
        );
        Ok(())
    }
}
