use std::path::Path;
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tracing::info;

use crate::core::config::Config;
use crate::error::IngestorResult;
use crate::types::jobs::JobKey;
use crate::types::payload::WtssPayload;
use crate::worker::coordinator::{JobCoordinator, RunOutcome};
use crate::worker::geometry::load_geometry;

/// Entry point of a job trigger: resolves the polygons of a payload and runs it.
pub struct JobService;

impl JobService {
    pub async fn handle_payload(config: Arc<Config>, payload: WtssPayload) -> IngestorResult<RunOutcome> {
        let params = config.params();
        let window = payload.window();
        info!(
            source = %payload.source(),
            start_date = %window.start_date,
            end_date = %window.end_date,
            mode = %window.mode,
            "Handling job payload"
        );

        let source = payload.geometry_source(&params.geometry_file);
        let geometry = load_geometry(&source, &params.geocode_property).await?;
        let key = JobKey::wtss(&params.coverage, window.start_date, window.end_date);

        let outcome = JobCoordinator::new(config.clone()).run(&key, window.mode, &geometry).await?;
        Ok(outcome)
    }

    /// Reads a queue message from `path`, or from stdin when `path` is `-`.
    pub async fn read_payload(path: &Path) -> IngestorResult<WtssPayload> {
        let bytes = if path == Path::new("-") {
            let mut buffer = Vec::new();
            tokio::io::stdin().read_to_end(&mut buffer).await?;
            buffer
        } else {
            tokio::fs::read(path).await?
        };
        Ok(WtssPayload::parse(&bytes)?)
    }
}
