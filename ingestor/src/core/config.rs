use std::sync::Arc;

use ingestor_provider_client_interface::TimeSeriesProvider;
use ingestor_wtss_service::WtssProviderService;
use tracing::{debug, info};

use crate::cli::ServiceArgs;
use crate::core::client::database::repository::{MongoReportRepository, MongoTimeSeriesRepository};
use crate::core::client::database::MongoClient;
use crate::core::client::lock::MongoLockClient;
use crate::core::client::{LockClient, ReportRepository, TimeSeriesRepository};
use crate::error::{IngestorError, IngestorResult};
use crate::types::params::{DatabaseArgs, JobParams};

/// Process-wide clients and parameters.
pub struct Config {
    params: JobParams,
    report_repository: Arc<dyn ReportRepository>,
    timeseries_repository: Arc<dyn TimeSeriesRepository>,
    lock_client: Arc<dyn LockClient>,
    provider: Arc<dyn TimeSeriesProvider>,
}

impl Config {
    pub fn new(
        params: JobParams,
        report_repository: Arc<dyn ReportRepository>,
        timeseries_repository: Arc<dyn TimeSeriesRepository>,
        lock_client: Arc<dyn LockClient>,
        provider: Arc<dyn TimeSeriesProvider>,
    ) -> Self {
        Self { params, report_repository, timeseries_repository, lock_client, provider }
    }

    /// Connects to MongoDB and builds the WTSS provider from command line arguments.
    pub async fn from_service_args(args: &ServiceArgs) -> IngestorResult<Self> {
        let params = JobParams::try_from(args.job_args.clone())?;
        let database = DatabaseArgs::from(args.mongodb_args.clone());

        let mongo = Arc::new(MongoClient::new(&database.connection_uri, &database.database_name).await?);
        mongo.health_check().await?;
        debug!(database = %database.database_name, "MongoDB connection established");

        let report_repository = MongoReportRepository::new(mongo.clone());
        report_repository.ensure_indexes().await?;

        let provider = WtssProviderService::new_with_args(&args.wtss_args.validated(params.fetch_timeout))
            .map_err(|e| IngestorError::ConfigError(format!("Failed to build WTSS client: {e}")))?;
        info!(
            wtss_url = %provider.wtss_client.base_url(),
            coverage = %params.coverage,
            "Configuration initialized"
        );

        Ok(Self::new(
            params,
            Arc::new(report_repository),
            Arc::new(MongoTimeSeriesRepository::new(mongo.clone())),
            Arc::new(MongoLockClient::new(mongo)),
            Arc::new(provider),
        ))
    }

    pub fn params(&self) -> &JobParams {
        &self.params
    }

    pub fn report_repository(&self) -> &Arc<dyn ReportRepository> {
        &self.report_repository
    }

    pub fn timeseries_repository(&self) -> &Arc<dyn TimeSeriesRepository> {
        &self.timeseries_repository
    }

    pub fn lock_client(&self) -> &Arc<dyn LockClient> {
        &self.lock_client
    }

    pub fn provider(&self) -> &Arc<dyn TimeSeriesProvider> {
        &self.provider
    }
}
