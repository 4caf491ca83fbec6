pub mod client;
pub mod constants;
pub mod error;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use ingestor_provider_client_interface::{ObservationTable, ProviderError, TimeSeriesProvider, TimeSeriesRequest};
use tracing::debug;
use url::Url;

use crate::client::{into_observations, WtssClient};
pub use crate::error::WtssError;
use crate::types::TimeSeriesQuery;

#[derive(Debug, Clone)]
pub struct WtssValidatedArgs {
    pub wtss_service_url: Url,
    pub request_timeout: Duration,
}

/// Web Time Series Service (WTSS) backed provider.
pub struct WtssProviderService {
    pub wtss_client: WtssClient,
}

impl WtssProviderService {
    pub fn new_with_args(args: &WtssValidatedArgs) -> Result<Self, WtssError> {
        let wtss_client = WtssClient::new(args.wtss_service_url.clone(), args.request_timeout)?;
        Ok(Self { wtss_client })
    }
}

#[async_trait]
impl TimeSeriesProvider for WtssProviderService {
    #[tracing::instrument(skip(self, request), fields(coverage = %request.coverage, geometry = request.geometry.kind()))]
    async fn fetch(&self, request: &TimeSeriesRequest) -> Result<ObservationTable, ProviderError> {
        let query = TimeSeriesQuery {
            coverage: request.coverage.clone(),
            attributes: request.attributes.clone(),
            geom: request.geometry.clone(),
            start_datetime: request.start_date,
            end_datetime: request.end_date,
        };
        let response = self.wtss_client.time_series(&query).await?;
        let table = into_observations(response)?;
        debug!(rows = table.len(), "Fetched WTSS observations");
        Ok(table)
    }
}
