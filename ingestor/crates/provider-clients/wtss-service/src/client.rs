use std::time::Duration;

use ingestor_provider_client_interface::{Observation, ObservationTable};
use reqwest::header::{HeaderValue, ACCEPT};
use tracing::debug;
use url::Url;

use crate::constants::TIMESERIES_PATH;
use crate::error::WtssError;
use crate::types::{TimeSeriesQuery, TimeSeriesResponse};

/// Thin async wrapper over the WTSS HTTP API
pub struct WtssClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl WtssClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, WtssError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WtssError::from_reqwest_error("build_client", e, timeout))?;
        Ok(Self { client, base_url: with_trailing_slash(base_url), timeout })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the per-pixel series of a polygon.
    ///
    /// # Returns
    /// The decoded response, or an error describing whether the failure happened on the
    /// wire, at the service, or while decoding the body.
    pub async fn time_series(&self, query: &TimeSeriesQuery) -> Result<TimeSeriesResponse, WtssError> {
        let url = self
            .base_url
            .join(TIMESERIES_PATH)
            .map_err(|e| WtssError::UrlError { operation: "time_series".to_string(), message: e.to_string() })?;
        debug!(url = %url, coverage = %query.coverage, "Requesting WTSS time series");

        let response = self
            .client
            .post(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(query)
            .send()
            .await
            .map_err(|e| WtssError::from_reqwest_error("time_series", e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WtssError::ApiError { operation: "time_series".to_string(), status, message });
        }

        let body = response.bytes().await.map_err(|e| WtssError::from_reqwest_error("time_series", e, self.timeout))?;
        serde_json::from_slice(&body).map_err(|e| WtssError::parse_error("time_series", e.to_string()))
    }
}

/// `Url::join` drops the last path segment unless the base ends with a slash.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Flatten a response into observation rows, result by result, attribute by attribute.
pub fn into_observations(response: TimeSeriesResponse) -> Result<ObservationTable, WtssError> {
    let mut rows = Vec::new();
    for pixel in response.results {
        let coordinate = pixel.geometry.coordinates;
        let timeline = &pixel.time_series.timeline;
        for (attribute, values) in pixel.time_series.values {
            if values.len() != timeline.len() {
                return Err(WtssError::InconsistentSeries {
                    attribute,
                    timeline: timeline.len(),
                    values: values.len(),
                });
            }
            for (timestamp, value) in timeline.iter().zip(values) {
                if let Some(value) = value {
                    rows.push(Observation { coordinate, timestamp: *timestamp, attribute: attribute.clone(), value });
                }
            }
        }
    }
    Ok(ObservationTable::new(rows))
}
