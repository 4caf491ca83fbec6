use std::collections::BTreeMap;

use chrono::NaiveDate;
use ingestor_provider_client_interface::{Geometry, PixelCoordinate};
use serde::{Deserialize, Serialize};

/// Body of `POST /timeseries`.
#[derive(Debug, Clone, Serialize)]
pub struct TimeSeriesQuery {
    pub coverage: String,
    pub attributes: Vec<String>,
    pub geom: Geometry,
    pub start_datetime: NaiveDate,
    pub end_datetime: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeriesResponse {
    #[serde(default)]
    pub results: Vec<PixelSeries>,
}

/// Series of every requested attribute for one pixel.
#[derive(Debug, Clone, Deserialize)]
pub struct PixelSeries {
    pub geometry: PointGeometry,
    pub time_series: SeriesValues,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: PixelCoordinate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeriesValues {
    pub timeline: Vec<NaiveDate>,
    /// Attribute code -> one value per timeline entry; `null` marks a missing observation.
    pub values: BTreeMap<String, Vec<Option<f64>>>,
}
