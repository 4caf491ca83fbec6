use chrono::{DateTime, Utc};
use ingestor_provider_client_interface::PixelCoordinate;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointMetadata {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: PixelCoordinate,
}

impl PointMetadata {
    pub fn point(coordinates: PixelCoordinate) -> Self {
        Self { kind: "Point".to_string(), coordinates }
    }
}

/// Attribute values of one pixel at one date. Attributes with no observation
/// are left out of the stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRecord {
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ndvi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nir: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green: Option<f64>,
}

impl TimeSeriesRecord {
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self { timestamp, ndvi: None, evi: None, red: None, nir: None, green: None }
    }
}

/// Per-pixel time series, identified by its coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesDocument {
    pub geocode: String,
    pub metadata: PointMetadata,
    #[serde(default)]
    pub timeseries: Vec<TimeSeriesRecord>,
}

impl TimeSeriesDocument {
    pub fn coordinate(&self) -> PixelCoordinate {
        self.metadata.coordinates
    }
}

/// Outcome of an extend-only batch write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertResult {
    pub matched: u64,
    pub modified: u64,
}
