use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::automock;
use serde::{Deserialize, Serialize};

/// Time-series provider abstraction over remote-sensing data services.
///
/// A provider receives one polygon together with a date window and a list of
/// attribute codes, and answers with the raw per-pixel observations that fall
/// inside the polygon. Providers are expected to be slow and occasionally
/// unavailable; callers distinguish transport-class failures (see
/// [`ProviderError::is_transport`]) from faults in the returned data.
#[automock]
#[async_trait]
pub trait TimeSeriesProvider: Send + Sync {
    async fn fetch(&self, request: &TimeSeriesRequest) -> Result<ObservationTable, ProviderError>;
}

/// One GeoJSON position, `[lng, lat]` with an optional altitude.
pub type Position = Vec<f64>;

/// Areal GeoJSON geometries accepted as fetch input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

impl Geometry {
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
        }
    }
}

/// Pixel centre in `[lng, lat]` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct PixelCoordinate {
    pub lng: f64,
    pub lat: f64,
}

impl PixelCoordinate {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Bitwise identity used for grouping. Two coordinates share a key only if
    /// both components are exactly equal.
    pub fn key(&self) -> (u64, u64) {
        (self.lng.to_bits(), self.lat.to_bits())
    }

    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }
}

impl From<[f64; 2]> for PixelCoordinate {
    fn from(value: [f64; 2]) -> Self {
        Self { lng: value[0], lat: value[1] }
    }
}

impl From<PixelCoordinate> for [f64; 2] {
    fn from(value: PixelCoordinate) -> Self {
        [value.lng, value.lat]
    }
}

impl fmt::Display for PixelCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lng, self.lat)
    }
}

/// A single attribute value observed for one pixel at one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub coordinate: PixelCoordinate,
    pub timestamp: NaiveDate,
    pub attribute: String,
    pub value: f64,
}

/// Flat observation rows as returned by a provider, in provider order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    pub rows: Vec<Observation>,
}

impl ObservationTable {
    pub fn new(rows: Vec<Observation>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesRequest {
    pub coverage: String,
    pub attributes: Vec<String>,
    pub geometry: Geometry,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The request never produced a response (connection refused, reset, ...)
    #[error("Transport error: {0}")]
    Transport(String),
    /// The service answered with a non-success HTTP status
    #[error("Upstream returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// The response arrived but could not be interpreted
    #[error("Invalid response data: {0}")]
    Data(String),
    #[error("Internal provider error: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl ProviderError {
    /// Transport-class faults are treated as possibly systemic by callers.
    pub fn is_transport(&self) -> bool {
        matches!(self, ProviderError::Transport(_) | ProviderError::Status { .. } | ProviderError::Timeout(_))
    }
}
