use std::path::Path;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::geometry::{FeatureCollection, GeometrySource};
use super::jobs::ProcessingMode;
use crate::error::PayloadError;

/// Number of days covered by the scheduled weekly run.
pub const CRON_WINDOW_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PayloadSource {
    Cron,
    Api,
    Admin,
}

/// Date window and mode shared by every trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub mode: ProcessingMode,
}

impl JobWindow {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, mode: ProcessingMode) -> Result<Self, PayloadError> {
        if start_date > end_date {
            return Err(PayloadError::InvalidWindow { start_date, end_date });
        }
        Ok(Self { start_date, end_date, mode })
    }
}

/// Job trigger message, discriminated by where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPayload", into = "RawPayload")]
pub enum WtssPayload {
    /// Scheduled run over the default geometry file
    Cron { window: JobWindow },
    /// Caller supplied polygons
    Api { window: JobWindow, geometry: FeatureCollection },
    Admin { window: JobWindow, geometry: Option<FeatureCollection> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<PayloadSource>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    #[serde(default)]
    mode: ProcessingMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    geometry: Option<FeatureCollection>,
}

impl TryFrom<RawPayload> for WtssPayload {
    type Error = PayloadError;

    fn try_from(raw: RawPayload) -> Result<Self, Self::Error> {
        let window = JobWindow::new(raw.start_date, raw.end_date, raw.mode)?;
        // Messages without a source predate the discriminator.
        let source = raw.source.unwrap_or(if raw.geometry.is_some() { PayloadSource::Api } else { PayloadSource::Cron });

        match (source, raw.geometry) {
            (PayloadSource::Cron, None) => Ok(WtssPayload::Cron { window }),
            (PayloadSource::Cron, Some(_)) => {
                Err(PayloadError::UnexpectedGeometry { source_name: PayloadSource::Cron.to_string() })
            }
            (PayloadSource::Api, Some(geometry)) => Ok(WtssPayload::Api { window, geometry }),
            (PayloadSource::Api, None) => {
                Err(PayloadError::MissingGeometry { source_name: PayloadSource::Api.to_string() })
            }
            (PayloadSource::Admin, geometry) => Ok(WtssPayload::Admin { window, geometry }),
        }
    }
}

impl From<WtssPayload> for RawPayload {
    fn from(payload: WtssPayload) -> Self {
        let source = payload.source();
        let (window, geometry) = match payload {
            WtssPayload::Cron { window } => (window, None),
            WtssPayload::Api { window, geometry } => (window, Some(geometry)),
            WtssPayload::Admin { window, geometry } => (window, geometry),
        };
        RawPayload {
            source: Some(source),
            start_date: window.start_date,
            end_date: window.end_date,
            mode: window.mode,
            geometry,
        }
    }
}

impl WtssPayload {
    pub fn parse(bytes: &[u8]) -> Result<Self, PayloadError> {
        let raw: RawPayload = serde_json::from_slice(bytes)?;
        WtssPayload::try_from(raw)
    }

    /// Payload of the scheduled run ending on `today`.
    pub fn cron(today: NaiveDate) -> Self {
        let start_date = today.checked_sub_days(Days::new(CRON_WINDOW_DAYS)).unwrap_or(today);
        WtssPayload::Cron { window: JobWindow { start_date, end_date: today, mode: ProcessingMode::Full } }
    }

    pub fn source(&self) -> PayloadSource {
        match self {
            WtssPayload::Cron { .. } => PayloadSource::Cron,
            WtssPayload::Api { .. } => PayloadSource::Api,
            WtssPayload::Admin { .. } => PayloadSource::Admin,
        }
    }

    pub fn window(&self) -> JobWindow {
        match self {
            WtssPayload::Cron { window } | WtssPayload::Api { window, .. } | WtssPayload::Admin { window, .. } => {
                *window
            }
        }
    }

    pub fn geometry_source(&self, default_path: &Path) -> GeometrySource {
        match self {
            WtssPayload::Api { geometry, .. } | WtssPayload::Admin { geometry: Some(geometry), .. } => {
                GeometrySource::Inline(geometry.clone())
            }
            _ => GeometrySource::File(default_path.to_path_buf()),
        }
    }
}
