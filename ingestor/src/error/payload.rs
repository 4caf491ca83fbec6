use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Failed to decode payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("start_date {start_date} is after end_date {end_date}")]
    InvalidWindow { start_date: NaiveDate, end_date: NaiveDate },

    #[error("Payload from source `{source_name}` requires a geometry")]
    MissingGeometry { source_name: String },

    #[error("Payload from source `{source_name}` must not carry a geometry")]
    UnexpectedGeometry { source_name: String },
}
