pub mod geometry;
pub mod jobs;
pub mod params;
pub mod payload;
pub mod timeseries;

/// Job name recorded on every report produced by this crate.
pub const WTSS_JOB_NAME: &str = "wtss";

/// Attribute codes requested from the provider for every polygon.
pub const WTSS_ATTRIBUTES: [&str; 5] = ["NDVI", "EVI", "B04", "B08", "B03"];
