use std::path::PathBuf;
use std::time::Duration;

use crate::cli::job::JobCliArgs;
use crate::error::IngestorError;

pub const DEFAULT_COVERAGE: &str = "S2-16D-2";
pub const DEFAULT_GEOCODE_PROPERTY: &str = "CD_MUN";
pub const DEFAULT_EMPTY_SERIES_LIMIT: u32 = 5;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_LOCK_TTL_SECS: u64 = 6 * 60 * 60;

/// Validated job parameters shared by every run of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct JobParams {
    pub coverage: String,
    pub geometry_file: PathBuf,
    pub geocode_property: String,
    /// Consecutive empty series after which a run stops early
    pub empty_series_limit: u32,
    pub fetch_timeout: Duration,
    pub lock_ttl_secs: u64,
}

impl Default for JobParams {
    fn default() -> Self {
        Self {
            coverage: DEFAULT_COVERAGE.to_string(),
            geometry_file: PathBuf::from("municipios.geojson"),
            geocode_property: DEFAULT_GEOCODE_PROPERTY.to_string(),
            empty_series_limit: DEFAULT_EMPTY_SERIES_LIMIT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            lock_ttl_secs: DEFAULT_LOCK_TTL_SECS,
        }
    }
}

impl TryFrom<JobCliArgs> for JobParams {
    type Error = IngestorError;

    fn try_from(args: JobCliArgs) -> Result<Self, Self::Error> {
        if args.coverage.trim().is_empty() {
            return Err(IngestorError::ConfigError("Coverage must not be empty".to_string()));
        }
        if args.empty_series_limit == 0 {
            return Err(IngestorError::ConfigError("Empty series limit must be at least 1".to_string()));
        }
        if args.fetch_timeout_secs == 0 {
            return Err(IngestorError::ConfigError("Fetch timeout must be at least 1 second".to_string()));
        }
        Ok(Self {
            coverage: args.coverage,
            geometry_file: args.geometry_file,
            geocode_property: args.geocode_property,
            empty_series_limit: args.empty_series_limit,
            fetch_timeout: Duration::from_secs(args.fetch_timeout_secs),
            lock_ttl_secs: args.lock_ttl_secs,
        })
    }
}

/// MongoDB connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseArgs {
    pub connection_uri: String,
    pub database_name: String,
}
