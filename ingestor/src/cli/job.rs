use std::path::PathBuf;

use clap::Args;

/// Parameters shared by every job run.
#[derive(Debug, Clone, Args)]
pub struct JobCliArgs {
    /// Coverage (collection) requested from WTSS.
    #[arg(env = "INGESTOR_WTSS_COVERAGE", long, default_value = "S2-16D-2")]
    pub coverage: String,

    /// Default GeoJSON FeatureCollection of polygons.
    #[arg(env = "INGESTOR_GEOMETRY_FILE", long, default_value = "municipios.geojson")]
    pub geometry_file: PathBuf,

    /// Feature property holding the polygon geocode.
    #[arg(env = "INGESTOR_GEOCODE_PROPERTY", long, default_value = "CD_MUN")]
    pub geocode_property: String,

    /// Consecutive empty series after which the run stops.
    #[arg(env = "INGESTOR_EMPTY_SERIES_LIMIT", long, default_value_t = 5)]
    pub empty_series_limit: u32,

    /// Timeout of a single polygon fetch, in seconds.
    #[arg(env = "INGESTOR_FETCH_TIMEOUT_SECS", long, default_value_t = 300)]
    pub fetch_timeout_secs: u64,

    /// Expiry of the single-flight job lock, in seconds.
    #[arg(env = "INGESTOR_LOCK_TTL_SECS", long, default_value_t = 21600)]
    pub lock_ttl_secs: u64,
}
