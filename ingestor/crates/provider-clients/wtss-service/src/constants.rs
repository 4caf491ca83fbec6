/// Path of the time-series endpoint, relative to the service base URL.
pub const TIMESERIES_PATH: &str = "timeseries";

pub const DEFAULT_WTSS_URL: &str = "https://data.inpe.br/bdc/wtss/v4/";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
