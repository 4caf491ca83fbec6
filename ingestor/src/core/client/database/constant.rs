/// Collection holding one report per job key.
pub const REPORTS_COLLECTION: &str = "reports";

/// Collection of per-pixel time series.
///
/// Documents are seeded by the yield import and only ever extended here.
pub const TIMESERIES_COLLECTION: &str = "cafe";

pub const LOCKS_COLLECTION: &str = "locks";
