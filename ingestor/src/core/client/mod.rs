pub mod database;
pub mod lock;

pub use database::repository::{ReportRepository, TimeSeriesRepository};
pub use lock::LockClient;
