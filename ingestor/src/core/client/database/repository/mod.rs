pub mod report;
pub mod timeseries;

pub use report::{MongoReportRepository, ReportRepository};
pub use timeseries::{MongoTimeSeriesRepository, TimeSeriesRepository};

#[cfg(test)]
pub use report::MockReportRepository;
#[cfg(test)]
pub use timeseries::MockTimeSeriesRepository;
