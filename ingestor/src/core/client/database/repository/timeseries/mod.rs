mod mongo;
mod r#trait;

pub use mongo::{coordinate_filter, MongoTimeSeriesRepository};
pub use r#trait::TimeSeriesRepository;

#[cfg(test)]
pub use r#trait::MockTimeSeriesRepository;
