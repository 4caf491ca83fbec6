mod mongo;
mod r#trait;

pub use mongo::{report_update_document, MongoReportRepository};
pub use r#trait::ReportRepository;

#[cfg(test)]
pub use r#trait::MockReportRepository;
