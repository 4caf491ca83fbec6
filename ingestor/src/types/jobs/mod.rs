pub mod key;
pub mod mode;
pub mod report;
pub mod report_updates;

pub use key::JobKey;
pub use mode::ProcessingMode;
pub use report::{JobReport, PolygonError, ReportStatus, ReportSummary};
pub use report_updates::{Checkpoint, ReportUpdates, Resolution};
