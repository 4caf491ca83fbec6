pub mod coordinator;
pub mod geometry;
pub mod reshaper;
pub mod selection;
pub mod service;

pub use coordinator::{JobCoordinator, RunOutcome, StopReason};
pub use service::JobService;
