use serde::{Deserialize, Serialize};

/// Selection policy deciding which polygon indexes a run processes.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProcessingMode {
    /// Every polygon, creating the report on first execution
    #[default]
    Full,
    /// Polygons after the last checkpointed index
    Resume,
    /// Only polygons with a recorded error
    RetryFailed,
}

impl ProcessingMode {
    /// Modes that continue an earlier sweep and therefore need its report.
    pub fn requires_report(&self) -> bool {
        !matches!(self, ProcessingMode::Full)
    }
}
