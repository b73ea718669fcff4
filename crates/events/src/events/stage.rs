use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Stage lifecycle events emitted by the registry and the stages themselves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum StageEvent {
    /// A registered stage started executing
    Started { stage: String },

    /// A named step inside a stage started
    StepStarted { stage: String, step: String },

    /// An optional step failed; the stage keeps going
    StepDegraded {
        stage: String,
        step: String,
        reason: String,
    },

    /// The stage finished; `exit_code` is the last tool's exit status
    Completed {
        stage: String,
        exit_code: i32,
        duration_ms: u64,
    },

    /// The stage aborted with an error
    Failed {
        stage: String,
        failure: FailureContext,
    },
}

impl StageEvent {
    /// Name of the stage this event belongs to
    #[must_use]
    pub fn stage(&self) -> &str {
        match self {
            Self::Started { stage }
            | Self::StepStarted { stage, .. }
            | Self::StepDegraded { stage, .. }
            | Self::Completed { stage, .. }
            | Self::Failed { stage, .. } => stage,
        }
    }
}
