//! Report type definitions for stage runs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of a successful stage execution
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// Registered stage name
    pub stage: String,
    /// Exit status of the last external tool the stage ran (0 = success)
    pub exit_code: i32,
    /// Optional steps that failed and were bypassed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Files the stage produced (catalogs, archives)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<PathBuf>,
    /// Wall-clock duration
    pub duration_ms: u64,
}

impl StageReport {
    /// Create an empty, successful report for a stage
    #[must_use]
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            ..Self::default()
        }
    }

    /// Whether every step succeeded without degradation
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.exit_code == 0 && self.warnings.is_empty()
    }
}
