//! Process and filesystem operation errors

use std::borrow::Cow;

use crate::{BuildError, UserFacingError};
use thiserror::Error;

/// Errors that can occur during platform operations
///
/// A process that could not be started and a process that ran but exited
/// unsuccessfully are distinct variants so that call sites can choose whether
/// to downgrade or propagate each case.
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlatformError {
    #[error("failed to start {command}: {message}")]
    ProcessSpawnFailed { command: String, message: String },

    #[error("{command} exited with {}", describe_code(.code))]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("filesystem operation failed: {operation} on {path} - {message}")]
    FilesystemOperationFailed {
        operation: String,
        path: String,
        message: String,
    },
}

#[allow(clippy::ref_option)]
fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

impl PlatformError {
    /// Whether the process never started (as opposed to running and failing)
    #[must_use]
    pub fn is_spawn_failure(&self) -> bool {
        matches!(self, Self::ProcessSpawnFailed { .. })
    }
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ProcessSpawnFailed { .. } => {
                Some("Make sure the tool is installed and resolvable through PATH.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::NonZeroExit { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ProcessSpawnFailed { .. } => "platform.process_spawn_failed",
            Self::NonZeroExit { .. } => "platform.non_zero_exit",
            Self::FilesystemOperationFailed { .. } => "platform.filesystem_operation_failed",
        };
        Some(code)
    }
}

impl From<PlatformError> for BuildError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::FilesystemOperationFailed { message, .. } => BuildError::Failed {
                message: format!("filesystem operation failed: {message}"),
            },
            _ => BuildError::Failed {
                message: err.to_string(),
            },
        }
    }
}
