//! External process events

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Process description shared by the process events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessCommandDescriptor {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl ProcessCommandDescriptor {
    /// Render as a shell-like command line for display
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Which pipe a line of process output came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Events for external process execution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PlatformEvent {
    /// Process about to be spawned
    ProcessStarted { command: ProcessCommandDescriptor },

    /// One line the process wrote, forwarded once it has exited
    ProcessOutput {
        command: ProcessCommandDescriptor,
        stream: OutputStream,
        line: String,
    },

    /// Process ran to completion (any exit status)
    ProcessCompleted {
        command: ProcessCommandDescriptor,
        exit_code: Option<i32>,
        duration_ms: u64,
    },

    /// Process could not be started
    ProcessFailed {
        command: ProcessCommandDescriptor,
        failure: FailureContext,
        duration_ms: u64,
    },
}
