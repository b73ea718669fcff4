//! Process operations backed by `tokio::process`
//!
//! Every invocation is bracketed by platform events so the CLI can show
//! which tool is running and how it ended. Captured output is forwarded
//! line by line before the completion event.

use async_trait::async_trait;
use std::convert::TryFrom;
use std::time::{Duration, Instant};
use tokio::process::Command;
use webdist_errors::PlatformError;
use webdist_events::{
    events::{FailureContext, OutputStream, PlatformEvent, ProcessCommandDescriptor},
    AppEvent,
};

use crate::core::PlatformContext;
use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

/// Process operations that spawn real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessOperations;

impl TokioProcessOperations {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn emit_process_started(ctx: &PlatformContext, descriptor: &ProcessCommandDescriptor) {
    ctx.emit_event(AppEvent::Platform(PlatformEvent::ProcessStarted {
        command: descriptor.clone(),
    }));
}

fn forward_output(
    ctx: &PlatformContext,
    descriptor: &ProcessCommandDescriptor,
    output: &CommandOutput,
) {
    for (stream, bytes) in [
        (OutputStream::Stdout, &output.stdout),
        (OutputStream::Stderr, &output.stderr),
    ] {
        for line in String::from_utf8_lossy(bytes).lines() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            tracing::debug!(program = %descriptor.program, ?stream, "{line}");
            ctx.emit_event(AppEvent::Platform(PlatformEvent::ProcessOutput {
                command: descriptor.clone(),
                stream,
                line: line.to_string(),
            }));
        }
    }
}

fn emit_process_completed(
    ctx: &PlatformContext,
    descriptor: &ProcessCommandDescriptor,
    output: &CommandOutput,
    duration: Duration,
) {
    ctx.emit_event(AppEvent::Platform(PlatformEvent::ProcessCompleted {
        command: descriptor.clone(),
        exit_code: output.code,
        duration_ms: duration_to_millis(duration),
    }));
}

fn emit_process_failed(
    ctx: &PlatformContext,
    descriptor: &ProcessCommandDescriptor,
    error: &PlatformError,
    duration: Duration,
) {
    ctx.emit_event(AppEvent::Platform(PlatformEvent::ProcessFailed {
        command: descriptor.clone(),
        failure: FailureContext::from_error(error),
        duration_ms: duration_to_millis(duration),
    }));
}

#[async_trait]
impl ProcessOperations for TokioProcessOperations {
    async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, PlatformError> {
        let start = Instant::now();
        let descriptor = cmd.descriptor();

        emit_process_started(ctx, &descriptor);
        tracing::debug!(command = %cmd, cwd = ?cmd.get_current_dir(), "spawning process");

        let mut command = Command::new(cmd.program());
        command.args(cmd.get_args());
        if let Some(dir) = cmd.get_current_dir() {
            command.current_dir(dir);
        }

        let result = command
            .output()
            .await
            .map(|output| CommandOutput {
                code: output.status.code(),
                stdout: output.stdout,
                stderr: output.stderr,
            })
            .map_err(|e| PlatformError::ProcessSpawnFailed {
                command: cmd.to_string(),
                message: e.to_string(),
            });

        let duration = start.elapsed();

        match &result {
            Ok(output) => {
                forward_output(ctx, &descriptor, output);
                emit_process_completed(ctx, &descriptor, output, duration);
            }
            Err(e) => emit_process_failed(ctx, &descriptor, e, duration),
        }

        result
    }
}
