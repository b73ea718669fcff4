//! Structured logging integration for events
//!
//! Every [`AppEvent`] is mirrored into the tracing ecosystem with structured
//! fields, so `--debug` log files carry the full pipeline history even when
//! the console only shows a summary.

use tracing::{debug, error, info, warn};
use webdist_events::{
    AppEvent, CatalogEvent, GeneralEvent, PackageEvent, PlatformEvent, StageEvent,
};

/// Log an `AppEvent` using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(event: &AppEvent) {
    let target = event.log_target();
    match event {
        AppEvent::Stage(stage_event) => log_stage_event(target, stage_event),
        AppEvent::Catalog(catalog_event) => log_catalog_event(target, catalog_event),
        AppEvent::Package(package_event) => log_package_event(target, package_event),
        AppEvent::Platform(platform_event) => log_platform_event(target, platform_event),
        AppEvent::General(general_event) => log_general_event(target, general_event),
    }
}

fn log_stage_event(target: &str, event: &StageEvent) {
    match event {
        StageEvent::Started { stage } => {
            info!(domain = target, stage = %stage, "Stage started");
        }
        StageEvent::StepStarted { stage, step } => {
            debug!(domain = target, stage = %stage, step = %step, "Step started");
        }
        StageEvent::StepDegraded {
            stage,
            step,
            reason,
        } => {
            warn!(
                domain = target,
                stage = %stage,
                step = %step,
                reason = %reason,
                "Optional step failed, continuing"
            );
        }
        StageEvent::Completed {
            stage,
            exit_code,
            duration_ms,
        } => {
            info!(
                domain = target,
                stage = %stage,
                exit_code = exit_code,
                duration_ms = duration_ms,
                "Stage completed"
            );
        }
        StageEvent::Failed { stage, failure } => {
            error!(
                domain = target,
                stage = %stage,
                retryable = failure.retryable,
                code = ?failure.code,
                message = %failure.message,
                hint = ?failure.hint,
                "Stage failed"
            );
        }
    }
}

fn log_catalog_event(target: &str, event: &CatalogEvent) {
    match event {
        CatalogEvent::TemplateExtracted {
            template,
            messages,
            backend,
        } => {
            info!(
                domain = target,
                template = %template.display(),
                messages = messages,
                backend = %backend,
                "Message template extracted"
            );
        }
        CatalogEvent::LocaleInitialized { locale, catalog } => {
            info!(
                domain = target,
                locale = %locale,
                catalog = %catalog.display(),
                "Locale catalog initialized"
            );
        }
        CatalogEvent::LocaleSkipped { locale, catalog } => {
            debug!(
                domain = target,
                locale = %locale,
                catalog = %catalog.display(),
                "Locale catalog exists, skipped"
            );
        }
        CatalogEvent::Compiled { catalog } => {
            info!(domain = target, catalog = %catalog.display(), "Catalog compiled");
        }
    }
}

fn log_package_event(target: &str, event: &PackageEvent) {
    match event {
        PackageEvent::ArchiveStarted {
            name,
            version,
            output,
        } => {
            info!(
                domain = target,
                package = %name,
                version = %version,
                output = %output.display(),
                "Source archive started"
            );
        }
        PackageEvent::ArchiveCreated {
            output,
            entries,
            size_bytes,
        } => {
            info!(
                domain = target,
                output = %output.display(),
                entries = entries,
                size_bytes = size_bytes,
                "Source archive created"
            );
        }
    }
}

fn log_platform_event(target: &str, event: &PlatformEvent) {
    match event {
        PlatformEvent::ProcessStarted { command } => {
            debug!(
                domain = target,
                command = %command.command_line(),
                cwd = ?command.cwd,
                "Process started"
            );
        }
        PlatformEvent::ProcessOutput {
            command,
            stream,
            line,
        } => {
            debug!(
                domain = target,
                program = %command.program,
                stream = ?stream,
                line = %line,
                "Process output"
            );
        }
        PlatformEvent::ProcessCompleted {
            command,
            exit_code,
            duration_ms,
        } => {
            if *exit_code == Some(0) {
                debug!(
                    domain = target,
                    command = %command.command_line(),
                    exit_code = ?exit_code,
                    duration_ms = duration_ms,
                    "Process completed"
                );
            } else {
                warn!(
                    domain = target,
                    command = %command.command_line(),
                    exit_code = ?exit_code,
                    duration_ms = duration_ms,
                    "Process exited unsuccessfully"
                );
            }
        }
        PlatformEvent::ProcessFailed {
            command,
            failure,
            duration_ms,
        } => {
            error!(
                domain = target,
                command = %command.command_line(),
                code = ?failure.code,
                message = %failure.message,
                hint = ?failure.hint,
                duration_ms = duration_ms,
                "Process could not be started"
            );
        }
    }
}

fn log_general_event(target: &str, event: &GeneralEvent) {
    match event {
        GeneralEvent::Warning { message, context } => {
            warn!(domain = target, context = ?context, "{message}");
        }
        GeneralEvent::Error { message, details } => {
            error!(domain = target, details = ?details, "{message}");
        }
        GeneralEvent::DebugLog { message } => {
            debug!(domain = target, "{message}");
        }
    }
}
