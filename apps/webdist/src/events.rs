//! Event handling and progress display

use console::{Style, Term};
use webdist_events::{
    AppEvent, CatalogEvent, GeneralEvent, PackageEvent, PlatformEvent, StageEvent,
};

use crate::logging::log_event_with_tracing;

/// Renders pipeline events as status lines on stderr
///
/// Stdout is reserved for the final command result, so `--json` output
/// stays machine-readable while progress is still visible.
pub struct EventHandler {
    term: Term,
    /// Suppress console lines entirely (JSON mode)
    quiet: bool,
    /// Show process and debug events
    debug_enabled: bool,
    ok: Style,
    warn: Style,
    err: Style,
    dim: Style,
}

impl EventHandler {
    /// Create new event handler
    pub fn new(colors_enabled: bool, debug_enabled: bool, quiet: bool) -> Self {
        let style = |s: Style| if colors_enabled { s } else { Style::new() };
        Self {
            term: Term::stderr(),
            quiet,
            debug_enabled,
            ok: style(Style::new().green()),
            warn: style(Style::new().yellow()),
            err: style(Style::new().red().bold()),
            dim: style(Style::new().dim()),
        }
    }

    /// Handle incoming event
    pub fn handle_event(&self, event: &AppEvent) {
        log_event_with_tracing(event);
        if self.quiet {
            return;
        }
        if let Some(line) = self.format_event(event) {
            // a closed stderr is not worth failing the command over
            let _ = self.term.write_line(&line);
        }
    }

    /// Console line for an event, if it is shown at the current verbosity
    fn format_event(&self, event: &AppEvent) -> Option<String> {
        match event {
            AppEvent::Stage(stage_event) => self.format_stage(stage_event),
            AppEvent::Catalog(catalog_event) => Some(self.format_catalog(catalog_event)),
            AppEvent::Package(package_event) => Some(self.format_package(package_event)),
            AppEvent::Platform(platform_event) => self.format_platform(platform_event),
            AppEvent::General(general_event) => self.format_general(general_event),
        }
    }

    fn format_stage(&self, event: &StageEvent) -> Option<String> {
        match event {
            StageEvent::Started { stage } => Some(format!("==> running {stage}")),
            StageEvent::StepStarted { stage, step } => self
                .debug_enabled
                .then(|| self.dim.apply_to(format!("  {stage}: {step}")).to_string()),
            StageEvent::StepDegraded {
                stage,
                step,
                reason,
            } => Some(
                self.warn
                    .apply_to(format!("warning: {stage}: {step} failed, continuing ({reason})"))
                    .to_string(),
            ),
            StageEvent::Completed {
                stage,
                exit_code,
                duration_ms,
            } => {
                let style = if *exit_code == 0 { &self.ok } else { &self.warn };
                Some(
                    style
                        .apply_to(format!(
                            "==> {stage} finished (exit {exit_code}, {duration_ms}ms)"
                        ))
                        .to_string(),
                )
            }
            StageEvent::Failed { stage, failure } => Some(
                self.err
                    .apply_to(format!("==> {stage} failed: {}", failure.message))
                    .to_string(),
            ),
        }
    }

    fn format_catalog(&self, event: &CatalogEvent) -> String {
        match event {
            CatalogEvent::TemplateExtracted {
                template,
                messages,
                backend,
            } => format!(
                "  extracted {messages} messages to {} ({backend})",
                template.display()
            ),
            CatalogEvent::LocaleInitialized { locale, catalog } => {
                format!("  created {locale} catalog {}", catalog.display())
            }
            CatalogEvent::LocaleSkipped { locale, .. } => self
                .dim
                .apply_to(format!("  {locale} catalog exists, skipped"))
                .to_string(),
            CatalogEvent::Compiled { catalog } => format!("  compiled {}", catalog.display()),
        }
    }

    fn format_package(&self, event: &PackageEvent) -> String {
        match event {
            PackageEvent::ArchiveStarted { name, version, .. } => {
                format!("  packaging {name} {version}")
            }
            PackageEvent::ArchiveCreated {
                output,
                entries,
                size_bytes,
            } => self
                .ok
                .apply_to(format!(
                    "  wrote {} ({entries} entries, {size_bytes} bytes)",
                    output.display()
                ))
                .to_string(),
        }
    }

    fn format_platform(&self, event: &PlatformEvent) -> Option<String> {
        match event {
            PlatformEvent::ProcessStarted { command } => self
                .debug_enabled
                .then(|| self.dim.apply_to(format!("  $ {}", command.command_line())).to_string()),
            PlatformEvent::ProcessOutput { line, .. } => {
                Some(self.dim.apply_to(format!("    {line}")).to_string())
            }
            PlatformEvent::ProcessCompleted { .. } => None,
            PlatformEvent::ProcessFailed { command, failure, .. } => self.debug_enabled.then(|| {
                self.err
                    .apply_to(format!("  {}: {}", command.program, failure.message))
                    .to_string()
            }),
        }
    }

    fn format_general(&self, event: &GeneralEvent) -> Option<String> {
        match event {
            GeneralEvent::Warning { message, context } => {
                let text = match context {
                    Some(context) => format!("warning: {message} ({context})"),
                    None => format!("warning: {message}"),
                };
                Some(self.warn.apply_to(text).to_string())
            }
            GeneralEvent::Error { message, details } => {
                let text = match details {
                    Some(details) => format!("error: {message}: {details}"),
                    None => format!("error: {message}"),
                };
                Some(self.err.apply_to(text).to_string())
            }
            GeneralEvent::DebugLog { message } => self
                .debug_enabled
                .then(|| self.dim.apply_to(format!("debug: {message}")).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use webdist_events::FailureContext;

    fn plain(debug: bool) -> EventHandler {
        EventHandler::new(false, debug, false)
    }

    #[test]
    fn degraded_steps_are_always_visible() {
        let line = plain(false)
            .format_event(&AppEvent::Stage(StageEvent::StepDegraded {
                stage: "compile".to_string(),
                step: "build".to_string(),
                reason: "grunt exited with 1".to_string(),
            }))
            .unwrap();
        assert_eq!(
            line,
            "warning: compile: build failed, continuing (grunt exited with 1)"
        );
    }

    #[test]
    fn process_lines_only_in_debug() {
        let event = AppEvent::Platform(PlatformEvent::ProcessStarted {
            command: webdist_events::events::ProcessCommandDescriptor {
                program: "npm".to_string(),
                args: vec!["install".to_string(), "--production".to_string()],
                cwd: Some(PathBuf::from("pyload/webui")),
            },
        });
        assert!(plain(false).format_event(&event).is_none());
        assert_eq!(
            plain(true).format_event(&event).as_deref(),
            Some("  $ npm install --production")
        );
    }

    #[test]
    fn tool_output_is_shown_indented() {
        let event = AppEvent::Platform(PlatformEvent::ProcessOutput {
            command: webdist_events::events::ProcessCommandDescriptor {
                program: "npm".to_string(),
                args: vec!["install".to_string()],
                cwd: None,
            },
            stream: webdist_events::OutputStream::Stdout,
            line: "added 3 packages".to_string(),
        });
        assert_eq!(
            plain(false).format_event(&event).as_deref(),
            Some("    added 3 packages")
        );
    }

    #[test]
    fn failures_carry_the_message() {
        let line = plain(false)
            .format_event(&AppEvent::Stage(StageEvent::Failed {
                stage: "get_catalog".to_string(),
                failure: FailureContext::new(
                    Some("build.unimplemented_feature"),
                    "get_catalog is not implemented",
                    None::<String>,
                    false,
                ),
            }))
            .unwrap();
        assert_eq!(line, "==> get_catalog failed: get_catalog is not implemented");
    }
}
