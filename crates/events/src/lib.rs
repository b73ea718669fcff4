#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for webdist
//!
//! Library crates never print. Every user-visible message (stage progress,
//! degraded optional steps, catalog results) travels as an [`AppEvent`] over
//! an unbounded channel and is rendered or logged by the CLI.

pub mod events;
pub use events::{
    AppEvent, CatalogEvent, FailureContext, GeneralEvent, OutputStream, PackageEvent,
    PlatformEvent, StageEvent,
};

use tokio::sync::mpsc::UnboundedSender;

/// Type alias for event sender
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout webdist
///
/// Implemented for raw senders and for any struct that carries one, so call
/// sites never have to care whether anybody is listening.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(event);
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit a warning event with context
    fn emit_warning_with_context(&self, message: impl Into<String>, context: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning_with_context(
            message, context,
        )));
    }

    /// Emit an error event
    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }

    /// Emit a stage started event
    fn emit_stage_started(&self, stage: impl Into<String>) {
        self.emit(AppEvent::Stage(StageEvent::Started {
            stage: stage.into(),
        }));
    }

    /// Emit a stage step started event
    fn emit_step_started(&self, stage: impl Into<String>, step: impl Into<String>) {
        self.emit(AppEvent::Stage(StageEvent::StepStarted {
            stage: stage.into(),
            step: step.into(),
        }));
    }

    /// Emit an optional step failure that was downgraded to a warning
    fn emit_step_degraded(
        &self,
        stage: impl Into<String>,
        step: impl Into<String>,
        reason: impl Into<String>,
    ) {
        self.emit(AppEvent::Stage(StageEvent::StepDegraded {
            stage: stage.into(),
            step: step.into(),
            reason: reason.into(),
        }));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
