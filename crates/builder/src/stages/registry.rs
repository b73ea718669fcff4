//! Name to stage registry

use futures::future::BoxFuture;
use std::time::Instant;
use webdist_errors::{BuildError, Error};
use webdist_events::{AppEvent, EventEmitter, FailureContext, StageEvent};
use webdist_types::StageReport;

use super::Stage;
use crate::context::BuildContext;

/// Stages by unique name, in registration order
#[derive(Debug, Clone, Default)]
pub struct StageRegistry {
    stages: Vec<(String, Stage)>,
}

impl StageRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every stage bound to its own name
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            stages: Stage::ALL
                .into_iter()
                .map(|stage| (stage.name().to_string(), stage))
                .collect(),
        }
    }

    /// Bind `stage` to `name`
    ///
    /// # Errors
    ///
    /// Returns `BuildError::DuplicateStage` if the name is already bound.
    pub fn register(&mut self, name: impl Into<String>, stage: Stage) -> Result<(), Error> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(BuildError::DuplicateStage { name }.into());
        }
        self.stages.push((name, stage));
        Ok(())
    }

    /// Stage bound to `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Stage> {
        self.stages
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, stage)| *stage)
    }

    /// Registered `(name, stage)` pairs in registration order
    pub fn stages(&self) -> impl Iterator<Item = (&str, Stage)> {
        self.stages.iter().map(|(name, stage)| (name.as_str(), *stage))
    }

    /// Look up and execute the stage bound to `name`
    ///
    /// Emits `Started` and then `Completed` or `Failed`. Stages calling other
    /// stages go through here, so the returned future is boxed.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::UnknownStage` for an unbound name, otherwise the
    /// stage's own error.
    pub fn run<'a>(
        &'a self,
        ctx: &'a BuildContext,
        name: &'a str,
    ) -> BoxFuture<'a, Result<StageReport, Error>> {
        Box::pin(async move {
            let stage = self.get(name).ok_or_else(|| BuildError::UnknownStage {
                name: name.to_string(),
            })?;

            tracing::debug!(stage = name, "running stage");
            ctx.emit_stage_started(name);
            let started = Instant::now();

            match stage.execute(self, ctx).await {
                Ok(mut report) => {
                    report.stage = name.to_string();
                    report.duration_ms =
                        u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                    ctx.emit(AppEvent::Stage(StageEvent::Completed {
                        stage: name.to_string(),
                        exit_code: report.exit_code,
                        duration_ms: report.duration_ms,
                    }));
                    Ok(report)
                }
                Err(e) => {
                    ctx.emit(AppEvent::Stage(StageEvent::Failed {
                        stage: name.to_string(),
                        failure: FailureContext::from_error(&e),
                    }));
                    Err(e)
                }
            }
        })
    }
}
