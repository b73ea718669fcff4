//! Configure, then write the source archive

use webdist_errors::Error;
use webdist_events::EventEmitter;
use webdist_types::StageReport;

use super::{Stage, StageRegistry};
use crate::context::BuildContext;
use crate::packaging::create_source_archive;

pub(super) async fn run(registry: &StageRegistry, ctx: &BuildContext) -> Result<StageReport, Error> {
    let stage = Stage::Sdist.name();
    let mut report = StageReport::new(stage);

    let configured = registry.run(ctx, Stage::Configure.name()).await?;
    report.warnings.extend(configured.warnings);

    ctx.emit_step_started(stage, "archive");
    let summary = create_source_archive(ctx).await?;
    report.artifacts.push(summary.path);

    Ok(report)
}
