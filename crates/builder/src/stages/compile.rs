//! Best-effort web interface build
//!
//! Nothing here aborts the stage. A missing asset directory degrades the
//! whole step list and yields a failing exit code without running any tool.
//! The dev install and the grunt build are guarded together: the first
//! failure is reported as a degraded step and skips the rest of the block.
//! The production install always runs and its exit status becomes the
//! report's exit code.

use std::path::Path;
use webdist_config::{
    constants::{EXIT_FAILURE, EXIT_NOT_FOUND},
    ToolInvocation,
};
use webdist_errors::{BuildError, Error, PlatformError};
use webdist_events::EventEmitter;
use webdist_platform::{fs as pfs, CommandOutput, PlatformCommand};
use webdist_types::StageReport;

use super::Stage;
use crate::context::BuildContext;

fn command(ctx: &BuildContext, dir: &Path, tool: &ToolInvocation) -> PlatformCommand {
    let mut cmd = ctx.process().create_command(&tool.program);
    cmd.args(&tool.args).current_dir(dir);
    cmd
}

async fn run_checked(
    ctx: &BuildContext,
    dir: &Path,
    tool: &ToolInvocation,
) -> Result<CommandOutput, PlatformError> {
    ctx.process()
        .execute_checked(ctx.platform(), command(ctx, dir, tool))
        .await
}

pub(super) async fn run(ctx: &BuildContext) -> Result<StageReport, Error> {
    let stage = Stage::Compile.name();
    let mut report = StageReport::new(stage);
    let webui = ctx.config().webui_path(ctx.root());

    let unavailable = match tokio::fs::metadata(&webui).await {
        Ok(meta) if meta.is_dir() => None,
        Ok(_) => Some("not a directory".to_string()),
        Err(e) => Some(e.to_string()),
    };
    if let Some(message) = unavailable {
        let reason = BuildError::AssetDirectoryUnavailable {
            path: webui.display().to_string(),
            message,
        };
        let reason = format!("Failed to compile webui: {reason}");
        ctx.emit_step_degraded(stage, "asset_directory", &reason);
        report.warnings.push(reason);
        report.exit_code = EXIT_FAILURE;
        return Ok(report);
    }

    let tools = &ctx.config().webui;
    for (step, tool) in [("dev_install", &tools.dev_install), ("build", &tools.build)] {
        ctx.emit_step_started(stage, step);
        if let Err(e) = run_checked(ctx, &webui, tool).await {
            let reason = format!("Failed to compile webui: {e}");
            ctx.emit_step_degraded(stage, step, &reason);
            report.warnings.push(reason);
            break;
        }
    }

    ctx.emit_step_started(stage, "clean");
    let node_modules = webui.join("node_modules");
    if let Err(e) = pfs::remove_dir_all_if_exists(&node_modules).await {
        let reason = format!("could not remove {}: {e}", node_modules.display());
        ctx.emit_step_degraded(stage, "clean", &reason);
        report.warnings.push(reason);
    }

    ctx.emit_step_started(stage, "production_install");
    let production = command(ctx, &webui, &tools.production_install);
    report.exit_code = match ctx.process().execute_command(ctx.platform(), production).await {
        // killed by a signal
        Ok(output) => output.code.unwrap_or(-1),
        Err(e) => {
            let reason = e.to_string();
            ctx.emit_step_degraded(stage, "production_install", &reason);
            report.warnings.push(reason);
            EXIT_NOT_FOUND
        }
    };

    Ok(report)
}
