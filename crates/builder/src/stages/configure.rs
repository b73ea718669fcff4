//! Compile, then locale directory, extract, init and compile catalogs
//!
//! Every catalog step is mandatory: the first failure aborts the stage.

use webdist_errors::{BuildError, Error};
use webdist_events::{AppEvent, CatalogEvent, EventEmitter};
use webdist_platform::fs as pfs;
use webdist_types::StageReport;

use super::{Stage, StageRegistry};
use crate::catalog::InitOutcome;
use crate::context::BuildContext;

/// Keep a mandatory-step error as is, otherwise wrap it in this step's variant
fn as_step_failure(err: Error, wrap: impl FnOnce(String) -> BuildError) -> Error {
    match err.as_build() {
        Some(build) if build.is_mandatory_step_failure() => err,
        _ => wrap(err.to_string()).into(),
    }
}

pub(super) async fn run(registry: &StageRegistry, ctx: &BuildContext) -> Result<StageReport, Error> {
    let stage = Stage::Configure.name();
    let mut report = StageReport::new(stage);
    let config = ctx.config();
    let catalog = ctx.catalog();

    let compiled = registry.run(ctx, Stage::Compile.name()).await?;
    if compiled.exit_code != 0 {
        ctx.emit_debug(format!(
            "compile finished with exit code {}; continuing",
            compiled.exit_code
        ));
    }
    report.warnings.extend(compiled.warnings);

    ctx.emit_step_started(stage, "locale_dir");
    let locale_dir = config.locale_path(ctx.root());
    pfs::ensure_dir(&locale_dir)
        .await
        .map_err(|e| BuildError::LocaleDirectoryFailed {
            path: locale_dir.display().to_string(),
            message: e.to_string(),
        })?;

    ctx.emit_step_started(stage, "extract");
    let summary = catalog
        .extract(ctx, ctx.mapping())
        .await
        .map_err(|e| as_step_failure(e, |message| BuildError::ExtractionFailed { message }))?;
    ctx.emit(AppEvent::Catalog(CatalogEvent::TemplateExtracted {
        template: summary.template.clone(),
        messages: summary.messages,
        backend: catalog.name().to_string(),
    }));
    report.artifacts.push(summary.template);

    ctx.emit_step_started(stage, "init");
    for locale in &config.catalog.locales {
        let outcome = catalog.init(ctx, locale).await.map_err(|e| {
            as_step_failure(e, |message| BuildError::CatalogInitFailed {
                locale: locale.clone(),
                message,
            })
        })?;
        let event = match outcome {
            InitOutcome::Created(path) => CatalogEvent::LocaleInitialized {
                locale: locale.clone(),
                catalog: path,
            },
            InitOutcome::Skipped(path) => CatalogEvent::LocaleSkipped {
                locale: locale.clone(),
                catalog: path,
            },
        };
        ctx.emit(AppEvent::Catalog(event));
    }

    ctx.emit_step_started(stage, "compile_catalog");
    let compiled_catalogs = catalog
        .compile(ctx)
        .await
        .map_err(|e| as_step_failure(e, |message| BuildError::CatalogCompileFailed { message }))?;
    for path in compiled_catalogs {
        ctx.emit(AppEvent::Catalog(CatalogEvent::Compiled {
            catalog: path.clone(),
        }));
        report.artifacts.push(path);
    }

    Ok(report)
}
