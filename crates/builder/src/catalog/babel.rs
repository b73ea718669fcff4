//! Catalog backend that drives the `pybabel` command line tool

use async_trait::async_trait;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::fs;
use webdist_errors::{BuildError, Error, PlatformError};
use webdist_platform::PlatformCommand;
use webdist_types::SourceKind;

use super::native::po::Catalog;
use super::{CatalogTool, ExtractSummary, ExtractionMapping, InitOutcome};
use crate::context::BuildContext;

/// Runs `pybabel extract`, `init` and `compile` in the project root
#[derive(Debug, Clone, Copy, Default)]
pub struct BabelCatalogTool;

impl BabelCatalogTool {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Babel method name for a source kind
fn method(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Python => "python",
        SourceKind::Javascript => "javascript",
        SourceKind::Ignore => "ignore",
    }
}

/// Render the mapping in Babel's `[method: pattern]` configuration format
#[must_use]
pub fn render_mapping(mapping: &ExtractionMapping) -> String {
    let mut out = String::new();
    for rule in mapping.rules() {
        let _ = writeln!(out, "[{}: {}]", method(rule.kind()), rule.pattern());
    }
    out
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

async fn run(ctx: &BuildContext, cmd: PlatformCommand) -> Result<(), PlatformError> {
    ctx.process()
        .execute_checked(ctx.platform(), cmd)
        .await
        .map(|_| ())
}

impl BabelCatalogTool {
    fn command(ctx: &BuildContext, subcommand: &str) -> PlatformCommand {
        let mut cmd = ctx.process().create_command(&ctx.config().catalog.pybabel);
        cmd.arg(subcommand).current_dir(ctx.root());
        cmd
    }
}

#[async_trait]
impl CatalogTool for BabelCatalogTool {
    fn name(&self) -> &'static str {
        "babel"
    }

    async fn extract(
        &self,
        ctx: &BuildContext,
        mapping: &ExtractionMapping,
    ) -> Result<ExtractSummary, Error> {
        let failed = |message: String| -> Error { BuildError::ExtractionFailed { message }.into() };

        let mapping_file = tempfile::Builder::new()
            .prefix("webdist-babel-")
            .suffix(".cfg")
            .tempfile()
            .map_err(|e| failed(format!("cannot create mapping file: {e}")))?;
        fs::write(mapping_file.path(), render_mapping(mapping))
            .await
            .map_err(|e| failed(format!("cannot write mapping file: {e}")))?;

        let template = ctx.config().template_path(ctx.root());
        let metadata = ctx.metadata();
        let mut cmd = Self::command(ctx, "extract");
        cmd.arg("-F")
            .arg(path_arg(mapping_file.path()))
            .arg("-o")
            .arg(path_arg(&template))
            .arg("--project")
            .arg(&metadata.name)
            .arg("--version")
            .arg(&metadata.version)
            .arg(path_arg(mapping.root()));
        run(ctx, cmd).await.map_err(|e| failed(e.to_string()))?;

        let text = fs::read_to_string(&template)
            .await
            .map_err(|e| failed(format!("cannot read {}: {e}", template.display())))?;
        let messages = Catalog::parse(&text)
            .map_err(|e| failed(format!("invalid template {}: {e}", template.display())))?
            .entries()
            .count();

        Ok(ExtractSummary { template, messages })
    }

    async fn init(&self, ctx: &BuildContext, locale: &str) -> Result<InitOutcome, Error> {
        let config = ctx.config();
        let target = config.catalog_path(ctx.root(), locale);
        if fs::try_exists(&target).await.unwrap_or(false) {
            return Ok(InitOutcome::Skipped(target));
        }

        let mut cmd = Self::command(ctx, "init");
        cmd.arg("-i")
            .arg(path_arg(&config.template_path(ctx.root())))
            .arg("-d")
            .arg(path_arg(&config.locale_path(ctx.root())))
            .arg("-l")
            .arg(locale)
            .arg("-D")
            .arg(&config.catalog.domain);
        run(ctx, cmd)
            .await
            .map_err(|e| BuildError::CatalogInitFailed {
                locale: locale.to_string(),
                message: e.to_string(),
            })?;

        Ok(InitOutcome::Created(target))
    }

    async fn compile(&self, ctx: &BuildContext) -> Result<Vec<PathBuf>, Error> {
        let config = ctx.config();
        let mut cmd = Self::command(ctx, "compile");
        cmd.arg("-d")
            .arg(path_arg(&config.locale_path(ctx.root())))
            .arg("-D")
            .arg(&config.catalog.domain);
        run(ctx, cmd)
            .await
            .map_err(|e| BuildError::CatalogCompileFailed {
                message: e.to_string(),
            })?;

        let mut compiled = Vec::new();
        for locale in &config.catalog.locales {
            let mo_path = config.catalog_path(ctx.root(), locale).with_extension("mo");
            if fs::try_exists(&mo_path).await.unwrap_or(false) {
                compiled.push(mo_path);
            }
        }
        Ok(compiled)
    }
}
