//! Native and babel catalog backends

use super::common::{write, Harness, Outcome};
use std::sync::Arc;
use webdist_builder::{BabelCatalogTool, CatalogTool, InitOutcome, NativeCatalogTool};
use webdist_config::{CatalogBackend, Config, RuleConfig};
use webdist_errors::BuildError;
use webdist_platform::fs::ensure_dir;
use webdist_types::SourceKind;

#[tokio::test]
async fn native_extract_dedupes_and_skips_ignored_files() {
    let h = Harness::new();
    write(
        h.root(),
        "pyload/plugins/a.py",
        "x = _(\"Hello\")\ny = _(\"Other\")\n",
    );
    write(
        h.root(),
        "pyload/webui/app/scripts/vendor/lib.js",
        "gettext('Vendor');\n",
    );
    let mut config = Config::default();
    config
        .catalog
        .mapping
        .rules
        .insert(0, RuleConfig {
            pattern: "webui/app/scripts/vendor/**".to_string(),
            kind: SourceKind::Ignore,
        });
    let ctx = h
        .context_with_config(h.process(), h.native_catalog(), config)
        .await;
    ensure_dir(&ctx.config().locale_path(ctx.root())).await.unwrap();

    let tool = NativeCatalogTool::new();
    let summary = tool.extract(&ctx, ctx.mapping()).await.unwrap();
    // Hello, Other, "%d file", Save
    assert_eq!(summary.messages, 4);

    let pot = std::fs::read_to_string(&summary.template).unwrap();
    assert!(pot.contains("#: pyload/__init__.py:1\n#: pyload/plugins/a.py:1\nmsgid \"Hello\""));
    assert!(!pot.contains("Vendor"));
    assert!(pot.contains("Project-Id-Version: pyload.webui 0.1.0"));
    assert!(pot.contains("#, fuzzy"));
}

#[tokio::test]
async fn native_init_sets_language_and_skips_existing() {
    let h = Harness::new();
    let ctx = h.context(h.process(), h.native_catalog()).await;
    ensure_dir(&ctx.config().locale_path(ctx.root())).await.unwrap();

    let tool = NativeCatalogTool::new();
    tool.extract(&ctx, ctx.mapping()).await.unwrap();

    let created = tool.init(&ctx, "de").await.unwrap();
    assert!(matches!(created, InitOutcome::Created(_)));
    let po = std::fs::read_to_string(created.path()).unwrap();
    assert!(po.contains("\"Language: de\\n\""));
    assert!(po.contains("Plural-Forms: nplurals=2; plural=(n != 1);"));
    assert!(!po.contains("#, fuzzy"));

    std::fs::write(created.path(), "# hand edited\n").unwrap();
    let skipped = tool.init(&ctx, "de").await.unwrap();
    assert!(matches!(skipped, InitOutcome::Skipped(_)));
    assert_eq!(
        std::fs::read_to_string(skipped.path()).unwrap(),
        "# hand edited\n"
    );
}

#[tokio::test]
async fn native_init_without_template_fails_for_locale() {
    let h = Harness::new();
    let ctx = h.context(h.process(), h.native_catalog()).await;

    let err = NativeCatalogTool::new().init(&ctx, "fr").await.unwrap_err();
    match err.as_build() {
        Some(BuildError::CatalogInitFailed { locale, .. }) => assert_eq!(locale, "fr"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn native_compile_rejects_broken_catalog() {
    let h = Harness::new();
    let ctx = h.context(h.process(), h.native_catalog()).await;
    write(
        h.root(),
        "locale/en/LC_MESSAGES/messages.po",
        "msgid \"unterminated\nmsgstr \"\"\n",
    );

    let err = NativeCatalogTool::new().compile(&ctx).await.unwrap_err();
    assert!(matches!(
        err.as_build(),
        Some(BuildError::CatalogCompileFailed { .. })
    ));
}

#[tokio::test]
async fn native_compile_without_catalogs_fails() {
    let h = Harness::new();
    let ctx = h.context(h.process(), h.native_catalog()).await;
    std::fs::create_dir_all(h.root().join("locale")).unwrap();

    let err = NativeCatalogTool::new().compile(&ctx).await.unwrap_err();
    assert!(matches!(
        err.as_build(),
        Some(BuildError::CatalogCompileFailed { .. })
    ));
}

#[tokio::test]
async fn babel_runs_pybabel_commands() {
    let h = Harness::new();
    let mut config = Config::default();
    config.catalog.backend = CatalogBackend::Babel;
    let ctx = h
        .context_with_config(h.process(), Arc::new(BabelCatalogTool::new()), config)
        .await;
    // fake pybabel writes nothing; provide the template it would have produced
    write(
        h.root(),
        "locale/messages.pot",
        "msgid \"\"\nmsgstr \"\"\n\"Language: \\n\"\n\nmsgid \"Hello\"\nmsgstr \"\"\n",
    );

    let tool = BabelCatalogTool::new();
    let summary = tool.extract(&ctx, ctx.mapping()).await.unwrap();
    assert_eq!(summary.messages, 1);

    tool.init(&ctx, "en").await.unwrap();
    tool.compile(&ctx).await.unwrap();

    let calls = h.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].starts_with("pybabel extract -F "));
    assert!(calls[0].ends_with(" --project pyload.webui --version 0.1.0 pyload"));
    assert!(calls[1].starts_with("pybabel init -i "));
    assert!(calls[1].ends_with(" -l en -D messages"));
    assert!(calls[2].starts_with("pybabel compile -d "));
}

#[tokio::test]
async fn babel_missing_tool_fails_each_step_with_its_variant() {
    let h = Harness::new();
    let process = h
        .process()
        .with_program_outcome("pybabel", Outcome::SpawnFailure);
    let ctx = h.context(process, Arc::new(BabelCatalogTool::new())).await;
    let tool = BabelCatalogTool::new();

    let err = tool.extract(&ctx, ctx.mapping()).await.unwrap_err();
    assert!(matches!(
        err.as_build(),
        Some(BuildError::ExtractionFailed { .. })
    ));

    let err = tool.init(&ctx, "en").await.unwrap_err();
    assert!(matches!(
        err.as_build(),
        Some(BuildError::CatalogInitFailed { .. })
    ));

    let err = tool.compile(&ctx).await.unwrap_err();
    match err.as_build() {
        Some(BuildError::CatalogCompileFailed { message }) => {
            assert!(message.contains("failed to start pybabel compile"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn babel_non_zero_exit_is_mandatory_failure() {
    let h = Harness::new();
    let process = h
        .process()
        .with_program_outcome("pybabel", Outcome::Exit(2));
    let ctx = h.context(process, Arc::new(BabelCatalogTool::new())).await;

    let err = BabelCatalogTool::new().compile(&ctx).await.unwrap_err();
    assert!(err.as_build().is_some_and(BuildError::is_mandatory_step_failure));
}
