//! Configure and sdist through the registry, with fake and native catalogs

use super::common::{
    build_error, stage_trace, Harness, Outcome, DEV_INSTALL, GRUNT_BUILD, PRODUCTION_INSTALL,
};
use std::path::Path;
use tokio::io::AsyncReadExt;
use webdist_builder::{catalog::native::mo::read_mo, StageRegistry};
use webdist_config::Config;
use webdist_errors::BuildError;
use webdist_events::{AppEvent, CatalogEvent};

fn pairs(trace: &[(&str, &str)]) -> Vec<(String, String)> {
    trace
        .iter()
        .map(|(kind, stage)| ((*kind).to_string(), (*stage).to_string()))
        .collect()
}

async fn archive_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
    use async_compression::tokio::bufread::GzipDecoder;
    use std::io::Read;

    let compressed = tokio::fs::read(path).await.unwrap();
    let mut decoder = GzipDecoder::new(&compressed[..]);
    let mut tar_bytes = Vec::new();
    decoder.read_to_end(&mut tar_bytes).await.unwrap();

    let mut archive = tar::Archive::new(&tar_bytes[..]);
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().into_owned();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            (name, data)
        })
        .collect()
}

#[tokio::test]
async fn configure_runs_compile_then_catalog_steps_in_order() {
    let mut h = Harness::new();
    let ctx = h.context(h.process(), h.fake_catalog(None)).await;

    let report = StageRegistry::with_defaults()
        .run(&ctx, "configure")
        .await
        .unwrap();

    assert_eq!(
        h.calls(),
        vec![
            DEV_INSTALL,
            GRUNT_BUILD,
            PRODUCTION_INSTALL,
            "catalog extract",
            "catalog init en",
            "catalog compile",
        ]
    );
    assert!(h.root().join("locale").is_dir());
    assert_eq!(report.artifacts.len(), 2);
    assert_eq!(
        stage_trace(&h.drain_events()),
        pairs(&[
            ("started", "configure"),
            ("started", "compile"),
            ("completed", "compile"),
            ("completed", "configure"),
        ])
    );
}

#[tokio::test]
async fn configure_ignores_compile_exit_code_and_degradation() {
    let h = Harness::new();
    let process = h
        .process()
        .with_outcome(DEV_INSTALL, Outcome::Exit(1))
        .with_outcome(PRODUCTION_INSTALL, Outcome::Exit(1));
    let ctx = h.context(process, h.fake_catalog(None)).await;

    let report = StageRegistry::with_defaults()
        .run(&ctx, "configure")
        .await
        .unwrap();

    assert_eq!(report.exit_code, 0);
    assert_eq!(report.warnings.len(), 1);
    assert!(h.calls().contains(&"catalog compile".to_string()));
}

#[tokio::test]
async fn configure_stops_at_failed_extraction() {
    let h = Harness::new();
    let ctx = h.context(h.process(), h.fake_catalog(Some("extract"))).await;

    let err = StageRegistry::with_defaults()
        .run(&ctx, "configure")
        .await
        .unwrap_err();

    assert!(matches!(
        build_error(&err),
        BuildError::ExtractionFailed { .. }
    ));
    assert!(build_error(&err).is_mandatory_step_failure());
    let calls = h.calls();
    assert_eq!(calls.last().map(String::as_str), Some("catalog extract"));
    assert!(!calls.iter().any(|c| c.starts_with("catalog init")));
}

#[tokio::test]
async fn configure_init_failure_names_the_locale() {
    let h = Harness::new();
    let ctx = h.context(h.process(), h.fake_catalog(Some("init"))).await;

    let err = StageRegistry::with_defaults()
        .run(&ctx, "configure")
        .await
        .unwrap_err();

    match build_error(&err) {
        BuildError::CatalogInitFailed { locale, message } => {
            assert_eq!(locale, "en");
            assert!(message.contains("fake init failure"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!h.calls().contains(&"catalog compile".to_string()));
}

#[tokio::test]
async fn configure_compile_catalog_failure_is_mandatory() {
    let h = Harness::new();
    let ctx = h.context(h.process(), h.fake_catalog(Some("compile"))).await;

    let err = StageRegistry::with_defaults()
        .run(&ctx, "configure")
        .await
        .unwrap_err();
    assert!(matches!(
        build_error(&err),
        BuildError::CatalogCompileFailed { .. }
    ));
}

#[tokio::test]
async fn configure_locale_path_occupied_by_file_fails_at_extraction() {
    let h = Harness::new();
    std::fs::write(h.root().join("locale"), b"not a directory").unwrap();
    let ctx = h.context(h.process(), h.native_catalog()).await;

    let err = StageRegistry::with_defaults()
        .run(&ctx, "configure")
        .await
        .unwrap_err();

    match build_error(&err) {
        BuildError::ExtractionFailed { message } => assert!(message.contains("messages.pot")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(h.root().join("locale").is_file());
}

#[tokio::test]
async fn configure_locale_dir_without_parent_fails() {
    let h = Harness::new();
    let mut config = Config::default();
    config.paths.locale_dir = "missing/locale".into();
    let ctx = h
        .context_with_config(h.process(), h.fake_catalog(None), config)
        .await;

    let err = StageRegistry::with_defaults()
        .run(&ctx, "configure")
        .await
        .unwrap_err();

    assert!(matches!(
        build_error(&err),
        BuildError::LocaleDirectoryFailed { .. }
    ));
    assert!(!h.calls().iter().any(|c| c.starts_with("catalog")));
}

#[tokio::test]
async fn configure_without_asset_directory_still_builds_catalogs() {
    let mut h = Harness::new();
    std::fs::remove_dir_all(h.root().join("pyload/webui")).unwrap();
    let ctx = h.context(h.process(), h.fake_catalog(None)).await;

    let report = StageRegistry::with_defaults()
        .run(&ctx, "configure")
        .await
        .unwrap();

    assert_eq!(
        h.calls(),
        vec!["catalog extract", "catalog init en", "catalog compile"]
    );
    assert_eq!(report.exit_code, 0);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(
        stage_trace(&h.drain_events()),
        pairs(&[
            ("started", "configure"),
            ("started", "compile"),
            ("completed", "compile"),
            ("completed", "configure"),
        ])
    );
}

#[tokio::test]
async fn configure_with_native_catalog_twice() {
    let mut h = Harness::new();
    let ctx = h.context(h.process(), h.native_catalog()).await;
    let registry = StageRegistry::with_defaults();

    registry.run(&ctx, "configure").await.unwrap();
    let po = h.root().join("locale/en/LC_MESSAGES/messages.po");
    let mo = po.with_extension("mo");
    assert!(po.is_file());
    assert!(mo.is_file());

    let template = std::fs::read_to_string(h.root().join("locale/messages.pot")).unwrap();
    assert!(template.contains("#: pyload/__init__.py:1"));
    assert!(template.contains("msgid \"Hello\""));
    assert!(template.contains("msgid_plural \"%d files\""));
    assert!(template.contains("msgid \"Save\""));

    // translate one entry; the second run must keep it
    let translated = std::fs::read_to_string(&po)
        .unwrap()
        .replace("msgid \"Hello\"\nmsgstr \"\"", "msgid \"Hello\"\nmsgstr \"Hi\"");
    std::fs::write(&po, translated).unwrap();
    h.drain_events();

    registry.run(&ctx, "configure").await.unwrap();
    let skipped = h.drain_events().into_iter().any(|e| {
        matches!(e, AppEvent::Catalog(CatalogEvent::LocaleSkipped { ref locale, .. }) if locale == "en")
    });
    assert!(skipped);

    let entries = read_mo(&std::fs::read(&mo).unwrap()).unwrap();
    assert_eq!(entries[0].0, "");
    assert!(entries.contains(&("Hello".to_string(), "Hi".to_string())));
}

#[tokio::test]
async fn sdist_writes_archive_with_generated_metadata() {
    let mut h = Harness::new();
    let ctx = h.context(h.process(), h.native_catalog()).await;
    let registry = StageRegistry::with_defaults();

    let report = registry.run(&ctx, "sdist").await.unwrap();
    let archive = h.root().join("dist/pyload.webui-0.1.0.tar.gz");
    assert_eq!(report.artifacts, vec![archive.clone()]);

    let entries = archive_entries(&archive).await;
    let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names[0], "pyload.webui-0.1.0/");
    assert_eq!(names[1], "pyload.webui-0.1.0/PKG-INFO");
    assert!(names.contains(&"pyload.webui-0.1.0/VERSION"));
    assert!(names.contains(&"pyload.webui-0.1.0/pyload/__init__.py"));
    assert!(names.contains(&"pyload.webui-0.1.0/locale/en/LC_MESSAGES/messages.mo"));
    assert!(!names.iter().any(|n| n.contains("node_modules")));

    let pkg_info = String::from_utf8(entries[1].1.clone()).unwrap();
    assert!(pkg_info.contains("Name: pyload.webui"));
    assert!(pkg_info.contains("Version: 0.1.0"));
    assert!(pkg_info.contains("Requires-Dist: six"));

    let trace = stage_trace(&h.drain_events());
    assert_eq!(trace.first(), Some(&("started".to_string(), "sdist".to_string())));
    assert_eq!(trace.last(), Some(&("completed".to_string(), "sdist".to_string())));

    // a second run replaces the archive in place
    registry.run(&ctx, "sdist").await.unwrap();
    let leftovers: Vec<_> = std::fs::read_dir(h.root().join("dist"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 1);
}

#[tokio::test]
async fn sdist_without_mapping_root_writes_nothing() {
    let h = Harness::new();
    let mut config = Config::default();
    config.catalog.mapping.root = "not-there".into();
    let ctx = h
        .context_with_config(h.process(), h.native_catalog(), config)
        .await;

    let err = StageRegistry::with_defaults()
        .run(&ctx, "sdist")
        .await
        .unwrap_err();

    assert!(matches!(
        build_error(&err),
        BuildError::ExtractionFailed { .. }
    ));
    // compile still ran first
    assert_eq!(h.calls(), vec![DEV_INSTALL, GRUNT_BUILD, PRODUCTION_INSTALL]);
    assert!(!h.root().join("dist").exists());
}

#[tokio::test]
async fn sdist_of_minimal_project() {
    let h = Harness::minimal();
    let ctx = h.context(h.process(), h.native_catalog()).await;

    let report = StageRegistry::with_defaults()
        .run(&ctx, "sdist")
        .await
        .unwrap();
    let archive = h.root().join("dist/pyload.webui-0.1.0.tar.gz");
    assert_eq!(report.artifacts, vec![archive.clone()]);
    assert!(h.calls().is_empty());

    let entries = archive_entries(&archive).await;
    let pkg_info = entries
        .iter()
        .find(|(name, _)| name == "pyload.webui-0.1.0/PKG-INFO")
        .map(|(_, data)| String::from_utf8(data.clone()).unwrap())
        .unwrap();
    assert!(pkg_info.contains("Version: 0.1.0"));

    let entry = |suffix: &str| {
        entries
            .iter()
            .find(|(name, _)| name.ends_with(suffix))
            .map(|(_, data)| data.clone())
            .unwrap()
    };
    let mo = entry("locale/en/LC_MESSAGES/messages.mo");
    assert_eq!(read_mo(&mo).unwrap()[0].0, "");
    let po = String::from_utf8(entry("locale/en/LC_MESSAGES/messages.po")).unwrap();
    assert!(po.contains("msgid \"Hello\""));
}
