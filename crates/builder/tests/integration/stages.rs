//! Individual stage behavior against fake backends

use super::common::{
    build_error, stage_trace, Harness, Outcome, DEV_INSTALL, GRUNT_BUILD, PRODUCTION_INSTALL,
};
use webdist_builder::StageRegistry;
use webdist_errors::BuildError;
use webdist_events::{AppEvent, StageEvent};

#[tokio::test]
async fn compile_runs_three_commands_and_removes_node_modules() {
    let h = Harness::new();
    let ctx = h.context(h.process(), h.fake_catalog(None)).await;

    let report = StageRegistry::with_defaults()
        .run(&ctx, "compile")
        .await
        .unwrap();

    assert_eq!(h.calls(), vec![DEV_INSTALL, GRUNT_BUILD, PRODUCTION_INSTALL]);
    assert_eq!(report.exit_code, 0);
    assert!(report.is_clean());
    assert!(!h.root().join("pyload/webui/node_modules").exists());
}

#[tokio::test]
async fn compile_dev_install_failure_skips_grunt_but_not_production() {
    let mut h = Harness::new();
    let process = h.process().with_outcome(DEV_INSTALL, Outcome::Exit(1));
    let ctx = h.context(process, h.fake_catalog(None)).await;

    let report = StageRegistry::with_defaults()
        .run(&ctx, "compile")
        .await
        .unwrap();

    assert_eq!(h.calls(), vec![DEV_INSTALL, PRODUCTION_INSTALL]);
    assert_eq!(report.exit_code, 0);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].starts_with("Failed to compile webui"));

    let degraded: Vec<String> = h
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            AppEvent::Stage(StageEvent::StepDegraded { step, .. }) => Some(step),
            _ => None,
        })
        .collect();
    assert_eq!(degraded, vec!["dev_install"]);
}

#[tokio::test]
async fn compile_grunt_spawn_failure_is_degraded() {
    let h = Harness::new();
    let process = h.process().with_outcome(GRUNT_BUILD, Outcome::SpawnFailure);
    let ctx = h.context(process, h.fake_catalog(None)).await;

    let report = StageRegistry::with_defaults()
        .run(&ctx, "compile")
        .await
        .unwrap();

    assert_eq!(h.calls(), vec![DEV_INSTALL, GRUNT_BUILD, PRODUCTION_INSTALL]);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.exit_code, 0);
}

#[tokio::test]
async fn compile_reports_production_exit_code() {
    let h = Harness::new();
    let process = h.process().with_outcome(PRODUCTION_INSTALL, Outcome::Exit(3));
    let ctx = h.context(process, h.fake_catalog(None)).await;

    let report = StageRegistry::with_defaults()
        .run(&ctx, "compile")
        .await
        .unwrap();
    assert_eq!(report.exit_code, 3);
    // a non-zero final exit is a result, not a degraded step
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn compile_production_not_startable_is_127() {
    let h = Harness::new();
    let process = h
        .process()
        .with_outcome(PRODUCTION_INSTALL, Outcome::SpawnFailure);
    let ctx = h.context(process, h.fake_catalog(None)).await;

    let report = StageRegistry::with_defaults()
        .run(&ctx, "compile")
        .await
        .unwrap();
    assert_eq!(report.exit_code, 127);
    assert_eq!(report.warnings.len(), 1);
}

#[tokio::test]
async fn compile_production_killed_by_signal_is_minus_one() {
    let h = Harness::new();
    let process = h.process().with_outcome(PRODUCTION_INSTALL, Outcome::Signal);
    let ctx = h.context(process, h.fake_catalog(None)).await;

    let report = StageRegistry::with_defaults()
        .run(&ctx, "compile")
        .await
        .unwrap();
    assert_eq!(report.exit_code, -1);
}

#[tokio::test]
async fn compile_without_asset_directory_degrades_before_any_command() {
    let mut h = Harness::new();
    std::fs::remove_dir_all(h.root().join("pyload/webui")).unwrap();
    let ctx = h.context(h.process(), h.fake_catalog(None)).await;

    let report = StageRegistry::with_defaults()
        .run(&ctx, "compile")
        .await
        .unwrap();

    assert_eq!(report.exit_code, 1);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("asset directory unavailable"));
    assert!(h.calls().is_empty());

    let events = h.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        AppEvent::Stage(StageEvent::StepDegraded { step, .. }) if step == "asset_directory"
    )));
    assert_eq!(
        stage_trace(&events),
        vec![
            ("started".to_string(), "compile".to_string()),
            ("completed".to_string(), "compile".to_string()),
        ]
    );
}

#[tokio::test]
async fn compile_with_file_at_asset_path_degrades() {
    let mut h = Harness::new();
    let webui = h.root().join("pyload/webui");
    std::fs::remove_dir_all(&webui).unwrap();
    std::fs::write(&webui, b"").unwrap();
    let ctx = h.context(h.process(), h.fake_catalog(None)).await;

    let report = StageRegistry::with_defaults()
        .run(&ctx, "compile")
        .await
        .unwrap();

    assert_eq!(report.exit_code, 1);
    assert!(report.warnings[0].contains("not a directory"));
    assert!(h.calls().is_empty());
}

#[tokio::test]
async fn get_catalog_always_fails_without_side_effects() {
    let h = Harness::new();
    let ctx = h.context(h.process(), h.fake_catalog(None)).await;

    let err = StageRegistry::with_defaults()
        .run(&ctx, "get_catalog")
        .await
        .unwrap_err();

    match build_error(&err) {
        BuildError::UnimplementedFeature { feature } => assert_eq!(feature, "get_catalog"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(h.calls().is_empty());
    assert!(!h.root().join("locale").exists());
}

#[tokio::test]
async fn unknown_stage_is_reported_without_events() {
    let mut h = Harness::new();
    let ctx = h.context(h.process(), h.fake_catalog(None)).await;

    let err = StageRegistry::with_defaults()
        .run(&ctx, "bdist_wheel")
        .await
        .unwrap_err();

    match build_error(&err) {
        BuildError::UnknownStage { name } => assert_eq!(name, "bdist_wheel"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(stage_trace(&h.drain_events()).is_empty());
}
