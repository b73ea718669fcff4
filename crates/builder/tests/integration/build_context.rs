//! Build context construction

use super::common::Harness;
use webdist_builder::BuildContextBuilder;
use webdist_config::{CatalogBackend, Config, RuleConfig};
use webdist_errors::{BuildError, Error};
use webdist_manifest::assemble_metadata;
use webdist_types::SourceKind;

#[tokio::test]
async fn missing_components_are_named() {
    let err = BuildContextBuilder::new()
        .with_config(Config::default())
        .build()
        .unwrap_err();
    match err {
        Error::Build(BuildError::MissingComponent { component }) => {
            assert_eq!(component, "project root");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = BuildContextBuilder::new()
        .with_root("/tmp")
        .with_config(Config::default())
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Build(BuildError::MissingComponent { ref component }) if component == "package metadata"
    ));
}

#[tokio::test]
async fn backend_follows_configuration() {
    let h = Harness::new();
    let mut config = Config::default();
    let metadata = assemble_metadata(&config, h.root()).await.unwrap();

    let native = BuildContextBuilder::new()
        .with_root(h.root())
        .with_config(config.clone())
        .with_metadata(metadata.clone())
        .build()
        .unwrap();
    assert_eq!(native.catalog().name(), "native");

    config.catalog.backend = CatalogBackend::Babel;
    let babel = BuildContextBuilder::new()
        .with_root(h.root())
        .with_config(config)
        .with_metadata(metadata)
        .build()
        .unwrap();
    assert_eq!(babel.catalog().name(), "babel");
    assert_eq!(babel.metadata().dist_stem(), "pyload.webui-0.1.0");
}

#[tokio::test]
async fn invalid_mapping_pattern_rejected_at_build() {
    let h = Harness::new();
    let mut config = Config::default();
    config.catalog.mapping.rules.push(RuleConfig {
        pattern: "scripts/[".to_string(),
        kind: SourceKind::Javascript,
    });
    let metadata = assemble_metadata(&config, h.root()).await.unwrap();

    let err = BuildContextBuilder::new()
        .with_root(h.root())
        .with_config(config)
        .with_metadata(metadata)
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Build(BuildError::InvalidPattern { .. })
    ));
}
