#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]
//! Build stages for webdist
//!
//! This crate holds the stage registry and the four stages it dispatches
//! (asset compile, configure, remote catalog, source archive), the message
//! catalog backends used by configure, and the deterministic archive writer
//! used by the source archive stage.

pub mod catalog;
mod context;
mod packaging;
pub mod stages;
mod utils;

pub use catalog::{
    babel::BabelCatalogTool, native::NativeCatalogTool, tool_for_backend, CatalogTool,
    ExtractSummary, ExtractionMapping, ExtractionRule, InitOutcome,
};
pub use context::{BuildContext, BuildContextBuilder};
pub use packaging::{
    archive::get_deterministic_timestamp, create_source_archive, ArchiveSummary,
};
pub use stages::{Stage, StageRegistry};
pub use webdist_types::StageReport;
