//! Build stages and the registry that dispatches them
//!
//! The set of stages is closed; [`Stage::execute`] is a plain `match`. Stages
//! that depend on another stage call it by name through the registry so the
//! dependency is observable in events.

mod compile;
mod configure;
mod get_catalog;
mod registry;
mod sdist;

pub use registry::StageRegistry;

use std::fmt;
use std::str::FromStr;
use webdist_errors::{BuildError, Error};
use webdist_types::StageReport;

use crate::context::BuildContext;

/// A named packaging stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Best-effort web interface build
    Compile,
    /// Compile, then produce the message catalogs
    Configure,
    /// Remote catalog download (not available)
    GetCatalog,
    /// Configure, then write the source archive
    Sdist,
}

impl Stage {
    /// All stages in default registration order
    pub const ALL: [Stage; 4] = [
        Stage::Compile,
        Stage::Configure,
        Stage::GetCatalog,
        Stage::Sdist,
    ];

    /// Registered name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Configure => "configure",
            Self::GetCatalog => "get_catalog",
            Self::Sdist => "sdist",
        }
    }

    /// One-line description for listings
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Compile => "compile the web user interface",
            Self::Configure => "configure the package",
            Self::GetCatalog => "download the translation catalog from the remote repository",
            Self::Sdist => "create a source distribution (tarball)",
        }
    }

    /// Run this stage
    ///
    /// # Errors
    ///
    /// Returns the stage's failure; see each stage module for which steps
    /// are mandatory.
    pub async fn execute(
        self,
        registry: &StageRegistry,
        ctx: &BuildContext,
    ) -> Result<StageReport, Error> {
        match self {
            Self::Compile => compile::run(ctx).await,
            Self::Configure => configure::run(registry, ctx).await,
            Self::GetCatalog => get_catalog::run(ctx),
            Self::Sdist => sdist::run(registry, ctx).await,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|stage| stage.name() == normalized)
            .ok_or_else(|| BuildError::UnknownStage {
                name: s.to_string(),
            })
    }
}
