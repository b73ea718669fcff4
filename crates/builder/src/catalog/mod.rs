//! Message catalog backends
//!
//! Configure depends only on [`CatalogTool`]; which implementation runs is
//! decided once when the build context is created.

pub mod babel;
pub mod native;

use async_trait::async_trait;
use globset::{GlobBuilder, GlobMatcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use webdist_config::{CatalogBackend, MappingConfig};
use webdist_errors::{BuildError, Error};
use webdist_types::SourceKind;

use crate::context::BuildContext;

/// Result of a successful extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Template written (`<locale_dir>/<domain>.pot`)
    pub template: PathBuf,
    /// Distinct messages in the template
    pub messages: usize,
}

/// What `init` did for one locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// A new catalog was written from the template
    Created(PathBuf),
    /// A catalog already existed and was left untouched
    Skipped(PathBuf),
}

impl InitOutcome {
    /// The catalog path in either case
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(path) | Self::Skipped(path) => path,
        }
    }
}

/// Extract, initialize and compile message catalogs
///
/// Every failure is a mandatory step failure for the caller.
#[async_trait]
pub trait CatalogTool: Send + Sync {
    /// Backend name for logs and events
    fn name(&self) -> &'static str;

    /// Scan the mapping root and write the template
    async fn extract(
        &self,
        ctx: &BuildContext,
        mapping: &ExtractionMapping,
    ) -> Result<ExtractSummary, Error>;

    /// Create the catalog for `locale` from the template unless it exists
    async fn init(&self, ctx: &BuildContext, locale: &str) -> Result<InitOutcome, Error>;

    /// Compile every locale catalog; returns the written binary catalogs
    async fn compile(&self, ctx: &BuildContext) -> Result<Vec<PathBuf>, Error>;
}

/// Instantiate the backend named in configuration
#[must_use]
pub fn tool_for_backend(backend: CatalogBackend) -> Arc<dyn CatalogTool> {
    match backend {
        CatalogBackend::Native => Arc::new(native::NativeCatalogTool::new()),
        CatalogBackend::Babel => Arc::new(babel::BabelCatalogTool::new()),
    }
}

/// One `pattern -> kind` rule with its compiled matcher
#[derive(Debug, Clone)]
pub struct ExtractionRule {
    pattern: String,
    kind: SourceKind,
    matcher: GlobMatcher,
}

impl ExtractionRule {
    /// Compile a rule; `*` does not cross `/`, `**` does
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidPattern` if the glob does not parse.
    pub fn new(pattern: impl Into<String>, kind: SourceKind) -> Result<Self, Error> {
        let pattern = pattern.into();
        let matcher = GlobBuilder::new(&pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| BuildError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?
            .compile_matcher();
        Ok(Self {
            pattern,
            kind,
            matcher,
        })
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn kind(&self) -> SourceKind {
        self.kind
    }
}

/// Which files under `root` contribute translatable strings, and how
#[derive(Debug, Clone)]
pub struct ExtractionMapping {
    root: PathBuf,
    rules: Vec<ExtractionRule>,
}

impl ExtractionMapping {
    /// Build a mapping from rules in priority order
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidPattern` for the first invalid glob.
    pub fn new<I, S>(root: impl Into<PathBuf>, rules: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (S, SourceKind)>,
        S: Into<String>,
    {
        let rules = rules
            .into_iter()
            .map(|(pattern, kind)| ExtractionRule::new(pattern, kind))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            root: root.into(),
            rules,
        })
    }

    /// Build the mapping described by the `[catalog.mapping]` section
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidPattern` for the first invalid glob.
    pub fn from_config(config: &MappingConfig) -> Result<Self, Error> {
        Self::new(
            config.root.clone(),
            config.rules.iter().map(|r| (r.pattern.clone(), r.kind)),
        )
    }

    /// Root directory, relative to the project root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    /// Kind of the first rule matching `relative` (a `/`-separated path
    /// under the mapping root), if any
    #[must_use]
    pub fn classify(&self, relative: &str) -> Option<SourceKind> {
        self.rules
            .iter()
            .find(|rule| rule.matcher.is_match(relative))
            .map(|rule| rule.kind)
    }
}
