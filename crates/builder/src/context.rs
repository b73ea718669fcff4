//! Build context shared by every stage

use std::path::{Path, PathBuf};
use std::sync::Arc;
use webdist_config::Config;
use webdist_errors::{BuildError, Error};
use webdist_events::{EventEmitter, EventSender};
use webdist_manifest::PackageMetadata;
use webdist_platform::{PlatformContext, ProcessOperations, TokioProcessOperations};

use crate::catalog::{tool_for_backend, CatalogTool, ExtractionMapping};

/// Everything a stage needs, built once and passed by reference
///
/// The project root is the working directory for every tool invocation.
pub struct BuildContext {
    root: PathBuf,
    config: Config,
    metadata: PackageMetadata,
    mapping: ExtractionMapping,
    process: Arc<dyn ProcessOperations>,
    catalog: Arc<dyn CatalogTool>,
    event_sender: Option<EventSender>,
    platform: PlatformContext,
}

impl EventEmitter for BuildContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl BuildContext {
    // No public constructor - use BuildContextBuilder instead

    /// Project root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loaded configuration
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Assembled package metadata
    #[must_use]
    pub fn metadata(&self) -> &PackageMetadata {
        &self.metadata
    }

    /// Message extraction mapping
    #[must_use]
    pub fn mapping(&self) -> &ExtractionMapping {
        &self.mapping
    }

    /// Process backend
    #[must_use]
    pub fn process(&self) -> &dyn ProcessOperations {
        &*self.process
    }

    /// Catalog backend
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogTool {
        &*self.catalog
    }

    /// Context handed to platform operations
    #[must_use]
    pub fn platform(&self) -> &PlatformContext {
        &self.platform
    }
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("root", &self.root)
            .field("package", &self.metadata.dist_stem())
            .field("catalog", &self.catalog.name())
            .finish_non_exhaustive()
    }
}

/// Builder for [`BuildContext`]
#[derive(Default)]
pub struct BuildContextBuilder {
    root: Option<PathBuf>,
    config: Option<Config>,
    metadata: Option<PackageMetadata>,
    process: Option<Arc<dyn ProcessOperations>>,
    catalog: Option<Arc<dyn CatalogTool>>,
    event_sender: Option<EventSender>,
}

impl BuildContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set project root
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set package metadata
    #[must_use]
    pub fn with_metadata(mut self, metadata: PackageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set process backend (defaults to real child processes)
    #[must_use]
    pub fn with_process_ops(mut self, process: Arc<dyn ProcessOperations>) -> Self {
        self.process = Some(process);
        self
    }

    /// Set catalog backend (defaults to the one named by `catalog.backend`)
    #[must_use]
    pub fn with_catalog_tool(mut self, catalog: Arc<dyn CatalogTool>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.event_sender = Some(tx);
        self
    }

    /// Build the context
    ///
    /// # Errors
    ///
    /// Returns an error if the root, configuration or metadata is missing,
    /// or if an extraction pattern is not a valid glob.
    pub fn build(self) -> Result<BuildContext, Error> {
        let root = self.root.ok_or_else(|| BuildError::MissingComponent {
            component: "project root".to_string(),
        })?;

        let config = self.config.ok_or_else(|| BuildError::MissingComponent {
            component: "configuration".to_string(),
        })?;

        let metadata = self.metadata.ok_or_else(|| BuildError::MissingComponent {
            component: "package metadata".to_string(),
        })?;

        let mapping = ExtractionMapping::from_config(&config.catalog.mapping)?;

        let process = self
            .process
            .unwrap_or_else(|| Arc::new(TokioProcessOperations::new()));
        let catalog = self
            .catalog
            .unwrap_or_else(|| tool_for_backend(config.catalog.backend));

        let platform = PlatformContext::new(self.event_sender.clone());

        Ok(BuildContext {
            root,
            config,
            metadata,
            mapping,
            process,
            catalog,
            event_sender: self.event_sender,
            platform,
        })
    }
}
