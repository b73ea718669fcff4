//! Project setup: root resolution, configuration and build context

use crate::cli::GlobalArgs;
use crate::error::CliError;
use std::path::PathBuf;
use tracing::{debug, info};
use webdist_builder::{BuildContext, BuildContextBuilder};
use webdist_config::Config;
use webdist_events::EventSender;
use webdist_manifest::{assemble_metadata, PackageMetadata};
use webdist_types::ColorChoice;

/// Resolve the project root from `--root` or the working directory
pub fn resolve_root(global: &GlobalArgs) -> Result<PathBuf, CliError> {
    let root = match &global.root {
        Some(root) => root.clone(),
        None => std::env::current_dir()?,
    };
    if !root.is_dir() {
        return Err(CliError::Setup(format!(
            "project root {} is not a directory",
            root.display()
        )));
    }
    Ok(root)
}

/// Loaded project: where it lives and how it is configured
pub struct ProjectSetup {
    root: PathBuf,
    config: Config,
}

impl ProjectSetup {
    /// Load configuration with precedence defaults < file < env < CLI flags
    pub async fn load(root: PathBuf, global: &GlobalArgs) -> Result<Self, CliError> {
        let mut config = Config::load_or_default(&root, global.config.as_deref())
            .await
            .map_err(CliError::config)?;
        config.merge_env().map_err(CliError::config)?;
        if let Some(color) = global.color {
            config.general.color = color;
        }

        info!(root = %root.display(), backend = %config.catalog.backend, "project loaded");
        Ok(Self { root, config })
    }

    /// Whether console output should be colored
    pub fn colors_enabled(&self) -> bool {
        match self.config.general.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => console::Term::stdout().features().colors_supported(),
        }
    }

    /// Read VERSION and the requirement files into package metadata
    pub async fn metadata(&self) -> Result<PackageMetadata, CliError> {
        Ok(assemble_metadata(&self.config, &self.root).await?)
    }

    /// Build the context every stage runs against
    pub async fn build_context(&self, event_sender: EventSender) -> Result<BuildContext, CliError> {
        let metadata = self.metadata().await?;
        debug!(stem = %metadata.dist_stem(), "building stage context");
        let ctx = BuildContextBuilder::new()
            .with_root(self.root.clone())
            .with_config(self.config.clone())
            .with_metadata(metadata)
            .with_event_sender(event_sender)
            .build()?;
        Ok(ctx)
    }
}
