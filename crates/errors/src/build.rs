//! Build pipeline error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum BuildError {
    #[error("build failed: {message}")]
    Failed { message: String },

    #[error("unknown stage: {name}")]
    UnknownStage { name: String },

    #[error("stage already registered: {name}")]
    DuplicateStage { name: String },

    #[error("{feature} is not implemented")]
    UnimplementedFeature { feature: String },

    #[error("asset directory unavailable: {path} - {message}")]
    AssetDirectoryUnavailable { path: String, message: String },

    #[error("failed to create locale directory {path}: {message}")]
    LocaleDirectoryFailed { path: String, message: String },

    #[error("message extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("catalog initialization failed for {locale}: {message}")]
    CatalogInitFailed { locale: String, message: String },

    #[error("catalog compilation failed: {message}")]
    CatalogCompileFailed { message: String },

    #[error("archive creation failed: {message}")]
    ArchiveFailed { message: String },

    #[error("invalid pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("build context is missing its {component}")]
    MissingComponent { component: String },
}

impl BuildError {
    /// Whether this error comes from a step whose failure must abort the
    /// enclosing pipeline (locale directory, extraction, catalog init/compile).
    #[must_use]
    pub fn is_mandatory_step_failure(&self) -> bool {
        matches!(
            self,
            Self::LocaleDirectoryFailed { .. }
                | Self::ExtractionFailed { .. }
                | Self::CatalogInitFailed { .. }
                | Self::CatalogCompileFailed { .. }
        )
    }
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::UnknownStage { .. } => Some("Run `webdist stages` to list the available stages."),
            Self::UnimplementedFeature { .. } => {
                Some("Use `webdist configure` to build the catalog from local sources.")
            }
            Self::AssetDirectoryUnavailable { .. } => {
                Some("Check `paths.webui_dir` in webdist.toml or run from the project root.")
            }
            Self::ExtractionFailed { .. } => {
                Some("Check the extraction mapping root and patterns in the [catalog] section.")
            }
            Self::CatalogInitFailed { .. } | Self::CatalogCompileFailed { .. } => {
                Some("Inspect the catalog files under the locale directory and fix invalid entries.")
            }
            Self::InvalidPattern { .. } => Some("Fix the glob pattern in webdist.toml."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Failed { .. } => "build.failed",
            Self::UnknownStage { .. } => "build.unknown_stage",
            Self::DuplicateStage { .. } => "build.duplicate_stage",
            Self::UnimplementedFeature { .. } => "build.unimplemented_feature",
            Self::AssetDirectoryUnavailable { .. } => "build.asset_directory_unavailable",
            Self::LocaleDirectoryFailed { .. } => "build.locale_directory_failed",
            Self::ExtractionFailed { .. } => "build.extraction_failed",
            Self::CatalogInitFailed { .. } => "build.catalog_init_failed",
            Self::CatalogCompileFailed { .. } => "build.catalog_compile_failed",
            Self::ArchiveFailed { .. } => "build.archive_failed",
            Self::InvalidPattern { .. } => "build.invalid_pattern",
            Self::MissingComponent { .. } => "build.missing_component",
        };
        Some(code)
    }
}
