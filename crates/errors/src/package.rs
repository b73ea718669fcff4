//! Package metadata error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PackageError {
    #[error("missing resource file: {path}")]
    MissingResource { path: String },

    #[error("unreadable resource file {path}: {message}")]
    UnreadableResource { path: String, message: String },

    #[error("invalid metadata field {field}: {message}")]
    InvalidMetadata { field: String, message: String },
}

impl UserFacingError for PackageError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingResource { .. } => Some(
                "Create the VERSION file and requirements/<category>.txt files at the project root.",
            ),
            Self::InvalidMetadata { .. } => Some("Fix the [package] section in webdist.toml."),
            Self::UnreadableResource { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::MissingResource { .. } => "package.missing_resource",
            Self::UnreadableResource { .. } => "package.unreadable_resource",
            Self::InvalidMetadata { .. } => "package.invalid_metadata",
        };
        Some(code)
    }
}
