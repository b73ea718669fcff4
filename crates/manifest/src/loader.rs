//! Version and requirement resource files
//!
//! Files are re-read on every call; nothing is cached.

use std::io::ErrorKind;
use std::path::Path;
use webdist_config::constants::{REQUIREMENTS_DIR, REQUIREMENTS_EXT, VERSION_FILE};
use webdist_errors::{Error, PackageError};

async fn read_resource(path: &Path) -> Result<String, Error> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        let path = path.display().to_string();
        match e.kind() {
            ErrorKind::NotFound => PackageError::MissingResource { path },
            _ => PackageError::UnreadableResource {
                path,
                message: e.to_string(),
            },
        }
        .into()
    })
}

/// Read `<root>/VERSION` with surrounding whitespace removed
///
/// # Errors
///
/// Returns `PackageError::MissingResource` if the file does not exist and
/// `PackageError::UnreadableResource` if it cannot be read as UTF-8 text.
pub async fn get_version(root: &Path) -> Result<String, Error> {
    let content = read_resource(&root.join(VERSION_FILE)).await?;
    Ok(content.trim().to_string())
}

/// Read `<root>/requirements/<category>.txt` as one entry per line
///
/// Blank lines are kept as empty entries, in file order.
///
/// # Errors
///
/// Returns `PackageError::MissingResource` if the file does not exist,
/// `PackageError::UnreadableResource` if it cannot be read, and
/// `PackageError::InvalidMetadata` if the category is not a plain file stem.
pub async fn get_requires(root: &Path, category: &str) -> Result<Vec<String>, Error> {
    if category.is_empty() || category.contains(['/', '\\']) || category == ".." {
        return Err(PackageError::InvalidMetadata {
            field: "requirements category".to_string(),
            message: format!("'{category}' is not a file name"),
        }
        .into());
    }

    let path = root
        .join(REQUIREMENTS_DIR)
        .join(format!("{category}.{REQUIREMENTS_EXT}"));
    let content = read_resource(&path).await?;
    Ok(split_requirement_lines(&content))
}

/// Split on `\n` or `\r\n`; a trailing line break does not add an entry
#[must_use]
pub fn split_requirement_lines(content: &str) -> Vec<String> {
    content.lines().map(ToString::to_string).collect()
}
