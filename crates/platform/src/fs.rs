//! Filesystem convenience helpers.
//!
//! These functions encode the tolerance rules the build stages rely on and
//! report every other failure as `PlatformError::FilesystemOperationFailed`.

use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use webdist_errors::PlatformError;

/// Result type for filesystem operations
pub type Result<T> = std::result::Result<T, PlatformError>;

fn failed(operation: &str, path: &Path, err: &std::io::Error) -> PlatformError {
    PlatformError::FilesystemOperationFailed {
        operation: operation.to_string(),
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Create a single directory, treating an existing one as success
///
/// Returns `true` when the directory was created by this call. Parents are
/// not created; a missing parent is an error.
///
/// # Errors
///
/// Returns an error for any failure other than `AlreadyExists`.
pub async fn ensure_dir(path: &Path) -> Result<bool> {
    match fs::create_dir(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(failed("create_dir", path, &e)),
    }
}

/// Create a directory and all of its parents
///
/// # Errors
///
/// Returns an error if any component cannot be created.
pub async fn ensure_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| failed("create_dir_all", path, &e))
}

/// Remove a directory tree, treating a missing directory as success
///
/// Returns `true` when something was removed.
///
/// # Errors
///
/// Returns an error for any failure other than `NotFound`.
pub async fn remove_dir_all_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(failed("remove_dir_all", path, &e)),
    }
}

/// Whether `path` exists and is a directory
pub async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}
