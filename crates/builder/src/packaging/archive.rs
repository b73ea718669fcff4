//! Deterministic TAR archive creation for reproducible source archives

use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use webdist_errors::{BuildError, Error};

use crate::utils::fileops::to_slash;

/// Default deterministic timestamp (Unix epoch) for reproducible builds
const DETERMINISTIC_TIMESTAMP: u64 = 0;

/// Environment variable for `SOURCE_DATE_EPOCH` (standard for reproducible builds)
const SOURCE_DATE_EPOCH_VAR: &str = "SOURCE_DATE_EPOCH";

/// Name of the generated metadata file at the top of the archive
pub const PKG_INFO_ENTRY: &str = "PKG-INFO";

fn archive_failed(message: impl std::fmt::Display) -> Error {
    BuildError::ArchiveFailed {
        message: message.to_string(),
    }
    .into()
}

/// What goes into one source archive
#[derive(Debug, Clone)]
pub struct ArchiveContents {
    /// Directory the relative `files` are read from
    pub source_root: PathBuf,
    /// Top-level directory inside the archive (`<name>-<version>`)
    pub prefix: String,
    /// Generated `PKG-INFO` text
    pub pkg_info: String,
    /// Files relative to `source_root`, sorted
    pub files: Vec<PathBuf>,
}

/// Create a deterministic tar archive
///
/// Returns the number of entries written.
///
/// # Errors
///
/// Returns `BuildError::ArchiveFailed` if a file cannot be read or the tar
/// cannot be written.
pub async fn create_deterministic_tar_archive(
    contents: ArchiveContents,
    tar_path: &Path,
) -> Result<usize, Error> {
    let deterministic_timestamp = get_deterministic_timestamp();
    create_deterministic_tar_archive_with_timestamp(contents, tar_path, deterministic_timestamp)
        .await
}

/// Create deterministic tar archive with explicit timestamp (for testing)
///
/// # Errors
///
/// Returns `BuildError::ArchiveFailed` on any read or write failure.
pub async fn create_deterministic_tar_archive_with_timestamp(
    contents: ArchiveContents,
    tar_path: &Path,
    timestamp: u64,
) -> Result<usize, Error> {
    let file = std::fs::File::create(tar_path)
        .map_err(|e| archive_failed(format!("cannot create {}: {e}", tar_path.display())))?;

    tokio::task::spawn_blocking(move || write_tar(file, &contents, timestamp))
        .await
        .map_err(|e| archive_failed(format!("tar creation task failed: {e}")))?
}

fn write_tar(file: std::fs::File, contents: &ArchiveContents, timestamp: u64) -> Result<usize, Error> {
    let mut tar_builder = tar::Builder::new(file);
    tar_builder.follow_symlinks(false);
    let mut entries = 0;

    append_dir(&mut tar_builder, &contents.prefix, timestamp)?;
    entries += 1;

    let pkg_info = contents.pkg_info.as_bytes();
    append_file(
        &mut tar_builder,
        &format!("{}/{PKG_INFO_ENTRY}", contents.prefix),
        0o644,
        pkg_info.len() as u64,
        pkg_info,
        timestamp,
    )?;
    entries += 1;

    let mut written_dirs = BTreeSet::new();
    for rel in &contents.files {
        // Parent directories first, each once
        let mut ancestors: Vec<&Path> = rel
            .ancestors()
            .skip(1)
            .filter(|a| !a.as_os_str().is_empty())
            .collect();
        ancestors.reverse();
        for dir in ancestors {
            if written_dirs.insert(dir.to_path_buf()) {
                append_dir(
                    &mut tar_builder,
                    &format!("{}/{}", contents.prefix, to_slash(dir)),
                    timestamp,
                )?;
                entries += 1;
            }
        }

        let source = contents.source_root.join(rel);
        let file = std::fs::File::open(&source)
            .map_err(|e| archive_failed(format!("cannot read {}: {e}", source.display())))?;
        let metadata = file
            .metadata()
            .map_err(|e| archive_failed(format!("cannot stat {}: {e}", source.display())))?;
        append_file(
            &mut tar_builder,
            &format!("{}/{}", contents.prefix, to_slash(rel)),
            normalize_file_permissions(&metadata),
            metadata.len(),
            file,
            timestamp,
        )?;
        entries += 1;
    }

    tar_builder.into_inner().map_err(archive_failed)?;
    Ok(entries)
}

fn normalized_header(entry_type: tar::EntryType, mode: u32, size: u64, timestamp: u64) -> Result<tar::Header, Error> {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(entry_type);
    header.set_size(size);
    header.set_mode(mode);
    header.set_mtime(timestamp);
    header.set_uid(0);
    header.set_gid(0);
    header.set_username("root").map_err(archive_failed)?;
    header.set_groupname("root").map_err(archive_failed)?;
    header.set_device_major(0).map_err(archive_failed)?;
    header.set_device_minor(0).map_err(archive_failed)?;
    Ok(header)
}

fn append_dir(
    tar_builder: &mut tar::Builder<std::fs::File>,
    path: &str,
    timestamp: u64,
) -> Result<(), Error> {
    let mut header = normalized_header(tar::EntryType::Directory, 0o755, 0, timestamp)?;
    tar_builder
        .append_data(&mut header, format!("{path}/"), std::io::empty())
        .map_err(archive_failed)
}

fn append_file<R: Read>(
    tar_builder: &mut tar::Builder<std::fs::File>,
    path: &str,
    mode: u32,
    size: u64,
    data: R,
    timestamp: u64,
) -> Result<(), Error> {
    let mut header = normalized_header(tar::EntryType::Regular, mode, size, timestamp)?;
    tar_builder
        .append_data(&mut header, path, data)
        .map_err(archive_failed)
}

/// `SOURCE_DATE_EPOCH`, when set to a valid number of seconds
#[must_use]
pub fn source_date_epoch() -> Option<u64> {
    std::env::var(SOURCE_DATE_EPOCH_VAR)
        .ok()
        .and_then(|val| val.trim().parse::<u64>().ok())
}

/// Get deterministic timestamp for reproducible builds
/// Uses `SOURCE_DATE_EPOCH` if set, otherwise uses epoch (0)
#[must_use]
pub fn get_deterministic_timestamp() -> u64 {
    source_date_epoch().unwrap_or(DETERMINISTIC_TIMESTAMP)
}

/// Executable files keep `0o755`, everything else becomes `0o644`
#[cfg(unix)]
fn normalize_file_permissions(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    if metadata.permissions().mode() & 0o111 != 0 {
        0o755
    } else {
        0o644
    }
}

#[cfg(not(unix))]
fn normalize_file_permissions(_metadata: &std::fs::Metadata) -> u32 {
    0o644
}
