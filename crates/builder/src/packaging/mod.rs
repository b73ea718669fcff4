//! Source archive creation: file selection, deterministic tar, gzip

pub mod archive;
pub mod compression;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::PathBuf;
use tokio::fs;
use webdist_errors::{BuildError, Error};
use webdist_events::{AppEvent, EventEmitter, PackageEvent};
use webdist_manifest::render_pkg_info;
use webdist_platform::fs as pfs;

use self::archive::{create_deterministic_tar_archive, ArchiveContents, PKG_INFO_ENTRY};
use self::compression::compress_with_gzip;
use crate::context::BuildContext;
use crate::utils::fileops::{collect_files, to_slash, Prune};

/// Result of a written source archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// `<dist_dir>/<name>-<version>.tar.gz`
    pub path: PathBuf,
    /// Tar entries, directories included
    pub entries: usize,
    pub size_bytes: u64,
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| BuildError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| {
        BuildError::InvalidPattern {
            pattern: patterns.join(", "),
            message: e.to_string(),
        }
        .into()
    })
}

/// Exclude patterns of the form `<dir>/**` as directory patterns
///
/// Everything below a directory matching `<dir>` is excluded anyway, so the
/// walk can skip it without reading it.
fn prunable_dirs(exclude: &[String]) -> Vec<String> {
    exclude
        .iter()
        .filter_map(|pattern| pattern.strip_suffix("/**"))
        .filter(|dir| !dir.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Files under the project root selected by `[archive]`, relative and sorted
///
/// The dist directory and wholly excluded directories are never entered and
/// a root-level `PKG-INFO` is replaced by the generated one.
///
/// # Errors
///
/// Returns `BuildError::InvalidPattern` for a bad glob and
/// `BuildError::ArchiveFailed` if the tree cannot be walked.
pub async fn select_files(ctx: &BuildContext) -> Result<Vec<PathBuf>, Error> {
    let config = ctx.config();
    let include = build_globset(&config.archive.include)?;
    let exclude = build_globset(&config.archive.exclude)?;

    let prune = Prune {
        dirs: vec![config.dist_path(ctx.root())],
        globs: Some(build_globset(&prunable_dirs(&config.archive.exclude))?),
    };
    let files = collect_files(ctx.root(), prune)
        .await
        .map_err(|e| BuildError::ArchiveFailed {
            message: format!("cannot walk {}: {e}", ctx.root().display()),
        })?;

    Ok(files
        .into_iter()
        .filter(|rel| {
            let slashed = to_slash(rel);
            slashed != PKG_INFO_ENTRY && include.is_match(&slashed) && !exclude.is_match(&slashed)
        })
        .collect())
}

/// Write `<dist_dir>/<name>-<version>.tar.gz`
///
/// The tar is staged in a temporary file inside the dist directory and a
/// partially written archive is removed on failure.
///
/// # Errors
///
/// Returns `BuildError::ArchiveFailed` (or `InvalidPattern`) on failure.
pub async fn create_source_archive(ctx: &BuildContext) -> Result<ArchiveSummary, Error> {
    let config = ctx.config();
    let metadata = ctx.metadata();
    let stem = metadata.dist_stem();
    let dist = config.dist_path(ctx.root());
    let output = dist.join(format!("{stem}.tar.gz"));

    ctx.emit(AppEvent::Package(PackageEvent::ArchiveStarted {
        name: metadata.name.clone(),
        version: metadata.version.clone(),
        output: output.clone(),
    }));

    let files = select_files(ctx).await?;
    tracing::debug!(files = files.len(), "selected archive contents");

    pfs::ensure_dir_all(&dist).await?;
    let staging = tempfile::Builder::new()
        .prefix(".webdist-")
        .suffix(".tar")
        .tempfile_in(&dist)
        .map_err(|e| BuildError::ArchiveFailed {
            message: format!("cannot create staging file in {}: {e}", dist.display()),
        })?;

    let contents = ArchiveContents {
        source_root: ctx.root().to_path_buf(),
        prefix: stem,
        pkg_info: render_pkg_info(metadata),
        files,
    };
    let entries = create_deterministic_tar_archive(contents, staging.path()).await?;

    if let Err(e) = compress_with_gzip(staging.path(), &output).await {
        let _ = fs::remove_file(&output).await;
        return Err(e);
    }

    let size_bytes = fs::metadata(&output)
        .await
        .map_err(|e| Error::io_with_path(&e, &output))?
        .len();

    ctx.emit(AppEvent::Package(PackageEvent::ArchiveCreated {
        output: output.clone(),
        entries,
        size_bytes,
    }));

    Ok(ArchiveSummary {
        path: output,
        entries,
        size_bytes,
    })
}
