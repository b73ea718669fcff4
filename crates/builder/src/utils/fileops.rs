//! File system walking shared by extraction and archiving

use globset::GlobSet;
use ignore::WalkBuilder;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Directories the walk never enters
#[derive(Debug, Clone, Default)]
pub struct Prune {
    /// Absolute directory paths
    pub dirs: Vec<PathBuf>,
    /// Matched against slash-separated paths relative to the walk root
    pub globs: Option<GlobSet>,
}

impl Prune {
    fn skips(&self, root: &Path, path: &Path) -> bool {
        if self.dirs.iter().any(|d| d == path) {
            return true;
        }
        match (&self.globs, path.strip_prefix(root)) {
            (Some(globs), Ok(rel)) => globs.is_match(to_slash(rel)),
            _ => false,
        }
    }
}

/// Regular files under `root`, relative to it, in sorted order
///
/// Symlinks are not followed and ignore files are not consulted. Pruned
/// directories are never read, so an unreadable tree inside one is harmless.
///
/// # Errors
///
/// Returns the first error hit while reading a directory.
pub async fn collect_files(root: &Path, prune: Prune) -> io::Result<Vec<PathBuf>> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || walk(&root, prune))
        .await
        .map_err(io::Error::other)?
}

fn walk(root: &Path, prune: Prune) -> io::Result<Vec<PathBuf>> {
    let filter_root = root.to_path_buf();
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            entry.depth() == 0 || !is_dir || !prune.skips(&filter_root, entry.path())
        });

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(io::Error::other)?
            .to_path_buf();
        files.push(rel);
    }
    files.sort();
    Ok(files)
}

/// Relative path rendered with `/` separators, as used in globs and archives
#[must_use]
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
