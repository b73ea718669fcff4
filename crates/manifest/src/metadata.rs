//! Package metadata assembly

use serde::{Deserialize, Serialize};
use std::path::Path;
use webdist_config::constants::{CHANGELOG_FILE, README_FILE};
use webdist_config::{Config, PackageConfig};
use webdist_errors::{Error, PackageError};

use crate::loader::{get_requires, get_version};

/// Everything the distribution needs to describe itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    pub keywords: Vec<String>,
    pub url: String,
    pub download_url: String,
    pub license: String,
    pub author: String,
    pub author_email: String,
    pub platforms: Vec<String>,
    pub packages: Vec<String>,
    pub namespace_packages: Vec<String>,
    /// Entries exactly as listed, blank lines included
    pub install_requires: Vec<String>,
    pub setup_requires: Vec<String>,
    pub python_requires: String,
    pub classifiers: Vec<String>,
    pub zip_safe: bool,
    pub include_package_data: bool,
}

impl PackageMetadata {
    /// `<name>-<version>`, the archive file stem and its top-level directory
    #[must_use]
    pub fn dist_stem(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Install requirements without blank entries
    pub fn effective_install_requires(&self) -> impl Iterator<Item = &str> {
        self.install_requires
            .iter()
            .map(String::as_str)
            .filter(|r| !r.trim().is_empty())
    }
}

/// Derived status and license classifiers followed by the configured ones
#[must_use]
pub fn build_classifiers(package: &PackageConfig) -> Vec<String> {
    let mut classifiers = Vec::with_capacity(package.classifiers.len() + 2);
    classifiers.push(format!("Development Status :: {}", package.status));
    classifiers.push(format!("License :: OSI Approved :: {}", package.license));
    classifiers.extend(package.classifiers.iter().cloned());
    classifiers
}

/// README lines `[from, to)` followed by the changelog
///
/// Best effort: `None` when either file is missing or unreadable. The text
/// is used as is, without format conversion.
pub async fn long_description(root: &Path, from: usize, to: usize) -> Option<String> {
    let readme = match tokio::fs::read_to_string(root.join(README_FILE)).await {
        Ok(readme) => readme,
        Err(e) => {
            tracing::debug!(error = %e, "no README, skipping long description");
            return None;
        }
    };
    let changelog = match tokio::fs::read_to_string(root.join(CHANGELOG_FILE)).await {
        Ok(changelog) => changelog,
        Err(e) => {
            tracing::debug!(error = %e, "no CHANGELOG, skipping long description");
            return None;
        }
    };

    let excerpt: String = readme
        .split_inclusive('\n')
        .skip(from)
        .take(to.saturating_sub(from))
        .collect();

    Some(format!("{excerpt}\r\n\r\n{changelog}"))
}

/// Assemble metadata from configuration and the resource files under `root`
///
/// # Errors
///
/// Returns an error if `VERSION` or the `install` requirements are missing
/// or unreadable, or if the resulting version is empty. A missing `setup`
/// category means no setup requirements.
pub async fn assemble_metadata(config: &Config, root: &Path) -> Result<PackageMetadata, Error> {
    let package = &config.package;

    let version = get_version(root).await?;
    if version.is_empty() {
        return Err(PackageError::InvalidMetadata {
            field: "version".to_string(),
            message: "VERSION file is empty".to_string(),
        }
        .into());
    }

    let install_requires = get_requires(root, "install").await?;
    let setup_requires = match get_requires(root, "setup").await {
        Err(Error::Package(PackageError::MissingResource { path })) => {
            tracing::debug!(%path, "no setup requirements");
            Vec::new()
        }
        other => other?,
    };
    let long_description = long_description(root, package.readme_from, package.readme_to).await;

    tracing::debug!(
        name = %package.name,
        version = %version,
        install = install_requires.len(),
        setup = setup_requires.len(),
        "assembled package metadata"
    );

    Ok(PackageMetadata {
        name: package.name.clone(),
        version,
        summary: package.summary.clone(),
        long_description,
        keywords: package.keywords.clone(),
        url: package.url.clone(),
        download_url: package.download_url.clone(),
        license: package.license.clone(),
        author: package.author.clone(),
        author_email: package.author_email.clone(),
        platforms: package.platforms.clone(),
        packages: package.packages.clone(),
        namespace_packages: package.namespace_packages.clone(),
        install_requires,
        setup_requires,
        python_requires: package.python_requires.clone(),
        classifiers: build_classifiers(package),
        zip_safe: package.zip_safe,
        include_package_data: package.include_package_data,
    })
}
