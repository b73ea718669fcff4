#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for webdist
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded, matching the pyLoad web UI layout)
//! - Configuration file (`<root>/webdist.toml` or `--config PATH`)
//! - Environment variables
//! - CLI flags

pub mod constants;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use webdist_errors::{ConfigError, Error};
use webdist_types::{ColorChoice, OutputFormat, SourceKind};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub package: PackageConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub webui: WebuiConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub archive: ArchiveConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

/// Static package metadata; version and requirements come from resource files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_summary")]
    pub summary: String,
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_download_url")]
    pub download_url: String,
    #[serde(default = "default_license")]
    pub license: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default = "default_author_email")]
    pub author_email: String,
    #[serde(default = "default_platforms")]
    pub platforms: Vec<String>,
    #[serde(default = "default_packages")]
    pub packages: Vec<String>,
    #[serde(default = "default_namespace_packages")]
    pub namespace_packages: Vec<String>,
    #[serde(default = "default_python_requires")]
    pub python_requires: String,
    /// Classifiers appended after the derived status and license ones
    #[serde(default = "default_classifiers")]
    pub classifiers: Vec<String>,
    #[serde(default)]
    pub zip_safe: bool,
    #[serde(default = "default_true")]
    pub include_package_data: bool,
    /// README line range (half open) used for the long description
    #[serde(default = "default_readme_from")]
    pub readme_from: usize,
    #[serde(default = "default_readme_to")]
    pub readme_to: usize,
}

/// Directory layout, relative to the project root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_locale_dir")]
    pub locale_dir: PathBuf,
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
    #[serde(default = "default_webui_dir")]
    pub webui_dir: PathBuf,
}

/// One external tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
        }
    }
}

/// Front-end asset toolchain invocations used by the compile stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebuiConfig {
    #[serde(default = "default_dev_install")]
    pub dev_install: ToolInvocation,
    #[serde(default = "default_asset_build")]
    pub build: ToolInvocation,
    #[serde(default = "default_production_install")]
    pub production_install: ToolInvocation,
}

/// Which catalog implementation drives extract/init/compile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    /// Built-in gettext template, PO and MO handling
    Native,
    /// External `pybabel`
    Babel,
}

impl Default for CatalogBackend {
    fn default() -> Self {
        Self::Native
    }
}

impl fmt::Display for CatalogBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str("native"),
            Self::Babel => f.write_str("babel"),
        }
    }
}

impl FromStr for CatalogBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" => Ok(Self::Native),
            "babel" | "pybabel" => Ok(Self::Babel),
            _ => Err(ConfigError::InvalidValue {
                field: "catalog.backend".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// One `pattern -> kind` extraction rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub pattern: String,
    pub kind: SourceKind,
}

/// Where and how translatable strings are extracted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    #[serde(default = "default_mapping_root")]
    pub root: PathBuf,
    /// Evaluated in order; the first matching rule wins
    #[serde(default = "default_mapping_rules")]
    pub rules: Vec<RuleConfig>,
}

/// Message catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub backend: CatalogBackend,
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,
    #[serde(default = "default_pybabel")]
    pub pybabel: String,
    #[serde(default)]
    pub mapping: MappingConfig,
}

/// Source archive file selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default = "default_archive_include")]
    pub include: Vec<String>,
    #[serde(default = "default_archive_exclude")]
    pub exclude: Vec<String>,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color_choice(),
        }
    }
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            status: default_status(),
            summary: default_summary(),
            keywords: default_keywords(),
            url: default_url(),
            download_url: default_download_url(),
            license: default_license(),
            author: default_author(),
            author_email: default_author_email(),
            platforms: default_platforms(),
            packages: default_packages(),
            namespace_packages: default_namespace_packages(),
            python_requires: default_python_requires(),
            classifiers: default_classifiers(),
            zip_safe: false,
            include_package_data: true,
            readme_from: default_readme_from(),
            readme_to: default_readme_to(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            locale_dir: default_locale_dir(),
            dist_dir: default_dist_dir(),
            webui_dir: default_webui_dir(),
        }
    }
}

impl Default for WebuiConfig {
    fn default() -> Self {
        Self {
            dev_install: default_dev_install(),
            build: default_asset_build(),
            production_install: default_production_install(),
        }
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            root: default_mapping_root(),
            rules: default_mapping_rules(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            backend: CatalogBackend::Native,
            domain: default_domain(),
            locales: default_locales(),
            pybabel: default_pybabel(),
            mapping: MappingConfig::default(),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            include: default_archive_include(),
            exclude: default_archive_exclude(),
        }
    }
}

// Default value functions for serde
fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_true() -> bool {
    true
}

fn default_name() -> String {
    "pyload.webui".to_string()
}

fn default_status() -> String {
    "1 - Planning".to_string()
}

fn default_summary() -> String {
    "pyLoad WebUI module".to_string()
}

fn default_keywords() -> Vec<String> {
    vec!["pyload".to_string()]
}

fn default_url() -> String {
    "https://pyload.net".to_string()
}

fn default_download_url() -> String {
    "https://github.com/pyload/webui/releases".to_string()
}

fn default_license() -> String {
    "GNU Affero General Public License v3".to_string()
}

fn default_author() -> String {
    "Walter Purcaro".to_string()
}

fn default_author_email() -> String {
    "vuolter@gmail.com".to_string()
}

fn default_platforms() -> Vec<String> {
    vec!["any".to_string()]
}

fn default_packages() -> Vec<String> {
    vec!["pyload".to_string(), "pyload/webui".to_string()]
}

fn default_namespace_packages() -> Vec<String> {
    vec!["pyload".to_string()]
}

fn default_python_requires() -> String {
    ">=2.6,!=3.0,!=3.1,!=3.2".to_string()
}

fn default_classifiers() -> Vec<String> {
    [
        "Environment :: Web Environment",
        "Intended Audience :: End Users/Desktop",
        "Natural Language :: English",
        "Operating System :: OS Independent",
        "Programming Language :: Python :: 2",
        "Programming Language :: Python :: 2.6",
        "Programming Language :: Python :: 2.7",
        "Programming Language :: Python :: 3",
        "Programming Language :: Python :: 3.3",
        "Programming Language :: Python :: 3.4",
        "Programming Language :: Python :: 3.5",
        "Programming Language :: Python :: 3.6",
        "Programming Language :: Python :: Implementation :: PyPy",
        "Topic :: Communications",
        "Topic :: Communications :: File Sharing",
        "Topic :: Internet",
        "Topic :: Internet :: File Transfer Protocol (FTP)",
        "Topic :: Internet :: WWW/HTTP",
    ]
    .iter()
    .map(|c| (*c).to_string())
    .collect()
}

fn default_readme_from() -> usize {
    1
}

fn default_readme_to() -> usize {
    31
}

fn default_locale_dir() -> PathBuf {
    PathBuf::from("locale")
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_webui_dir() -> PathBuf {
    PathBuf::from("pyload/webui")
}

fn default_dev_install() -> ToolInvocation {
    ToolInvocation::new("npm", &["install", "--only=dev"])
}

fn default_asset_build() -> ToolInvocation {
    ToolInvocation::new("node", &["node_modules/grunt-cli/bin/grunt", "build"])
}

fn default_production_install() -> ToolInvocation {
    ToolInvocation::new("npm", &["install", "--production"])
}

fn default_domain() -> String {
    "messages".to_string()
}

fn default_locales() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_pybabel() -> String {
    "pybabel".to_string()
}

fn default_mapping_root() -> PathBuf {
    PathBuf::from("pyload")
}

fn default_mapping_rules() -> Vec<RuleConfig> {
    vec![
        RuleConfig {
            pattern: "**/*.py".to_string(),
            kind: SourceKind::Python,
        },
        RuleConfig {
            pattern: "webui/app/scripts/**/*.js".to_string(),
            kind: SourceKind::Javascript,
        },
    ]
}

fn default_archive_include() -> Vec<String> {
    [
        "VERSION",
        "README.md",
        "CHANGELOG.md",
        "LICENSE*",
        "requirements/*.txt",
        "pyload/**",
        "locale/**",
    ]
    .iter()
    .map(|p| (*p).to_string())
    .collect()
}

fn default_archive_exclude() -> Vec<String> {
    [
        "**/node_modules/**",
        "**/__pycache__/**",
        "**/*.pyc",
        ".git/**",
        ".webdist/**",
    ]
    .iter()
    .map(|p| (*p).to_string())
    .collect()
}

impl Config {
    /// Default config file location for a project root
    #[must_use]
    pub fn default_path(root: &Path) -> PathBuf {
        root.join(constants::CONFIG_FILE)
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an optional path or from the project root
    ///
    /// If path is provided, loads from that file and a missing file is an
    /// error. Otherwise `<root>/webdist.toml` is used when present and the
    /// defaults when it is not.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(root: &Path, path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => {
                let config_path = Self::default_path(root);
                if fs::try_exists(&config_path).await.unwrap_or(false) {
                    Self::load_from_file(&config_path).await
                } else {
                    tracing::debug!(path = %config_path.display(), "no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // WEBDIST_OUTPUT
        if let Ok(output) = std::env::var("WEBDIST_OUTPUT") {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "WEBDIST_OUTPUT".to_string(),
                        value: output,
                    }
                    .into())
                }
            };
        }

        // WEBDIST_COLOR
        if let Ok(color) = std::env::var("WEBDIST_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "WEBDIST_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        // WEBDIST_CATALOG_BACKEND
        if let Ok(backend) = std::env::var("WEBDIST_CATALOG_BACKEND") {
            self.catalog.backend =
                backend
                    .parse()
                    .map_err(|_: ConfigError| ConfigError::InvalidValue {
                        field: "WEBDIST_CATALOG_BACKEND".to_string(),
                        value: backend.clone(),
                    })?;
        }

        // WEBDIST_LOCALES (comma separated)
        if let Ok(locales) = std::env::var("WEBDIST_LOCALES") {
            let parsed: Vec<String> = locales
                .split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(ToString::to_string)
                .collect();
            if parsed.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "WEBDIST_LOCALES".to_string(),
                    value: locales,
                }
                .into());
            }
            self.catalog.locales = parsed;
        }

        self.validate()
    }

    /// Check values the type system cannot express
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending field.
    pub fn validate(&self) -> Result<(), Error> {
        if self.package.name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "package.name must not be empty".to_string(),
            }
            .into());
        }
        if self.catalog.domain.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "catalog.domain must not be empty".to_string(),
            }
            .into());
        }
        if let Some(locale) = self
            .catalog
            .locales
            .iter()
            .find(|l| l.is_empty() || l.contains(['/', '\\']))
        {
            return Err(ConfigError::InvalidValue {
                field: "catalog.locales".to_string(),
                value: locale.clone(),
            }
            .into());
        }
        if self.package.readme_from > self.package.readme_to {
            return Err(ConfigError::Invalid {
                message: format!(
                    "package.readme_from ({}) is past package.readme_to ({})",
                    self.package.readme_from, self.package.readme_to
                ),
            }
            .into());
        }
        Ok(())
    }

    /// Asset directory under the given root
    #[must_use]
    pub fn webui_path(&self, root: &Path) -> PathBuf {
        root.join(&self.paths.webui_dir)
    }

    /// Locale directory under the given root
    #[must_use]
    pub fn locale_path(&self, root: &Path) -> PathBuf {
        root.join(&self.paths.locale_dir)
    }

    /// Output directory for archives under the given root
    #[must_use]
    pub fn dist_path(&self, root: &Path) -> PathBuf {
        root.join(&self.paths.dist_dir)
    }

    /// Template written by extraction: `<locale_dir>/<domain>.pot`
    #[must_use]
    pub fn template_path(&self, root: &Path) -> PathBuf {
        self.locale_path(root)
            .join(format!("{}.pot", self.catalog.domain))
    }

    /// Per-locale catalog: `<locale_dir>/<locale>/LC_MESSAGES/<domain>.po`
    #[must_use]
    pub fn catalog_path(&self, root: &Path, locale: &str) -> PathBuf {
        self.locale_path(root)
            .join(locale)
            .join("LC_MESSAGES")
            .join(format!("{}.po", self.catalog.domain))
    }
}
