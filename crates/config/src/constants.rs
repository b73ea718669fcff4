//! Fixed file and directory names of the project layout
//!
//! These are not exposed via TOML configuration; the layout of a project
//! root is a contract with the tools that consume it.

pub const CONFIG_FILE: &str = "webdist.toml";

pub const VERSION_FILE: &str = "VERSION";
pub const REQUIREMENTS_DIR: &str = "requirements";
pub const REQUIREMENTS_EXT: &str = "txt";

pub const README_FILE: &str = "README.md";
pub const CHANGELOG_FILE: &str = "CHANGELOG.md";

pub const PKG_INFO_FILE: &str = "PKG-INFO";

pub const LOGS_DIR: &str = ".webdist/logs";

/// Exit code reported when the asset directory cannot be entered
pub const EXIT_FAILURE: i32 = 1;

/// Exit code reported when a tool cannot be started at all
pub const EXIT_NOT_FOUND: i32 = 127;
