//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use webdist_types::ColorChoice;

/// webdist - build, localize and package the pyLoad webui
#[derive(Parser)]
#[command(name = "webdist")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build, localize and package the pyLoad webui")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to <root>/.webdist/logs/
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Build the webui assets with npm and grunt (best effort)
    Compile,

    /// Compile assets, then extract, initialize and compile message catalogs
    Configure,

    /// Download message catalogs from the translation service
    #[command(name = "get_catalog", alias = "get-catalog")]
    GetCatalog,

    /// Configure, then write the source distribution archive
    Sdist,

    /// List registered stages
    Stages,

    /// Show the assembled package metadata
    Metadata,
}

impl Commands {
    /// Registered stage this command runs, if it runs one
    pub fn stage_name(&self) -> Option<&'static str> {
        match self {
            Self::Compile => Some("compile"),
            Self::Configure => Some("configure"),
            Self::GetCatalog => Some("get_catalog"),
            Self::Sdist => Some("sdist"),
            Self::Stages | Self::Metadata => None,
        }
    }
}
