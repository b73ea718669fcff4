#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Package metadata for webdist
//!
//! This crate reads the resource files at the project root (`VERSION`,
//! `requirements/<category>.txt`), assembles them with the `[package]`
//! configuration into [`PackageMetadata`], and renders the `PKG-INFO`
//! document shipped inside source archives.

pub mod loader;
pub mod metadata;
pub mod pkg_info;

pub use loader::{get_requires, get_version, split_requirement_lines};
pub use metadata::{assemble_metadata, build_classifiers, long_description, PackageMetadata};
pub use pkg_info::render_pkg_info;
