#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform abstraction layer for webdist build steps.
//!
//! This crate provides:
//! - Process execution that reports a tool that never started separately
//!   from a tool that ran and exited unsuccessfully
//! - Filesystem helpers with the tolerance rules the stages rely on
//!
//! Every process invocation emits platform events through the context.

pub mod core;
pub mod fs;
pub mod implementations;
pub mod process;

pub use core::PlatformContext;
pub use implementations::TokioProcessOperations;

/// Re-export commonly used types
pub use process::{CommandOutput, PlatformCommand, ProcessOperations};
