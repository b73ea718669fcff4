//! Concrete platform operation implementations

pub mod process;

pub use process::TokioProcessOperations;
