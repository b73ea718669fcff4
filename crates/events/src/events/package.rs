use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source archive events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PackageEvent {
    /// Archive creation started
    ArchiveStarted {
        name: String,
        version: String,
        output: PathBuf,
    },

    /// Archive written
    ArchiveCreated {
        output: PathBuf,
        entries: usize,
        size_bytes: u64,
    },
}
