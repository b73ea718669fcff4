use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Message catalog events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum CatalogEvent {
    /// The template was written
    TemplateExtracted {
        template: PathBuf,
        messages: usize,
        backend: String,
    },

    /// A locale catalog was created from the template
    LocaleInitialized { locale: String, catalog: PathBuf },

    /// A locale already had a catalog and was left untouched
    LocaleSkipped { locale: String, catalog: PathBuf },

    /// A locale catalog was compiled to its runtime format
    Compiled { catalog: PathBuf },
}
