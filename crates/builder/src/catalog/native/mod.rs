//! In-process catalog backend
//!
//! Scans sources with [`extract::Scanner`], writes PO/POT text with [`po`]
//! and compiles GNU MO files with [`mo`]. No external tool is required.

pub mod extract;
pub mod mo;
pub mod po;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use webdist_errors::{BuildError, Error};
use webdist_platform::fs as pfs;
use webdist_types::SourceKind;

use self::extract::Scanner;
use self::po::{Catalog, Message};
use super::{CatalogTool, ExtractSummary, ExtractionMapping, InitOutcome};
use crate::context::BuildContext;
use crate::packaging::archive::source_date_epoch;
use crate::utils::fileops::{collect_files, to_slash, Prune};

const PO_DATE_FORMAT: &str = "%Y-%m-%d %H:%M%z";

/// Catalog backend implemented in Rust
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCatalogTool;

impl NativeCatalogTool {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn extraction_failed(message: impl Into<String>) -> Error {
    BuildError::ExtractionFailed {
        message: message.into(),
    }
    .into()
}

fn compile_failed(message: impl Into<String>) -> Error {
    BuildError::CatalogCompileFailed {
        message: message.into(),
    }
    .into()
}

/// Timestamp for PO headers, honouring `SOURCE_DATE_EPOCH`
fn po_timestamp() -> String {
    let now = source_date_epoch()
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);
    now.format(PO_DATE_FORMAT).to_string()
}

/// `Plural-Forms` for a locale's language part
fn plural_forms(locale: &str) -> (usize, &'static str) {
    let language = locale
        .split(['_', '-', '@', '.'])
        .next()
        .unwrap_or(locale);
    match language {
        "ja" | "ko" | "zh" | "vi" | "th" | "id" | "tr" => (1, "nplurals=1; plural=0;"),
        "fr" | "pt" | "br" => (2, "nplurals=2; plural=(n > 1);"),
        "ru" | "uk" | "be" | "sr" | "hr" | "bs" => (
            3,
            "nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);",
        ),
        "pl" => (
            3,
            "nplurals=3; plural=(n==1 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);",
        ),
        "cs" | "sk" => (3, "nplurals=3; plural=((n==1) ? 0 : (n>=2 && n<=4) ? 1 : 2);"),
        _ => (2, "nplurals=2; plural=(n != 1);"),
    }
}

/// Build the template from every mapped file
async fn scan_tree(
    scan_root: &Path,
    mapping: &ExtractionMapping,
    scanner: &Scanner,
) -> Result<Vec<Message>, Error> {
    let files = collect_files(scan_root, Prune::default()).await.map_err(|e| {
        extraction_failed(format!("cannot walk {}: {e}", scan_root.display()))
    })?;

    let mut messages: Vec<Message> = Vec::new();
    let mut index: HashMap<(String, Option<String>), usize> = HashMap::new();

    for rel in files {
        let slashed = to_slash(&rel);
        let kind = match mapping.classify(&slashed) {
            Some(SourceKind::Ignore) | None => continue,
            Some(kind) => kind,
        };
        let path = scan_root.join(&rel);
        let bytes = fs::read(&path)
            .await
            .map_err(|e| extraction_failed(format!("cannot read {}: {e}", path.display())))?;
        let text = String::from_utf8_lossy(&bytes);
        let reference_file = to_slash(&mapping.root().join(&rel));

        for found in scanner.scan(&text, kind) {
            let reference = format!("{reference_file}:{}", found.line);
            let key = (found.id.clone(), found.plural.clone());
            if let Some(&at) = index.get(&key) {
                messages[at].references.push(reference);
            } else {
                let mut message = Message::new(found.id, found.plural);
                message.references.push(reference);
                index.insert(key, messages.len());
                messages.push(message);
            }
        }
    }

    Ok(messages)
}

#[async_trait]
impl CatalogTool for NativeCatalogTool {
    fn name(&self) -> &'static str {
        "native"
    }

    async fn extract(
        &self,
        ctx: &BuildContext,
        mapping: &ExtractionMapping,
    ) -> Result<ExtractSummary, Error> {
        let scan_root = ctx.root().join(mapping.root());
        if !pfs::is_dir(&scan_root).await {
            return Err(extraction_failed(format!(
                "mapping root {} is not a directory",
                scan_root.display()
            )));
        }

        let scanner = Scanner::new()?;
        let entries = scan_tree(&scan_root, mapping, &scanner).await?;
        let count = entries.len();

        let metadata = ctx.metadata();
        let mut header = Message::new("", None);
        header.flags.push("fuzzy".to_string());
        header.comments.push(format!(
            "Translations template for {}.",
            metadata.name
        ));
        let mut catalog = Catalog {
            messages: vec![header],
        };
        for (key, value) in [
            (
                "Project-Id-Version",
                format!("{} {}", metadata.name, metadata.version),
            ),
            ("Report-Msgid-Bugs-To", metadata.author_email.clone()),
            ("POT-Creation-Date", po_timestamp()),
            ("PO-Revision-Date", "YEAR-MO-DA HO:MI+ZONE".to_string()),
            ("Last-Translator", "FULL NAME <EMAIL@ADDRESS>".to_string()),
            ("Language-Team", "LANGUAGE <LL@li.org>".to_string()),
            ("MIME-Version", "1.0".to_string()),
            ("Content-Type", "text/plain; charset=utf-8".to_string()),
            ("Content-Transfer-Encoding", "8bit".to_string()),
        ] {
            catalog.set_header_field(key, &value);
        }
        catalog.messages.extend(entries);

        let template = ctx.config().template_path(ctx.root());
        fs::write(&template, catalog.render()).await.map_err(|e| {
            extraction_failed(format!("cannot write {}: {e}", template.display()))
        })?;

        tracing::debug!(template = %template.display(), messages = count, "template written");
        Ok(ExtractSummary {
            template,
            messages: count,
        })
    }

    async fn init(&self, ctx: &BuildContext, locale: &str) -> Result<InitOutcome, Error> {
        let config = ctx.config();
        let target = config.catalog_path(ctx.root(), locale);
        if fs::try_exists(&target).await.unwrap_or(false) {
            return Ok(InitOutcome::Skipped(target));
        }

        let init_failed = |message: String| -> Error {
            BuildError::CatalogInitFailed {
                locale: locale.to_string(),
                message,
            }
            .into()
        };

        let template_path = config.template_path(ctx.root());
        let text = fs::read_to_string(&template_path)
            .await
            .map_err(|e| init_failed(format!("cannot read {}: {e}", template_path.display())))?;
        let mut catalog = Catalog::parse(&text).map_err(|e| {
            init_failed(format!("invalid template {}: {e}", template_path.display()))
        })?;

        let (plurals, plural_rule) = plural_forms(locale);
        catalog.clear_header_fuzzy();
        catalog.set_header_field("PO-Revision-Date", &po_timestamp());
        catalog.set_header_field("Language", locale);
        catalog.set_header_field("Language-Team", &format!("{locale} <LL@li.org>"));
        catalog.set_header_field("Plural-Forms", plural_rule);
        for message in &mut catalog.messages {
            if message.id_plural.is_some() {
                message.strings = vec![String::new(); plurals];
            }
        }

        if let Some(dir) = target.parent() {
            pfs::ensure_dir_all(dir)
                .await
                .map_err(|e| init_failed(e.to_string()))?;
        }
        fs::write(&target, catalog.render())
            .await
            .map_err(|e| init_failed(format!("cannot write {}: {e}", target.display())))?;

        Ok(InitOutcome::Created(target))
    }

    async fn compile(&self, ctx: &BuildContext) -> Result<Vec<PathBuf>, Error> {
        let config = ctx.config();
        let locale_dir = config.locale_path(ctx.root());
        let mut entries = fs::read_dir(&locale_dir)
            .await
            .map_err(|e| compile_failed(format!("cannot read {}: {e}", locale_dir.display())))?;

        let mut locales = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| compile_failed(e.to_string()))?
        {
            if entry.file_type().await.is_ok_and(|t| t.is_dir()) {
                locales.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        locales.sort();

        let mut written = Vec::new();
        for locale in locales {
            let po_path = config.catalog_path(ctx.root(), &locale);
            if !fs::try_exists(&po_path).await.unwrap_or(false) {
                continue;
            }
            let text = fs::read_to_string(&po_path)
                .await
                .map_err(|e| compile_failed(format!("cannot read {}: {e}", po_path.display())))?;
            let catalog = Catalog::parse(&text)
                .map_err(|e| compile_failed(format!("{}: {e}", po_path.display())))?;
            let bytes = mo::write_mo(&catalog)
                .map_err(|e| compile_failed(format!("{}: {e}", po_path.display())))?;

            let mo_path = po_path.with_extension("mo");
            fs::write(&mo_path, bytes)
                .await
                .map_err(|e| compile_failed(format!("cannot write {}: {e}", mo_path.display())))?;
            tracing::debug!(locale = %locale, catalog = %mo_path.display(), "catalog compiled");
            written.push(mo_path);
        }

        if written.is_empty() {
            return Err(compile_failed(format!(
                "no message catalogs found under {}",
                locale_dir.display()
            )));
        }
        Ok(written)
    }
}
