//! `PKG-INFO` rendering (core metadata 2.1)

use std::fmt::Write as _;

use crate::metadata::PackageMetadata;

fn field(out: &mut String, name: &str, value: &str) {
    if !value.is_empty() {
        let _ = writeln!(out, "{name}: {value}");
    }
}

/// Render the metadata as a `PKG-INFO` document
///
/// Blank requirement entries are not rendered. The long description, when
/// present, becomes the message body.
#[must_use]
pub fn render_pkg_info(metadata: &PackageMetadata) -> String {
    let mut out = String::new();

    field(&mut out, "Metadata-Version", "2.1");
    field(&mut out, "Name", &metadata.name);
    field(&mut out, "Version", &metadata.version);
    field(&mut out, "Summary", &metadata.summary);
    field(&mut out, "Home-page", &metadata.url);
    field(&mut out, "Download-URL", &metadata.download_url);
    field(&mut out, "Author", &metadata.author);
    field(&mut out, "Author-email", &metadata.author_email);
    field(&mut out, "License", &metadata.license);
    field(&mut out, "Keywords", &metadata.keywords.join(","));
    for platform in &metadata.platforms {
        field(&mut out, "Platform", platform);
    }
    for classifier in &metadata.classifiers {
        field(&mut out, "Classifier", classifier);
    }
    field(&mut out, "Requires-Python", &metadata.python_requires);
    for requirement in metadata.effective_install_requires() {
        field(&mut out, "Requires-Dist", requirement.trim());
    }

    if let Some(description) = &metadata.long_description {
        field(&mut out, "Description-Content-Type", "text/markdown");
        out.push('\n');
        out.push_str(description);
        if !description.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}
