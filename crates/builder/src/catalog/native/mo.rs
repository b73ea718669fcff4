//! GNU MO binary catalogs
//!
//! Layout: a 28-byte little-endian header, the original and translation
//! string tables (length, offset pairs), no hash table, then the
//! NUL-terminated strings. Entries are sorted by key, so the header entry
//! (empty key) is always first.

use super::po::Catalog;

/// Little-endian magic number
pub const MO_MAGIC: u32 = 0x9504_12de;

const HEADER_LEN: usize = 28;

/// Entries that belong in the compiled catalog
///
/// The header is always kept; other entries are dropped when fuzzy or
/// untranslated.
#[must_use]
pub fn compiled_entries(catalog: &Catalog) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = catalog
        .messages
        .iter()
        .filter(|m| m.is_header() || (!m.is_fuzzy() && m.is_translated()))
        .map(|m| (m.mo_key(), m.mo_value()))
        .collect();
    entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    entries.dedup_by(|a, b| a.0 == b.0);
    entries
}

fn to_u32(value: usize) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("catalog too large: {value} exceeds the MO format limit"))
}

/// Serialize a catalog to MO bytes
///
/// # Errors
///
/// Returns a message if the catalog exceeds the 32-bit offsets of the format.
pub fn write_mo(catalog: &Catalog) -> Result<Vec<u8>, String> {
    let entries = compiled_entries(catalog);
    let count = entries.len();

    let originals_offset = HEADER_LEN;
    let translations_offset = originals_offset + count * 8;
    let strings_offset = translations_offset + count * 8;

    let mut originals = Vec::with_capacity(count);
    let mut translations = Vec::with_capacity(count);
    let mut strings = Vec::new();

    for (key, _) in &entries {
        originals.push((key.len(), strings_offset + strings.len()));
        strings.extend_from_slice(key.as_bytes());
        strings.push(0);
    }
    for (_, value) in &entries {
        translations.push((value.len(), strings_offset + strings.len()));
        strings.extend_from_slice(value.as_bytes());
        strings.push(0);
    }

    let mut out = Vec::with_capacity(strings_offset + strings.len());
    for word in [
        MO_MAGIC,
        0,
        to_u32(count)?,
        to_u32(originals_offset)?,
        to_u32(translations_offset)?,
        0,
        to_u32(strings_offset)?,
    ] {
        out.extend_from_slice(&word.to_le_bytes());
    }
    for (len, offset) in originals.iter().chain(translations.iter()) {
        out.extend_from_slice(&to_u32(*len)?.to_le_bytes());
        out.extend_from_slice(&to_u32(*offset)?.to_le_bytes());
    }
    out.extend_from_slice(&strings);
    Ok(out)
}

/// Read the `(key, value)` pairs back from MO bytes (either byte order)
///
/// # Errors
///
/// Returns a message describing the first structural problem.
pub fn read_mo(bytes: &[u8]) -> Result<Vec<(String, String)>, String> {
    let word = |at: usize, little: bool| -> Result<usize, String> {
        let raw: [u8; 4] = bytes
            .get(at..at + 4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| format!("truncated at offset {at}"))?;
        let value = if little {
            u32::from_le_bytes(raw)
        } else {
            u32::from_be_bytes(raw)
        };
        usize::try_from(value).map_err(|e| e.to_string())
    };

    let little = match word(0, true)? {
        m if m == MO_MAGIC as usize => true,
        _ if word(0, false)? == MO_MAGIC as usize => false,
        other => return Err(format!("bad magic {other:#x}")),
    };

    let count = word(8, little)?;
    let originals = word(12, little)?;
    let translations = word(16, little)?;

    let string_at = |table: usize, index: usize| -> Result<String, String> {
        let len = word(table + index * 8, little)?;
        let offset = word(table + index * 8 + 4, little)?;
        let raw = bytes
            .get(offset..offset + len)
            .ok_or_else(|| format!("string {index} out of bounds"))?;
        String::from_utf8(raw.to_vec()).map_err(|e| e.to_string())
    };

    (0..count)
        .map(|i| Ok((string_at(originals, i)?, string_at(translations, i)?)))
        .collect()
}
