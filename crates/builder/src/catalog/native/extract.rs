//! Translatable string scanner for Python and JavaScript sources
//!
//! Recognizes calls to `_`, `gettext`, `N_` (one literal) and `ngettext`
//! (singular and plural literals). Calls whose arguments are not string
//! literals are ignored, as are calls inside comments and string literals.

use regex::Regex;
use std::ops::Range;
use webdist_errors::Error;
use webdist_types::SourceKind;

/// One call site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundMessage {
    /// 1-based line of the call
    pub line: usize,
    pub id: String,
    pub plural: Option<String>,
}

/// Keyword call matcher, compiled once per extraction run
pub struct Scanner {
    call: Regex,
}

impl Scanner {
    /// Compile the keyword pattern
    ///
    /// # Errors
    ///
    /// Returns an internal error if the pattern fails to compile.
    pub fn new() -> Result<Self, Error> {
        let call = Regex::new(r"\b(ngettext|gettext|N_|_)\s*\(")
            .map_err(|e| Error::internal(format!("failed to compile keyword regex: {e}")))?;
        Ok(Self { call })
    }

    /// Scan one source file
    #[must_use]
    pub fn scan(&self, text: &str, kind: SourceKind) -> Vec<FoundMessage> {
        scan_with(&self.call, text, kind)
    }
}

fn scan_with(call_re: &Regex, text: &str, kind: SourceKind) -> Vec<FoundMessage> {
    if kind == SourceKind::Ignore {
        return Vec::new();
    }

    let inert = inert_spans(text, kind);
    let mut inert_at = 0;
    let mut found = Vec::new();
    let mut line = 1;
    let mut counted_to = 0;

    for caps in call_re.captures_iter(text) {
        let (Some(call), Some(keyword)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        while inert_at < inert.len() && inert[inert_at].end <= call.start() {
            inert_at += 1;
        }
        if inert.get(inert_at).is_some_and(|span| span.start <= call.start()) {
            continue;
        }
        line += text[counted_to..call.start()].matches('\n').count();
        counted_to = call.start();

        let mut cursor = Cursor::new(text, call.end(), kind);
        let Some(id) = cursor.literal() else {
            continue;
        };
        let plural = if keyword.as_str() == "ngettext" {
            if !cursor.eat(',') {
                continue;
            }
            match cursor.literal() {
                Some(plural) => Some(plural),
                None => continue,
            }
        } else {
            None
        };

        if id.is_empty() {
            tracing::debug!(line, "skipping empty msgid");
            continue;
        }
        found.push(FoundMessage { line, id, plural });
    }

    found
}

/// Byte ranges of comments and string literals, in order
fn inert_spans(text: &str, kind: SourceKind) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        let rest = &bytes[i..];
        let end = match rest[0] {
            b'#' if kind == SourceKind::Python => line_end(bytes, i),
            b'/' if kind == SourceKind::Javascript && rest.starts_with(b"//") => {
                line_end(bytes, i)
            }
            b'/' if kind == SourceKind::Javascript && rest.starts_with(b"/*") => text[i + 2..]
                .find("*/")
                .map_or(bytes.len(), |at| i + 2 + at + 2),
            quote @ (b'"' | b'\'') => string_end(bytes, i, quote, kind),
            b'`' if kind == SourceKind::Javascript => string_end(bytes, i, b'`', kind),
            _ => {
                i += 1;
                continue;
            }
        };
        spans.push(start..end);
        i = end;
    }
    spans
}

fn line_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |at| from + at)
}

/// End (exclusive) of the literal opening at `from`; unterminated runs to EOF
fn string_end(bytes: &[u8], from: usize, quote: u8, kind: SourceKind) -> usize {
    let triple = kind == SourceKind::Python && bytes[from..].starts_with(&[quote; 3]);
    let mut i = from + if triple { 3 } else { 1 };
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => {
                if !triple {
                    return i + 1;
                }
                if bytes[i..].starts_with(&[quote; 3]) {
                    return i + 3;
                }
                i += 1;
            }
            b'\n' if !triple && quote != b'`' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Read a `\x`, `\u` or `\U` escape body of `len` hex digits
fn hex_escape(chars: &mut std::str::CharIndices<'_>, len: usize) -> Option<char> {
    let digits: String = chars.by_ref().take(len).map(|(_, c)| c).collect();
    if digits.len() != len {
        return None;
    }
    u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32)
}

/// JavaScript `\u{...}` escape body, after the opening brace
fn braced_escape(chars: &mut std::str::CharIndices<'_>) -> Option<char> {
    let mut digits = String::new();
    for (_, c) in chars.by_ref() {
        if c == '}' {
            return u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32);
        }
        digits.push(c);
        if digits.len() > 6 {
            return None;
        }
    }
    None
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    kind: SourceKind,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, pos: usize, kind: SourceKind) -> Self {
        Self { text, pos, kind }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// One string argument; adjacent Python literals are concatenated
    fn literal(&mut self) -> Option<String> {
        let mut value = self.single_literal()?;
        if self.kind == SourceKind::Python {
            loop {
                let saved = self.pos;
                match self.single_literal() {
                    Some(more) => value.push_str(&more),
                    None => {
                        self.pos = saved;
                        break;
                    }
                }
            }
        }
        Some(value)
    }

    fn single_literal(&mut self) -> Option<String> {
        self.skip_ws();
        let mut raw = false;
        if self.kind == SourceKind::Python {
            let prefix_len = self
                .rest()
                .chars()
                .take(2)
                .take_while(|c| matches!(c, 'u' | 'U' | 'r' | 'R' | 'b' | 'B'))
                .count();
            raw = self.rest()[..prefix_len].contains(['r', 'R']);
            self.pos += prefix_len;
        }

        let quote = self.rest().chars().next()?;
        let allowed = match self.kind {
            SourceKind::Javascript => matches!(quote, '"' | '\'' | '`'),
            _ => matches!(quote, '"' | '\''),
        };
        if !allowed {
            return None;
        }

        let triple: String = std::iter::repeat_n(quote, 3).collect();
        let delimiter = if self.kind == SourceKind::Python && self.rest().starts_with(&triple) {
            triple
        } else {
            quote.to_string()
        };
        self.pos += delimiter.len();

        let mut value = String::new();
        let mut chars = self.rest().char_indices();
        while let Some((offset, c)) = chars.next() {
            if self.rest()[offset..].starts_with(&delimiter) {
                self.pos += offset + delimiter.len();
                return Some(value);
            }
            if c == '\\' {
                let (_, escaped) = chars.next()?;
                if raw {
                    value.push('\\');
                    value.push(escaped);
                } else {
                    match escaped {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        'x' => value.push(hex_escape(&mut chars, 2)?),
                        'u' if self.kind == SourceKind::Javascript
                            && self.rest()[offset + 2..].starts_with('{') =>
                        {
                            chars.next();
                            value.push(braced_escape(&mut chars)?);
                        }
                        'u' => value.push(hex_escape(&mut chars, 4)?),
                        'U' if self.kind == SourceKind::Python => {
                            value.push(hex_escape(&mut chars, 8)?);
                        }
                        '\n' => {}
                        other => value.push(other),
                    }
                }
            } else if c == '\n' && delimiter.len() == 1 && quote != '`' {
                return None;
            } else {
                value.push(c);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_source(text: &str, kind: SourceKind) -> Vec<FoundMessage> {
        Scanner::new().unwrap().scan(text, kind)
    }

    #[test]
    fn finds_python_calls_with_lines() {
        let src = "import gettext\n\ntitle = _(\"Hello\")\nmsg = gettext('Bye')\n";
        let found = scan_source(src, SourceKind::Python);
        assert_eq!(
            found,
            vec![
                FoundMessage {
                    line: 3,
                    id: "Hello".into(),
                    plural: None
                },
                FoundMessage {
                    line: 4,
                    id: "Bye".into(),
                    plural: None
                },
            ]
        );
    }

    #[test]
    fn plural_and_concatenation() {
        let src = "n = ngettext(\"%d file\", \"%d files\", count)\nx = _(\"a\" 'b')\n";
        let found = scan_source(src, SourceKind::Python);
        assert_eq!(found[0].plural.as_deref(), Some("%d files"));
        assert_eq!(found[1].id, "ab");
    }

    #[test]
    fn ignores_non_literals_and_lookalikes() {
        let src = "_(name)\nfoo_(\"no\")\nmy_gettext(\"no\")\nN_(\"yes\")\n";
        let found = scan_source(src, SourceKind::Python);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "yes");
        assert_eq!(found[0].line, 4);
    }

    #[test]
    fn javascript_escapes() {
        let src = "var t = gettext(\"Say \\\"hi\\\"\\n\");";
        let found = scan_source(src, SourceKind::Javascript);
        assert_eq!(found[0].id, "Say \"hi\"\n");
    }

    #[test]
    fn calls_in_comments_and_strings_are_skipped() {
        let py = "# _(\"commented\")\nhelp = \"use _('inner') here\"\nok = _(\"real\")  # don't\n";
        let found = scan_source(py, SourceKind::Python);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "real");
        assert_eq!(found[0].line, 3);

        let js = "// gettext('a')\n/* gettext('b')\n */ var s = 'gettext(\"c\")';\ngettext('d');\n";
        let found = scan_source(js, SourceKind::Javascript);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "d");
        assert_eq!(found[0].line, 4);
    }

    #[test]
    fn hex_and_unicode_escapes_are_decoded() {
        let py = "_(\"caf\\xe9 \\u00e9 \\U0001F600\")\n";
        assert_eq!(scan_source(py, SourceKind::Python)[0].id, "café é 😀");

        let js = "gettext('\\u00e9\\u{1F600}\\x41')";
        assert_eq!(scan_source(js, SourceKind::Javascript)[0].id, "é😀A");

        let raw = "_(r\"\\x41\")";
        assert_eq!(scan_source(raw, SourceKind::Python)[0].id, "\\x41");
    }

    #[test]
    fn ignore_kind_yields_nothing() {
        assert!(scan_source("_(\"x\")", SourceKind::Ignore).is_empty());
    }
}
