//! Gettext PO/POT catalogs: model, parser and writer

use std::fmt::Write as _;

/// Upper bound on `msgstr[n]` entries, whatever the header declares
const MAX_PLURAL_FORMS: usize = 6;

/// One catalog entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub context: Option<String>,
    pub id: String,
    pub id_plural: Option<String>,
    /// `msgstr`, or `msgstr[n]` in index order for plural entries
    pub strings: Vec<String>,
    /// `file:line` source references
    pub references: Vec<String>,
    pub flags: Vec<String>,
    /// Translator comments, without the leading `# `
    pub comments: Vec<String>,
}

impl Message {
    /// Untranslated entry with the given source reference
    #[must_use]
    pub fn new(id: impl Into<String>, id_plural: Option<String>) -> Self {
        let strings = if id_plural.is_some() {
            vec![String::new(), String::new()]
        } else {
            vec![String::new()]
        };
        Self {
            id: id.into(),
            id_plural,
            strings,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_header(&self) -> bool {
        self.id.is_empty() && self.context.is_none()
    }

    #[must_use]
    pub fn is_fuzzy(&self) -> bool {
        self.flags.iter().any(|f| f == "fuzzy")
    }

    #[must_use]
    pub fn is_translated(&self) -> bool {
        self.strings.iter().any(|s| !s.is_empty())
    }

    /// Lookup key in a compiled catalog
    #[must_use]
    pub fn mo_key(&self) -> String {
        let mut key = String::new();
        if let Some(context) = &self.context {
            key.push_str(context);
            key.push('\u{4}');
        }
        key.push_str(&self.id);
        if let Some(plural) = &self.id_plural {
            key.push('\0');
            key.push_str(plural);
        }
        key
    }

    /// Translation value in a compiled catalog
    #[must_use]
    pub fn mo_value(&self) -> String {
        self.strings.join("\0")
    }
}

/// Syntax error with its 1-based line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct PoSyntaxError {
    pub line: usize,
    pub message: String,
}

/// Ordered list of entries; the header, when present, comes first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub messages: Vec<Message>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    IdPlural,
    Str(usize),
}

impl Catalog {
    /// Header entry, if any
    #[must_use]
    pub fn header(&self) -> Option<&Message> {
        self.messages.first().filter(|m| m.is_header())
    }

    fn header_mut(&mut self) -> &mut Message {
        if self.header().is_none() {
            self.messages.insert(0, Message::new("", None));
        }
        &mut self.messages[0]
    }

    /// Value of a `Key: value` header field
    #[must_use]
    pub fn header_field(&self, key: &str) -> Option<&str> {
        let header = self.header()?;
        header.strings.first()?.lines().find_map(|line| {
            let (k, v) = line.split_once(':')?;
            (k.trim() == key).then(|| v.trim())
        })
    }

    /// Replace a header field, or append it when absent
    pub fn set_header_field(&mut self, key: &str, value: &str) {
        let header = self.header_mut();
        if header.strings.is_empty() {
            header.strings.push(String::new());
        }
        let mut replaced = false;
        let mut out = String::new();
        for line in header.strings[0].lines() {
            match line.split_once(':') {
                Some((k, _)) if k.trim() == key => {
                    let _ = writeln!(out, "{key}: {value}");
                    replaced = true;
                }
                _ => {
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
        if !replaced {
            let _ = writeln!(out, "{key}: {value}");
        }
        header.strings[0] = out;
    }

    /// Remove the fuzzy flag from the header
    pub fn clear_header_fuzzy(&mut self) {
        self.header_mut().flags.retain(|f| f != "fuzzy");
    }

    /// Entries other than the header
    pub fn entries(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| !m.is_header())
    }

    /// Parse PO text
    ///
    /// # Errors
    ///
    /// Returns the first syntax error with its line number.
    pub fn parse(text: &str) -> Result<Self, PoSyntaxError> {
        let mut messages = Vec::new();
        let mut current = Message::default();
        let mut started = false;
        let mut has_str = false;
        let mut field: Option<Field> = None;

        let finish = |current: &mut Message,
                      started: &mut bool,
                      has_str: &mut bool,
                      messages: &mut Vec<Message>| {
            if *started {
                messages.push(std::mem::take(current));
            } else {
                *current = Message::default();
            }
            *started = false;
            *has_str = false;
        };

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            let error = |message: &str| PoSyntaxError {
                line: line_no,
                message: message.to_string(),
            };

            if line.is_empty() {
                finish(&mut current, &mut started, &mut has_str, &mut messages);
                field = None;
                continue;
            }

            if let Some(comment) = line.strip_prefix('#') {
                if has_str {
                    finish(&mut current, &mut started, &mut has_str, &mut messages);
                }
                if comment.starts_with('~') {
                    // obsolete entries are dropped
                } else if let Some(flags) = comment.strip_prefix(',') {
                    current
                        .flags
                        .extend(flags.split(',').map(str::trim).filter(|f| !f.is_empty()).map(String::from));
                } else if let Some(refs) = comment.strip_prefix(':') {
                    current
                        .references
                        .extend(refs.split_whitespace().map(String::from));
                } else if comment.starts_with('.') || comment.starts_with('|') {
                    // extracted comments and previous msgids are not kept
                } else {
                    current
                        .comments
                        .push(comment.strip_prefix(' ').unwrap_or(comment).to_string());
                }
                field = None;
                continue;
            }

            if line.starts_with('"') {
                let value = unquote(line).ok_or_else(|| error("malformed string"))?;
                let target = field.ok_or_else(|| error("string without keyword"))?;
                match target {
                    Field::Context => current.context.get_or_insert_with(String::new).push_str(&value),
                    Field::Id => current.id.push_str(&value),
                    Field::IdPlural => current
                        .id_plural
                        .get_or_insert_with(String::new)
                        .push_str(&value),
                    Field::Str(i) => current.strings[i].push_str(&value),
                }
                continue;
            }

            let (keyword, rest) = line
                .split_once(char::is_whitespace)
                .ok_or_else(|| error("expected keyword and string"))?;
            let value = unquote(rest.trim()).ok_or_else(|| error("malformed string"))?;

            match keyword {
                "msgctxt" | "msgid" if has_str => {
                    finish(&mut current, &mut started, &mut has_str, &mut messages);
                }
                _ => {}
            }

            match keyword {
                "msgctxt" => {
                    current.context = Some(value);
                    field = Some(Field::Context);
                }
                "msgid" => {
                    current.id = value;
                    field = Some(Field::Id);
                }
                "msgid_plural" => {
                    current.id_plural = Some(value);
                    field = Some(Field::IdPlural);
                }
                "msgstr" => {
                    current.strings = vec![value];
                    has_str = true;
                    field = Some(Field::Str(0));
                }
                other => {
                    let index = other
                        .strip_prefix("msgstr[")
                        .and_then(|s| s.strip_suffix(']'))
                        .and_then(|s| s.parse::<usize>().ok())
                        .ok_or_else(|| error(&format!("unknown keyword {other}")))?;
                    let limit = messages
                        .first()
                        .filter(|header| header.is_header())
                        .and_then(declared_plural_forms)
                        .map_or(MAX_PLURAL_FORMS, |n| n.min(MAX_PLURAL_FORMS));
                    if index >= limit {
                        return Err(error(&format!(
                            "plural index {index} exceeds {limit} plural forms"
                        )));
                    }
                    if current.strings.len() <= index {
                        current.strings.resize(index + 1, String::new());
                    }
                    current.strings[index] = value;
                    has_str = true;
                    field = Some(Field::Str(index));
                }
            }
            started = true;
        }

        finish(&mut current, &mut started, &mut has_str, &mut messages);
        Ok(Self { messages })
    }

    /// Render as PO text
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, message) in self.messages.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            for comment in &message.comments {
                if comment.is_empty() {
                    out.push_str("#\n");
                } else {
                    let _ = writeln!(out, "# {comment}");
                }
            }
            for reference in &message.references {
                let _ = writeln!(out, "#: {reference}");
            }
            if !message.flags.is_empty() {
                let _ = writeln!(out, "#, {}", message.flags.join(", "));
            }
            if let Some(context) = &message.context {
                write_field(&mut out, "msgctxt", context);
            }
            write_field(&mut out, "msgid", &message.id);
            if let Some(plural) = &message.id_plural {
                write_field(&mut out, "msgid_plural", plural);
                for (n, string) in message.strings.iter().enumerate() {
                    write_field(&mut out, &format!("msgstr[{n}]"), string);
                }
            } else {
                let string = message.strings.first().map_or("", String::as_str);
                write_field(&mut out, "msgstr", string);
            }
        }
        out
    }
}

fn write_field(out: &mut String, keyword: &str, value: &str) {
    if value.trim_end_matches('\n').contains('\n') {
        let _ = writeln!(out, "{keyword} \"\"");
        for piece in value.split_inclusive('\n') {
            let _ = writeln!(out, "\"{}\"", escape(piece));
        }
    } else {
        let _ = writeln!(out, "{keyword} \"{}\"", escape(value));
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

fn unquote(line: &str) -> Option<String> {
    let inner = line.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                other => out.push(other),
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

/// `nplurals` from the header's `Plural-Forms` field
fn declared_plural_forms(header: &Message) -> Option<usize> {
    header
        .strings
        .first()?
        .lines()
        .find_map(|line| line.strip_prefix("Plural-Forms:"))?
        .split(';')
        .find_map(|part| part.trim().strip_prefix("nplurals="))?
        .trim()
        .parse()
        .ok()
        .filter(|&n| n > 0)
}
