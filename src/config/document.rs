//! Commented key-value documents backed by flat TOML files.
//!
//! # Responsibilities
//! - Parse a flat TOML file into an ordered list of lines (blank, comment, entry)
//! - Keep untouched entries byte-for-byte so saves only differ where values changed
//! - Write timestamped backups of the text that was loaded
//! - Typed accessors over the untyped scalar values
//!
//! # Design Decisions
//! - Only scalar values (boolean, integer, string) are accepted
//! - Tables, arrays and multi-line values are rejected at load time
//! - Comments directly above an entry belong to that entry
//! - Line endings are kept per line; appended lines use the dominant one
//! - Each entry line is parsed on its own so quoted keys resolve exactly as TOML reads them

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// Error type for document I/O and parsing.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Parse error in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unsupported entry in {} at line {line}: {reason}", .path.display())]
    Unsupported {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl DocumentError {
    /// True for errors caused by the file content rather than the filesystem.
    pub fn is_syntax(&self) -> bool {
        matches!(self, DocumentError::Parse { .. } | DocumentError::Unsupported { .. })
    }

    fn io(path: &Path, source: io::Error) -> Self {
        DocumentError::Io { path: path.to_path_buf(), source }
    }
}

/// A scalar document value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    String(String),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl fmt::Display for Value {
    /// Renders the value in TOML syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::String(s) => write!(f, "{}", quote(s)),
        }
    }
}

#[derive(Debug, Clone)]
enum LineKind {
    Blank,
    Comment(String),
    Entry {
        key: String,
        value: Value,
        /// Original text, dropped once the value is changed.
        raw: Option<String>,
    },
}

#[derive(Debug, Clone)]
struct Line {
    kind: LineKind,
    /// Terminator as read: `"\n"`, `"\r\n"`, or empty on an unterminated last line.
    eol: &'static str,
}

/// An ordered, commented key-value document loaded from a single file.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    path: PathBuf,
    /// Text as read from disk by the last load.
    source: String,
    lines: Vec<Line>,
    /// Line ending used for appended lines.
    newline: &'static str,
}

impl ConfigDocument {
    /// Load a document from `path`.
    ///
    /// A missing file is seeded with `defaults` first when given.
    pub fn load(path: &Path, defaults: Option<&str>) -> Result<Self, DocumentError> {
        if !path.exists() {
            if let Some(defaults) = defaults {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).map_err(|e| DocumentError::io(parent, e))?;
                }
                fs::write(path, defaults).map_err(|e| DocumentError::io(path, e))?;
                tracing::info!(path = %path.display(), "Seeded missing file with defaults");
            }
        }

        let source = fs::read_to_string(path).map_err(|e| DocumentError::io(path, e))?;
        Self::parse(path, source)
    }

    /// Parse `source` as the content of `path` without touching the disk.
    ///
    /// Each entry must fit on one line. Its key may be bare or quoted; quoted
    /// keys are resolved by the TOML parser, so escapes and `=` are fine.
    pub fn parse(path: &Path, source: String) -> Result<Self, DocumentError> {
        let table: toml::Table = source.parse().map_err(|e| DocumentError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        let unsupported = |line: usize, reason: String| DocumentError::Unsupported {
            path: path.to_path_buf(),
            line,
            reason,
        };

        let mut lines = Vec::new();
        let (mut crlf, mut lf) = (0usize, 0usize);
        for (idx, chunk) in source.split_inclusive('\n').enumerate() {
            let (text, eol) = if let Some(text) = chunk.strip_suffix("\r\n") {
                crlf += 1;
                (text, "\r\n")
            } else if let Some(text) = chunk.strip_suffix('\n') {
                lf += 1;
                (text, "\n")
            } else {
                (chunk, "")
            };

            let trimmed = text.trim();
            if trimmed.is_empty() {
                lines.push(Line { kind: LineKind::Blank, eol });
                continue;
            }
            if trimmed.starts_with('#') {
                lines.push(Line { kind: LineKind::Comment(text.to_string()), eol });
                continue;
            }
            if trimmed.starts_with('[') {
                return Err(unsupported(idx + 1, "sections are not supported".into()));
            }

            let single: toml::Table = text
                .parse()
                .map_err(|_| unsupported(idx + 1, "multi-line values are not supported".into()))?;
            let Some((key, value)) = single.into_iter().next() else {
                return Err(unsupported(idx + 1, "expected a key-value pair".into()));
            };
            let value = match value {
                toml::Value::Boolean(b) => Value::Bool(b),
                toml::Value::Integer(i) => Value::Integer(i),
                toml::Value::String(s) => Value::String(s),
                other => {
                    return Err(unsupported(idx + 1, format!("`{}` has unsupported type {}", key, other.type_str())));
                }
            };

            lines.push(Line {
                kind: LineKind::Entry { key, value, raw: Some(text.to_string()) },
                eol,
            });
        }

        let newline = if crlf > lf { "\r\n" } else { "\n" };
        let doc = Self { path: path.to_path_buf(), source, lines, newline };
        if doc.len() != table.len() {
            return Err(unsupported(0, "nested keys are not supported".into()));
        }
        Ok(doc)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the backing file.
    pub fn reload(&self) -> Result<Self, DocumentError> {
        Self::load(&self.path, None)
    }

    /// Copy the text of the last load to `<file>.<timestamp>.bak`.
    pub fn backup(&self) -> Result<PathBuf, DocumentError> {
        let backup = self.backup_path(Local::now());
        fs::write(&backup, &self.source).map_err(|e| DocumentError::io(&backup, e))?;
        tracing::debug!(path = %backup.display(), "Backup written");
        Ok(backup)
    }

    /// Backup file name for a backup taken at `at`.
    pub(crate) fn backup_path(&self, at: DateTime<Local>) -> PathBuf {
        self.sibling(&format!("{}.bak", at.format("%Y%m%d-%H%M%S")))
    }

    /// Write the document back to its file.
    pub fn save(&self) -> Result<(), DocumentError> {
        let tmp = self.sibling("tmp");
        fs::write(&tmp, self.render()).map_err(|e| DocumentError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| DocumentError::io(&self.path, e))
    }

    /// `<file>.<suffix>` next to the backing file.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path.with_file_name(format!("{}.{}", file_name, suffix))
    }

    /// The document as it would be written to disk.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match &line.kind {
                LineKind::Blank => {}
                LineKind::Comment(text) => out.push_str(text),
                LineKind::Entry { raw: Some(raw), .. } => out.push_str(raw),
                LineKind::Entry { key, value, raw: None } => {
                    out.push_str(&format!("{} = {}", render_key(key), value));
                }
            }
            out.push_str(line.eol);
        }
        out
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.position(key).and_then(|idx| match &self.lines[idx].kind {
            LineKind::Entry { value, .. } => Some(value),
            _ => None,
        })
    }

    /// Boolean at `key`, or `default` when absent or of another type.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            _ => default,
        }
    }

    /// Integer at `key`, or `default` when absent or of another type.
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Some(Value::Integer(i)) => *i,
            _ => default,
        }
    }

    /// String at `key`, or `default` when absent or of another type.
    pub fn get_string<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.get(key) {
            Some(Value::String(s)) => s,
            _ => default,
        }
    }

    /// Comment lines directly above `key`, without the leading `#`.
    pub fn comment(&self, key: &str) -> Option<String> {
        let idx = self.position(key)?;
        let mut collected = Vec::new();
        for line in self.lines[..idx].iter().rev() {
            match &line.kind {
                LineKind::Comment(text) => {
                    collected.push(text.trim().trim_start_matches('#').trim().to_string());
                }
                _ => break,
            }
        }
        if collected.is_empty() {
            return None;
        }
        collected.reverse();
        Some(collected.join("\n"))
    }

    /// Set `key` to `value`.
    ///
    /// A new key is appended after a blank line, preceded by `comment`, using
    /// the line ending that dominates the file. An existing key keeps its
    /// position and comment.
    pub fn set(&mut self, key: &str, value: impl Into<Value>, comment: &str) {
        let value = value.into();
        if let Some(idx) = self.position(key) {
            if let LineKind::Entry { value: current, raw, .. } = &mut self.lines[idx].kind {
                if *current != value {
                    *current = value;
                    *raw = None;
                }
            }
            return;
        }

        let newline = self.newline;
        match self.lines.last_mut() {
            None => {}
            Some(last) => {
                if last.eol.is_empty() {
                    last.eol = newline;
                }
                if !matches!(last.kind, LineKind::Blank) {
                    self.lines.push(Line { kind: LineKind::Blank, eol: newline });
                }
            }
        }
        for text in comment.lines().filter(|l| !l.trim().is_empty()) {
            self.lines.push(Line { kind: LineKind::Comment(format!("# {}", text.trim())), eol: newline });
        }
        self.lines.push(Line {
            kind: LineKind::Entry { key: key.to_string(), value, raw: None },
            eol: newline,
        });
    }

    /// Keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match &line.kind {
            LineKind::Entry { key, .. } => Some(key.as_str()),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.keys().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| matches!(&line.kind, LineKind::Entry { key: k, .. } if k == key))
    }
}

fn is_bare_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn render_key(key: &str) -> String {
    if is_bare_key(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Single-line TOML basic string.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<ConfigDocument, DocumentError> {
        ConfigDocument::parse(Path::new("test.toml"), text.to_string())
    }

    #[test]
    fn test_typed_accessors() {
        let doc = parse("flag = true\nprice = 42\nname = \"lang.toml\"\n").unwrap();

        assert!(doc.get_bool("flag", false));
        assert_eq!(doc.get_int("price", 0), 42);
        assert_eq!(doc.get_string("name", "x"), "lang.toml");

        // Wrong type or missing key falls back to the default
        assert_eq!(doc.get_int("flag", 7), 7);
        assert!(!doc.get_bool("missing", false));
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["flag", "price", "name"]);
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let doc = parse("showHealth = true\n").unwrap();
        assert!(doc.contains("showHealth"));
        assert!(!doc.contains("showhealth"));
    }

    #[test]
    fn test_render_preserves_untouched_text() {
        let text = "# Name of the language file.\nlanguageFileName=\"lang.toml\"   # inline\n\nfreePetPrice = 5\n";
        let doc = parse(text).unwrap();
        assert_eq!(doc.render(), text);
        assert_eq!(doc.comment("languageFileName").as_deref(), Some("Name of the language file."));
        assert_eq!(doc.comment("freePetPrice"), None);
    }

    #[test]
    fn test_set_appends_with_comment() {
        let mut doc = parse("checkForUpdate = false\n").unwrap();
        doc.set("freePetPrice", 0, "Price of the /petm free command.");

        assert_eq!(
            doc.render(),
            "checkForUpdate = false\n\n# Price of the /petm free command.\nfreePetPrice = 0\n"
        );
        assert_eq!(doc.comment("freePetPrice").as_deref(), Some("Price of the /petm free command."));
    }

    #[test]
    fn test_set_existing_key_keeps_position() {
        let mut doc = parse("# header\na = 1\nb = 2\n").unwrap();
        doc.set("a", 10, "ignored");

        assert_eq!(doc.render(), "# header\na = 10\nb = 2\n");
    }

    #[test]
    fn test_string_values_are_escaped() {
        let mut doc = parse("").unwrap();
        doc.set("petmaster-prefix", "<gray>[\"x\"] ", "");

        let reparsed = parse(&doc.render()).unwrap();
        assert_eq!(reparsed.get_string("petmaster-prefix", ""), "<gray>[\"x\"] ");
    }

    #[test]
    fn test_multiline_string_stays_on_one_line() {
        let mut doc = parse("").unwrap();
        doc.set("help", "line one\nline two", "");

        let rendered = doc.render();
        assert_eq!(rendered.lines().count(), 1);
        assert_eq!(parse(&rendered).unwrap().get_string("help", ""), "line one\nline two");
    }

    #[test]
    fn test_rejects_invalid_syntax() {
        let err = parse("checkForUpdate = = true\n").unwrap_err();
        assert!(matches!(err, DocumentError::Parse { .. }));
        assert!(err.is_syntax());
    }

    #[test]
    fn test_rejects_sections_and_arrays() {
        assert!(matches!(parse("[section]\na = 1\n"), Err(DocumentError::Unsupported { .. })));
        assert!(matches!(parse("a = [1, 2]\n"), Err(DocumentError::Unsupported { .. })));
        assert!(matches!(parse("a.b = 1\n"), Err(DocumentError::Unsupported { .. })));
    }

    #[test]
    fn test_load_seeds_defaults_and_backs_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let doc = ConfigDocument::load(&path, Some("showHealth = true\n")).unwrap();
        assert!(doc.get_bool("showHealth", false));
        assert!(path.exists());

        let backup = doc.backup().unwrap();
        assert_eq!(fs::read_to_string(&backup).unwrap(), "showHealth = true\n");
        assert_eq!(backup.extension().and_then(|e| e.to_str()), Some("bak"));
    }

    #[test]
    fn test_load_missing_without_defaults_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigDocument::load(&dir.path().join("nope.toml"), None).unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
        assert!(!err.is_syntax());
    }

    #[test]
    fn test_quoted_keys_resolve_like_toml() {
        let doc = parse("\"a=b\" = \"x\"\n\"esc\\u0041\" = 2\n'lit' = true\n").unwrap();
        assert_eq!(doc.get_string("a=b", ""), "x");
        assert_eq!(doc.get_int("escA", 0), 2);
        assert!(doc.get_bool("lit", false));
        assert_eq!(doc.render(), "\"a=b\" = \"x\"\n\"esc\\u0041\" = 2\n'lit' = true\n");
    }

    #[test]
    fn test_crlf_lines_keep_their_endings() {
        let text = "# tuned\r\ncheckForUpdate = false\r\n\r\ncustomKey = 3\r\n";
        let mut doc = parse(text).unwrap();
        assert_eq!(doc.render(), text);

        doc.set("freePetPrice", 0, "Price");
        assert_eq!(
            doc.render(),
            "# tuned\r\ncheckForUpdate = false\r\n\r\ncustomKey = 3\r\n\r\n# Price\r\nfreePetPrice = 0\r\n"
        );
    }

    #[test]
    fn test_unterminated_last_line_is_kept_until_append() {
        let mut doc = parse("a = 1").unwrap();
        assert_eq!(doc.render(), "a = 1");

        doc.set("b", 2, "");
        assert_eq!(doc.render(), "a = 1\n\nb = 2\n");
    }

    #[test]
    fn test_temp_files_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let toml = ConfigDocument::load(&dir.path().join("config.toml"), Some("a = 1\n")).unwrap();
        let yml = ConfigDocument::load(&dir.path().join("config.yml"), Some("b = 2\n")).unwrap();
        assert_ne!(toml.sibling("tmp"), yml.sibling("tmp"));
        assert_eq!(toml.sibling("tmp"), dir.path().join("config.toml.tmp"));

        toml.save().unwrap();
        yml.save().unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("config.yml")).unwrap(), "b = 2\n");
    }
}
