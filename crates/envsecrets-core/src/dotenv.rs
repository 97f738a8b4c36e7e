//! Dotenv-style `KEY=VALUE` files
//!
//! The format shared by the project's linking file (`.env`) and the
//! user-scoped secrets file (`.secrets`): one entry per line, blank
//! lines and `#` comments ignored, optional `export ` prefix, values
//! optionally wrapped in matching single or double quotes.

use std::fs;
use std::io;
use std::path::Path;

/// Characters that force a value to be double-quoted on write.
const QUOTE_TRIGGERS: [char; 5] = [' ', '=', '#', '\'', '"'];

/// Ordered key/value entries parsed from a dotenv-style file.
///
/// Keys are unique and keep their first-seen position; a later entry
/// for the same key overwrites the value in place (last occurrence
/// wins when parsing hand-edited files with duplicates). Lookup is a
/// linear scan, which is fine for the tens of entries these files hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMap {
    entries: Vec<(String, String)>,
}

impl EnvMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Insert or overwrite a key, keeping an existing key's position.
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    /// Remove a key. Returns whether it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        self.entries.len() != before
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

/// Parse a dotenv-style file. A missing file is an empty map.
pub fn parse(path: &Path) -> io::Result<EnvMap> {
    let mut map = EnvMap::new();
    if !path.exists() {
        return Ok(map);
    }

    let content = fs::read_to_string(path)?;
    for raw_line in content.lines() {
        if let Some((key, value)) = parse_line(raw_line) {
            map.insert(key, value);
        }
    }
    Ok(map)
}

/// Parse one line into a key/value pair, or `None` for blank lines,
/// comments, and lines without `=`.
fn parse_line(raw: &str) -> Option<(&str, &str)> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), strip_quotes(value.trim())))
}

/// Strip one pair of matching single or double quotes wrapping a value.
fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[0] == bytes[bytes.len() - 1]
    {
        return &value[1..value.len() - 1];
    }
    value
}

/// Insert or update a single key in a dotenv file, preserving every
/// other byte of the file. A line defining the key is replaced in
/// place; otherwise the entry is appended (on its own line, even when
/// the existing content lacks a trailing newline). A missing file is
/// created.
pub fn upsert(path: &Path, key: &str, value: &str) -> io::Result<()> {
    let content = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut out = String::with_capacity(content.len() + key.len() + value.len() + 2);
    let mut replaced = false;

    for raw in content.split_inclusive('\n') {
        let stripped = raw.trim();
        let defines_key = !stripped.is_empty()
            && !stripped.starts_with('#')
            && stripped
                .split_once('=')
                .is_some_and(|(k, _)| k.trim() == key);

        // Every line defining the key is replaced, so a hand-edited
        // duplicate cannot shadow the new value under last-wins parsing.
        if defines_key {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
            replaced = true;
        } else {
            out.push_str(raw);
        }
    }

    if !replaced {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }

    fs::write(path, out)
}

/// Wrap a value in double quotes when it contains a character that
/// would break the line format. Embedded double quotes are not
/// escaped, so values containing `"` are not round-trip safe.
pub fn quote_if_needed(value: &str) -> String {
    if value.contains(&QUOTE_TRIGGERS[..]) {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}
