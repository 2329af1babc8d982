//! Front-matter parsing.
//!
//! A post may start with a block of `key: value` lines fenced by two lines
//! that are exactly `---`:
//!
//! ```text
//! ---
//! title: "Hello"
//! tags: [AI, Reflection]
//! mood: happiness=80, curiosity=90
//! ---
//! Body...
//! ```
//!
//! Anything else (no opening fence, no closing fence) is treated as a post
//! without metadata: the whole file becomes the body.

use std::collections::BTreeMap;

/// A front-matter value: plain text or an inline `[a, b]` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Text(String),
    List(Vec<String>),
}

/// Parsed front-matter fields, keyed by their original (case-preserved) name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    fields: BTreeMap<String, MetaValue>,
}

impl FrontMatter {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.fields.get(key)
    }

    /// Non-empty text value for `key`.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.fields.get(key)? {
            MetaValue::Text(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// List value for `key`. Text values are split on commas.
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        match self.fields.get(key)? {
            MetaValue::List(items) => Some(items.clone()),
            MetaValue::Text(s) => Some(
                s.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }
}

/// Split `content` into front-matter and body.
///
/// The body following a front-matter block is trimmed. Without a complete
/// block the metadata is empty and the body is `content` unchanged.
pub fn split_frontmatter(content: &str) -> (FrontMatter, &str) {
    match detect_frontmatter(content) {
        Some((fm, body)) => (parse_fields(fm), body.trim()),
        None => (FrontMatter::default(), content),
    }
}

/// Locate the fenced block. Returns `(frontmatter, body)`.
fn detect_frontmatter(content: &str) -> Option<(&str, &str)> {
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if !is_fence(first) {
        return None;
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if is_fence(line) {
            return Some((&content[start..offset], &content[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

#[inline]
fn is_fence(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == "---"
}

fn parse_fields(block: &str) -> FrontMatter {
    let mut fields = BTreeMap::new();

    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        fields.insert(key.to_string(), parse_value(value));
    }

    FrontMatter { fields }
}

/// Parse a raw value: strip surrounding quotes, recognize `[a, b]` lists.
fn parse_value(raw: &str) -> MetaValue {
    let value = strip_quotes(raw.trim());

    if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        let items = inner
            .split(',')
            .map(|item| strip_quotes(item.trim()))
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
        return MetaValue::List(items);
    }

    MetaValue::Text(value.to_string())
}

#[inline]
fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"').trim_matches('\'')
}
