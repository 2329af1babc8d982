//! Post loading.
//!
//! Turns every Markdown file under the posts directory into a [`Post`]:
//!
//! ```text
//! posts/**/*.md ─► front-matter ─► quote blocks ─► markdown ─► Post
//! ```
//!
//! Files are sorted by path and reversed, so timestamped filenames
//! (`2026-02-06-233000.md`) come out newest first.

mod frontmatter;
mod markdown;
mod quote;

pub use markdown::MarkdownOptions;
pub use quote::Quote;

use frontmatter::{FrontMatter, split_frontmatter};
use markdown::render_html;
use quote::extract_quotes;

use crate::log;
use crate::utils::{date, fs::collect_files_with_ext, truncate_chars};
use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

const TITLE_CHARS: usize = 50;
const EXCERPT_CHARS: usize = 200;

/// `YYYY-MM-DD-HHMMSS` at the start of a file stem.
static RE_STEM_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})-(\d{2})(\d{2})(\d{2})").expect("stem date pattern is valid")
});

/// Kind of post, serialized as `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Original,
    Repost,
    /// Any other `type:` value, passed through to templates.
    #[serde(untagged)]
    Other(String),
}

impl PostKind {
    fn from_meta(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::Original,
            Some(v) if v.eq_ignore_ascii_case("original") => Self::Original,
            Some(v) if v.eq_ignore_ascii_case("repost") => Self::Repost,
            Some(v) => Self::Other(v.to_string()),
        }
    }
}

/// A single micro-blog post, as handed to templates and the feed.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: PostKind,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<BTreeMap<String, i64>>,
    pub content: String,
    pub content_html: String,
    pub quote: Option<Quote>,
    pub quotes: Vec<Quote>,
    pub source_file: String,
}

/// Load every post under `posts_dir`, newest first.
///
/// Unreadable files are logged and skipped. `now` is the fallback date for
/// posts that carry no date at all.
pub fn load_posts(
    posts_dir: &Path,
    root: &Path,
    options: &MarkdownOptions,
    now: NaiveDateTime,
) -> Vec<Post> {
    let mut files = collect_files_with_ext(posts_dir, "md");
    files.reverse();

    files
        .iter()
        .filter_map(|path| match std::fs::read_to_string(path) {
            Ok(content) => Some(parse_post(path, &content, root, options, now)),
            Err(e) => {
                log!("error"; "skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}

/// Build a [`Post`] from a file's path and content.
pub fn parse_post(
    path: &Path,
    content: &str,
    root: &Path,
    options: &MarkdownOptions,
    now: NaiveDateTime,
) -> Post {
    let (meta, body) = split_frontmatter(content);
    let (body, quotes) = extract_quotes(body);

    let slug = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let title = meta
        .text("title")
        .map(str::to_string)
        .unwrap_or_else(|| derive_title(&body));

    let tags = meta.list("tags").unwrap_or_default();
    let mut kind = PostKind::from_meta(meta.text("type"));
    if tags.iter().any(|t| t.eq_ignore_ascii_case("repost")) {
        kind = PostKind::Repost;
    }

    let date = meta
        .text("date")
        .or_else(|| meta.text("time"))
        .map(str::to_string)
        .or_else(|| date_from_stem(&slug))
        .unwrap_or_else(|| date::format_display(now));

    let source_file = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");

    Post {
        excerpt: truncate_chars(&body, EXCERPT_CHARS).replace('\n', " "),
        content_html: render_html(&body, options),
        mood: parse_mood(&meta),
        quote: quotes.first().cloned(),
        quotes,
        content: body,
        slug,
        title,
        date,
        kind,
        tags,
        source_file,
    }
}

fn derive_title(body: &str) -> String {
    let head = truncate_chars(body, TITLE_CHARS);
    if head.len() < body.len() {
        format!("{head}...")
    } else {
        head.to_string()
    }
}

/// `2026-02-06-233000-note` → `2026-02-06 23:30:00`
fn date_from_stem(stem: &str) -> Option<String> {
    let caps = RE_STEM_DATE.captures(stem)?;
    Some(format!("{} {}:{}:{}", &caps[1], &caps[2], &caps[3], &caps[4]))
}

/// Parse `mood: happiness=80, energy=66`. Pairs without an integer value are ignored.
fn parse_mood(meta: &FrontMatter) -> Option<BTreeMap<String, i64>> {
    let pairs = meta.list("mood")?;
    let mood: BTreeMap<_, _> = pairs
        .iter()
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let key = key.trim();
            let value = value.trim().parse::<i64>().ok()?;
            (!key.is_empty()).then(|| (key.to_string(), value))
        })
        .collect();
    (!mood.is_empty()).then_some(mood)
}
