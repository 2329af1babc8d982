//! Quote block extraction.
//!
//! Reposts carry the quoted text as a Markdown blockquote introduced by a
//! bold `From` header:
//!
//! ```text
//! > **From [@someone](https://x.com/someone)**:
//! > quoted content
//! > Fri Feb 06 2026
//! ```
//!
//! Each block is lifted out of the body into a [`Quote`] so templates can
//! render it separately.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// `> **From <source>**:` followed by one or more consecutive `>` lines.
static RE_QUOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^>[ \t]*\*\*From ([^*\n]+)\*\*:?[ \t]*\r?\n((?:>.*(?:\r?\n|$))+)")
        .expect("quote pattern is valid")
});

/// Markdown link `[text](url)` inside a quote source.
static RE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").expect("link pattern is valid"));

/// Trailing tweet-style date line, e.g. `Fri Feb 06 2026`.
static RE_QUOTE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w{3} \w{3} \d{2}").expect("date pattern is valid"));

/// A quoted passage lifted out of a post body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    /// Source as written, e.g. `X (@handle)` or `[@handle](url)`.
    pub source: String,
    /// Source with Markdown links rendered as anchors.
    pub source_html: String,
    /// Quoted text, one line per quoted line, without `>` markers.
    pub content: String,
    /// Trailing date line of the quote, if present.
    pub date: Option<String>,
}

/// Remove every quote block from `body`.
///
/// Returns the remaining body and the quotes in document order. When nothing
/// is removed the body is returned untouched; otherwise the text around the
/// removed blocks is trimmed and rejoined as separate paragraphs.
pub fn extract_quotes(body: &str) -> (String, Vec<Quote>) {
    let mut quotes = Vec::new();
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in RE_QUOTE.captures_iter(body) {
        let whole = caps.get_match();
        let source = caps.get(1).map_or("", |m| m.as_str());
        let block = caps.get(2).map_or("", |m| m.as_str());

        quotes.push(parse_quote(source, block));
        segments.push(&body[last..whole.start()]);
        last = whole.end();
    }

    if quotes.is_empty() {
        return (body.to_string(), quotes);
    }

    segments.push(&body[last..]);
    let remaining = segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    (remaining, quotes)
}

fn parse_quote(source: &str, block: &str) -> Quote {
    let source = source.trim().to_string();

    let mut lines: Vec<&str> = block
        .lines()
        .map(|line| line.strip_prefix('>').unwrap_or(line).trim())
        .filter(|line| !line.is_empty())
        .collect();

    let date = match lines.last() {
        Some(last) if lines.len() > 1 && RE_QUOTE_DATE.is_match(last) => {
            lines.pop().map(str::to_string)
        }
        _ => None,
    };

    let source_html = RE_LINK
        .replace_all(&source, r#"<a href="$2" target="_blank" rel="noopener">$1</a>"#)
        .into_owned();

    Quote {
        source_html,
        source,
        content: lines.join("\n"),
        date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_single_quote() {
        let body = "My take on this.\n\n> **From Alice (@alice)**:\n> Rust is fun\n> and fast\n\nMore thoughts.";
        let (rest, quotes) = extract_quotes(body);

        assert_eq!(rest, "My take on this.\n\nMore thoughts.");
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].source, "Alice (@alice)");
        assert_eq!(quotes[0].source_html, "Alice (@alice)");
        assert_eq!(quotes[0].content, "Rust is fun\nand fast");
        assert_eq!(quotes[0].date, None);
    }

    #[test]
    fn test_quote_at_end_of_file_without_newline() {
        let (rest, quotes) = extract_quotes("Comment\n> **From Bob**:\n> last line");
        assert_eq!(rest, "Comment");
        assert_eq!(quotes[0].content, "last line");
    }

    #[test]
    fn test_source_link_and_trailing_date() {
        let body = "> **From [@carol](https://x.com/carol)**:\n> shipping today\n> Fri Feb 06 2026\n";
        let (rest, quotes) = extract_quotes(body);

        assert!(rest.is_empty());
        let quote = &quotes[0];
        assert_eq!(quote.source, "[@carol](https://x.com/carol)");
        assert_eq!(
            quote.source_html,
            r#"<a href="https://x.com/carol" target="_blank" rel="noopener">@carol</a>"#
        );
        assert_eq!(quote.content, "shipping today");
        assert_eq!(quote.date.as_deref(), Some("Fri Feb 06 2026"));
    }

    #[test]
    fn test_multiple_quotes_all_removed() {
        let body = "> **From A**:\n> one\n\nmiddle\n\n> **From B**:\n> two\n";
        let (rest, quotes) = extract_quotes(body);
        assert_eq!(rest, "middle");
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[1].source, "B");
    }

    #[test]
    fn test_plain_blockquote_untouched() {
        let body = "> just a blockquote\n> nothing special\n";
        let (rest, quotes) = extract_quotes(body);
        assert!(quotes.is_empty());
        assert_eq!(rest, body);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let body = "Intro\n\n> **From Dave**:\n> quoted\n\nOutro\n";
        let (once, quotes) = extract_quotes(body);
        assert_eq!(quotes.len(), 1);

        let (twice, again) = extract_quotes(&once);
        assert!(again.is_empty());
        assert_eq!(twice, once);
    }
}
