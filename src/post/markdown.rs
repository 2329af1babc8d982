//! Markdown to HTML conversion using pulldown-cmark.

use pulldown_cmark::{Event, Options, Parser, html};
use serde::{Deserialize, Serialize};

/// Options for markdown conversion (the `markdown` section of config.json)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    /// Enable tables extension
    pub tables: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Enable strikethrough extension
    pub strikethrough: bool,
    /// Enable task lists extension
    pub task_lists: bool,
    /// Enable heading attributes extension (e.g., `# Heading {#custom-id}`)
    pub heading_attributes: bool,
    /// Render every line break as `<br />` (micro-blog posts are written line by line)
    pub hard_breaks: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
            hard_breaks: true,
        }
    }
}

impl MarkdownOptions {
    /// Plain CommonMark: no extensions, soft breaks kept.
    #[cfg(test)]
    pub const fn commonmark() -> Self {
        Self {
            tables: false,
            footnotes: false,
            strikethrough: false,
            task_lists: false,
            heading_attributes: false,
            hard_breaks: false,
        }
    }

    /// Convert to pulldown-cmark Options
    fn to_pulldown_options(self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        opts
    }
}

/// Render markdown to an HTML fragment.
pub fn render_html(markdown: &str, options: &MarkdownOptions) -> String {
    let parser = Parser::new_ext(markdown, options.to_pulldown_options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);

    if options.hard_breaks {
        let events = parser.map(|event| match event {
            Event::SoftBreak => Event::HardBreak,
            other => other,
        });
        html::push_html(&mut out, events);
    } else {
        html::push_html(&mut out, parser);
    }
    out
}
