//! Page rendering with Jinja-syntax templates.
//!
//! Templates are loaded on demand from the site's templates directory:
//!
//! | Template     | Context                                |
//! |--------------|----------------------------------------|
//! | `index.html` | `site`, `author`, `posts`              |
//! | `post.html`  | `site`, `author`, `comments`, `post`   |
//!
//! Auto-escaping is off: templates print `content_html` as-is.

use crate::{config::SiteConfig, post::Post};
use anyhow::{Context, Result};
use minijinja::{AutoEscape, Environment, context};
use std::path::Path;

pub const INDEX_TEMPLATE: &str = "index.html";
pub const POST_TEMPLATE: &str = "post.html";

/// Renders pages for one site.
pub struct PageRenderer<'a> {
    env: Environment<'static>,
    config: &'a SiteConfig,
}

impl<'a> PageRenderer<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self::with_templates(config, &config.templates_dir())
    }

    pub fn with_templates(config: &'a SiteConfig, templates_dir: &Path) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(templates_dir));
        env.set_auto_escape_callback(|_| AutoEscape::None);
        Self { env, config }
    }

    /// Render the home page listing `posts`.
    pub fn render_index(&self, posts: &[Post]) -> Result<String> {
        let template = self
            .env
            .get_template(INDEX_TEMPLATE)
            .with_context(|| format!("failed to load {INDEX_TEMPLATE}"))?;
        template
            .render(context! {
                site => &self.config.site,
                author => &self.config.author,
                posts => posts,
            })
            .with_context(|| format!("failed to render {INDEX_TEMPLATE}"))
    }

    /// Render a single post page.
    pub fn render_post(&self, post: &Post) -> Result<String> {
        let template = self
            .env
            .get_template(POST_TEMPLATE)
            .with_context(|| format!("failed to load {POST_TEMPLATE}"))?;
        template
            .render(context! {
                site => &self.config.site,
                author => &self.config.author,
                comments => &self.config.comments,
                post => post,
            })
            .with_context(|| format!("failed to render {POST_TEMPLATE} for {}", post.slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::{MarkdownOptions, parse_post};
    use crate::utils::date::parse_naive;
    use std::fs;
    use std::path::PathBuf;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn config() -> SiteConfig {
        SiteConfig::from_str(
            r#"{
                "site": {"title": "Notes", "url": "https://example.com", "tagline": "short thoughts"},
                "author": {"name": "Ann", "bio": "writes things"},
                "comments": {"repo": "ann/notes"}
            }"#,
        )
        .unwrap()
    }

    fn post(name: &str, content: &str) -> Post {
        let now = parse_naive("2026-03-01 12:00:00").unwrap();
        let root = PathBuf::from("/site");
        parse_post(
            &root.join("posts").join(name),
            content,
            &root,
            &MarkdownOptions::default(),
            now,
        )
    }

    fn templates(index: &str, post: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(INDEX_TEMPLATE), index).unwrap();
        fs::write(dir.path().join(POST_TEMPLATE), post).unwrap();
        dir
    }

    #[test]
    fn test_render_index() {
        let config = config();
        let dir = templates(
            "{{ site.title }} by {{ author.name }} ({{ site.tagline }}): {% for p in posts %}[{{ p.slug }}:{{ p.type }}]{% endfor %}",
            "",
        );
        let renderer = PageRenderer::with_templates(&config, dir.path());

        let posts = vec![post("b.md", "second"), post("a.md", "first")];
        let html = renderer.render_index(&posts).unwrap();
        assert_eq!(html, "Notes by Ann (short thoughts): [b:original][a:original]");
    }

    #[test]
    fn test_render_post_without_escaping() {
        let config = config();
        let dir = templates(
            "",
            "<h1>{{ post.title }}</h1>{{ post.content_html }}{{ comments.repo }}{% if post.quote %}<q>{{ post.quote.source_html }}</q>{% endif %}",
        );
        let renderer = PageRenderer::with_templates(&config, dir.path());

        let html = renderer
            .render_post(&post(
                "p.md",
                "---\ntitle: Hi & bye\n---\nA **bold** claim\n\n> **From [@x](https://x.com/x)**:\n> quoted",
            ))
            .unwrap();
        assert_eq!(
            html,
            "<h1>Hi & bye</h1><p>A <strong>bold</strong> claim</p>\nann/notes<q><a href=\"https://x.com/x\" target=\"_blank\" rel=\"noopener\">@x</a></q>"
        );
    }

    #[test]
    fn test_missing_template_is_error() {
        let config = config();
        let dir = TempDir::new().unwrap();
        let renderer = PageRenderer::with_templates(&config, dir.path());
        assert!(renderer.render_index(&[]).is_err());
    }

    #[test]
    fn test_template_error_is_reported() {
        let config = config();
        let dir = templates("", "{{ post.title | no_such_filter }}");
        let renderer = PageRenderer::with_templates(&config, dir.path());
        let err = renderer.render_post(&post("p.md", "body")).unwrap_err();
        assert!(format!("{err:#}").contains("post.html"));
    }
}
