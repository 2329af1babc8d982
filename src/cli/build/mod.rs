//! Site building orchestration.
//!
//! Build pipeline phases:
//! - **Init** - Create the output directory and `post/`
//! - **Static** - Replace `<output>/static` with a fresh copy
//! - **Load** - Parse every post under the posts directory
//! - **Render** - `index.html` (fatal on failure) and one page per post
//! - **Feed** - `feed.xml`

mod pipeline;

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};

use crate::{
    cli::BuildArgs,
    config::SiteConfig,
    generator::{feed, render::PageRenderer},
    log,
    post::load_posts,
    utils::plural_count,
};

/// Outcome of a site build.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub posts: usize,
    pub pages_written: usize,
    pub pages_failed: usize,
    pub static_files: Option<usize>,
}

/// Entry point for `chirp build`.
pub fn run(args: &BuildArgs) -> Result<()> {
    let mut config = SiteConfig::load(&args.config)?;
    config.apply_args(args)?;

    let now = config.site.localize(Utc::now())?;
    let report = build_site(&config, now)?;
    if report.pages_failed > 0 {
        log!("warning"; "{} failed to render", plural_count(report.pages_failed, "page"));
    }
    Ok(())
}

/// Build the entire site into `config.output_dir()`.
///
/// Pipeline: init -> static -> load -> render -> feed
pub fn build_site(config: &SiteConfig, now: DateTime<FixedOffset>) -> Result<BuildReport> {
    let output = config.output_dir();
    pipeline::init_output(&output)?;

    let static_files = pipeline::copy_static(config, &output)?;

    let posts = load_posts(
        &config.posts_dir(),
        &config.root,
        &config.markdown,
        now.naive_local(),
    );
    log!("build"; "found {}", plural_count(posts.len(), "post"));

    let renderer = PageRenderer::new(config);
    pipeline::write_index(&renderer, &posts, &output)?;
    let (pages_written, pages_failed) = pipeline::write_posts(&renderer, &posts, &output);

    feed::build_rss(config, &posts, now)?;

    log!("build"; "done: {} in {}", plural_count(pages_written, "page"), output.display());
    Ok(BuildReport {
        posts: posts.len(),
        pages_written,
        pages_failed,
        static_files,
    })
}
