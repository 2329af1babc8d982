use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::{
    config::SiteConfig,
    debug,
    generator::render::PageRenderer,
    log,
    post::Post,
    utils::{
        fs::{copy_dir, write_file},
        plural_count,
    },
};

const POST_DIR: &str = "post";
const STATIC_DIR: &str = "static";

/// Ensure the output directory and `post/` exist.
pub(super) fn init_output(output: &Path) -> Result<()> {
    let post_dir = output.join(POST_DIR);
    fs::create_dir_all(&post_dir)
        .with_context(|| format!("Failed to create output directory: {}", post_dir.display()))
}

/// Replace `<output>/static` with the site's static directory.
///
/// Returns `None` when the site has no static directory.
pub(super) fn copy_static(config: &SiteConfig, output: &Path) -> Result<Option<usize>> {
    let source = config.static_dir();
    if !source.is_dir() {
        log!("skip"; "no static directory at {}", source.display());
        return Ok(None);
    }

    let copied = copy_dir(&source, &output.join(STATIC_DIR))?;
    log!("build"; "copied {}", plural_count(copied, "static file"));
    Ok(Some(copied))
}

pub(super) fn write_index(renderer: &PageRenderer<'_>, posts: &[Post], output: &Path) -> Result<()> {
    let html = renderer.render_index(posts)?;
    write_file(&output.join("index.html"), &html)
}

/// Render every post page. Failures are logged and counted.
///
/// Returns `(written, failed)`.
pub(super) fn write_posts(
    renderer: &PageRenderer<'_>,
    posts: &[Post],
    output: &Path,
) -> (usize, usize) {
    let post_dir = output.join(POST_DIR);
    let mut written = 0;
    let mut failed = 0;

    for post in posts {
        let path = post_dir.join(format!("{}.html", post.slug));
        match renderer
            .render_post(post)
            .and_then(|html| write_file(&path, &html))
        {
            Ok(()) => {
                debug!("build"; "{}", path.display());
                written += 1;
            }
            Err(e) => {
                log!("error"; "{}: {:#}", post.source_file, e);
                failed += 1;
            }
        }
    }

    (written, failed)
}
