//! Output generators.
//!
//! - **Render**: HTML pages from Jinja templates (`index.html`, `post/<slug>.html`)
//! - **Feed**: RSS 2.0 feed for readers (`feed.xml`)

pub mod feed;
pub mod render;
