//! RSS 2.0 feed generation.
//!
//! Writes `<output>/feed.xml` from the loaded posts, newest first, limited
//! to `build.feed_limit` items.

use crate::{
    config::SiteConfig,
    log,
    post::Post,
    utils::{date, fs::write_file, truncate_chars},
};
use anyhow::{Result, anyhow};
use chrono::{DateTime, FixedOffset};
use rss::extension::atom::{AtomExtension, Link};
use rss::validation::Validate;
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use std::path::PathBuf;

pub const FEED_FILE: &str = "feed.xml";

const GENERATOR: &str = "chirp";
const ITEM_TITLE_CHARS: usize = 100;

/// Build and write the RSS feed. Returns the written path.
pub fn build_rss(
    config: &SiteConfig,
    posts: &[Post],
    build_time: DateTime<FixedOffset>,
) -> Result<PathBuf> {
    RssFeed::build(config, posts, build_time).write()
}

struct RssFeed<'a> {
    config: &'a SiteConfig,
    posts: &'a [Post],
    build_time: DateTime<FixedOffset>,
}

impl<'a> RssFeed<'a> {
    fn build(config: &'a SiteConfig, posts: &'a [Post], build_time: DateTime<FixedOffset>) -> Self {
        let limit = config.build.feed_limit.min(posts.len());
        Self {
            config,
            posts: &posts[..limit],
            build_time,
        }
    }

    fn into_channel(self) -> Result<Channel> {
        let site = &self.config.site;
        let base_url = site.base_url();
        let offset = site.offset()?;

        let items: Vec<Item> = self
            .posts
            .iter()
            .map(|post| post_to_item(post, base_url, offset))
            .collect();

        let mut self_link = Link::default();
        self_link.set_href(format!("{base_url}/{FEED_FILE}"));
        self_link.set_rel("self");
        self_link.set_mime_type(Some("application/rss+xml".to_string()));

        let mut atom = AtomExtension::default();
        atom.set_links(vec![self_link]);

        let channel = ChannelBuilder::default()
            .title(format!("{} - {}", self.config.author.name, site.title))
            .link(site.url.clone())
            .description(self.config.author.bio.clone())
            .language(Some(site.language.clone()))
            .last_build_date(Some(self.build_time.to_rfc2822()))
            .generator(Some(GENERATOR.to_string()))
            .atom_ext(Some(atom))
            .items(items)
            .build();

        channel
            .validate()
            .map_err(|e| anyhow!("invalid RSS feed: {e}"))?;
        Ok(channel)
    }

    fn into_xml(self) -> Result<String> {
        Ok(self.into_channel()?.to_string())
    }

    fn write(self) -> Result<PathBuf> {
        let path = self.config.output_dir().join(FEED_FILE);
        let count = self.posts.len();
        let xml = self.into_xml()?;
        write_file(&path, &xml)?;

        log!("rss"; "{} ({} items)", FEED_FILE, count);
        Ok(path)
    }
}

fn post_to_item(post: &Post, base_url: &str, offset: FixedOffset) -> Item {
    let link = format!("{base_url}/post/{}.html", post.slug);
    let guid = GuidBuilder::default()
        .value(link.clone())
        .permalink(true)
        .build();

    let pub_date = date::to_rfc2822(&post.date, offset);
    if pub_date.is_none() {
        crate::debug!("rss"; "unparseable date `{}` in {}, omitting pubDate", post.date, post.slug);
    }

    ItemBuilder::default()
        .title(Some(truncate_chars(&post.title, ITEM_TITLE_CHARS).to_string()))
        .link(Some(link))
        .guid(Some(guid))
        .description(Some(post.content_html.clone()))
        .pub_date(pub_date)
        .build()
}
