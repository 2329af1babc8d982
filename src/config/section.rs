//! `config.json` sections: `site`, `author`, `build`.
//!
//! `site` and `author` keep unknown keys in `extra`, which is flattened back
//! when the section is handed to templates.

use super::ConfigError;
use crate::utils::date::parse_utc_offset;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Site metadata for templates and the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteInfo {
    /// Site title.
    pub title: String,

    /// Public site URL (e.g., "https://example.com/blog").
    pub url: String,

    /// Language code (e.g., "en", "zh-CN").
    pub language: String,

    /// Offset applied to post dates that carry none, e.g. "+08:00".
    pub utc_offset: String,

    /// Custom keys, passed through to templates.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            language: "en".into(),
            utc_offset: "+00:00".into(),
            extra: Map::new(),
        }
    }
}

impl SiteInfo {
    /// Site URL without trailing slash, ready for joining paths.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Parsed `utc_offset`.
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        parse_utc_offset(&self.utc_offset).ok_or_else(|| {
            ConfigError::Validation(format!(
                "site.utc_offset `{}` is not a valid offset, use format like +08:00",
                self.utc_offset
            ))
        })
    }

    /// `instant` expressed in the site's offset.
    pub fn localize(&self, instant: DateTime<Utc>) -> Result<DateTime<FixedOffset>, ConfigError> {
        Ok(instant.with_timezone(&self.offset()?))
    }

    /// Validate site configuration.
    ///
    /// # Checks
    /// - `url` must be a valid URL with http(s) scheme and a host
    /// - `utc_offset` must parse
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::Validation(
                "site.url is not configured, e.g.: \"https://example.com\"".into(),
            ));
        }

        let parsed = url::Url::parse(&self.url)
            .map_err(|e| ConfigError::Validation(format!("site.url: invalid URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "site.url: scheme '{}' not supported, must be http or https",
                parsed.scheme()
            )));
        }
        if parsed.host_str().is_none() {
            return Err(ConfigError::Validation(
                "site.url: URL must have a valid host".into(),
            ));
        }

        self.offset().map(|_| ())
    }
}

/// Author shown in templates and as the feed description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorInfo {
    pub name: String,
    pub bio: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `build` section: input/output directories, relative to the site root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Markdown posts directory.
    pub posts: PathBuf,

    /// Template directory containing `index.html` and `post.html`.
    pub templates: PathBuf,

    /// Static assets, copied to `<output>/static`.
    #[serde(rename = "static")]
    pub static_dir: PathBuf,

    /// Output directory.
    pub output: PathBuf,

    /// Maximum number of feed items.
    pub feed_limit: usize,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            posts: "posts".into(),
            templates: "templates".into(),
            static_dir: "static".into(),
            output: "docs".into(),
            feed_limit: 20,
        }
    }
}
