//! Configuration management.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section      # config.json sections (site, author, build)
//! ├── provider     # providers.json (HealthConfig)
//! ├── credentials  # API key store
//! ├── error        # ConfigError
//! └── mod.rs       # SiteConfig (this file)
//! ```
//!
//! # Files
//!
//! | File             | Used by  | Purpose                                   |
//! |------------------|----------|-------------------------------------------|
//! | `config.json`    | `build`  | Site metadata, directories, markdown      |
//! | `providers.json` | `health` | Providers, probe settings, thresholds     |
//! | credentials      | `health` | `{"<provider id>": "<api key>"}` fallback |
//!
//! Both configurations are loaded once per run into immutable values and
//! passed by reference; there is no global config handle.

mod credentials;
mod error;
mod provider;
mod section;

pub use credentials::CredentialStore;
pub use error::ConfigError;
pub use provider::{
    HealthConfig, LatencyThreshold, ModelConfig, ProbeSettings, ProviderConfig, Thresholds,
};
pub use section::{AuthorInfo, BuildSection, SiteInfo};

use crate::{cli::BuildArgs, post::MarkdownOptions, utils::fs::normalize_path};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing config.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site root - parent of the config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Site metadata
    #[serde(default)]
    pub site: SiteInfo,

    /// Author metadata
    #[serde(default)]
    pub author: AuthorInfo,

    /// Comment widget settings, passed as-is to `post.html`
    #[serde(default)]
    pub comments: Map<String, Value>,

    /// Build directories and limits
    #[serde(default)]
    pub build: BuildSection,

    /// Markdown extensions
    #[serde(default)]
    pub markdown: MarkdownOptions,
}

impl SiteConfig {
    /// Load and validate configuration from a file.
    ///
    /// The site root is the config file's parent directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let mut config: Self = content.parse()?;
        let config_path = normalize_path(path);
        config.root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        config.validate()?;
        Ok(config)
    }

    /// Apply build arguments from CLI, then re-validate.
    pub fn apply_args(&mut self, args: &BuildArgs) -> Result<(), ConfigError> {
        if let Some(output) = &args.output {
            self.build.output = normalize_path(output);
        }
        // Override site URL if provided via CLI
        if let Some(url) = &args.site_url {
            self.site.url = url.clone();
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.site.validate()
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.root_join(&self.build.posts)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root_join(&self.build.templates)
    }

    pub fn static_dir(&self) -> PathBuf {
        self.root_join(&self.build.static_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root_join(&self.build.output)
    }
}

impl FromStr for SiteConfig {
    type Err = ConfigError;

    /// Parse configuration from a JSON string (no validation).
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"{"site": {"title": "Notes", "url": "https://example.com"}}"#;

    fn build_args(output: Option<&str>, site_url: Option<&str>) -> BuildArgs {
        BuildArgs {
            config: PathBuf::from("config.json"),
            output: output.map(PathBuf::from),
            site_url: site_url.map(str::to_string),
        }
    }

    #[test]
    fn test_load_sets_root() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, MINIMAL).unwrap();

        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.root, normalize_path(dir.path()));
        assert_eq!(config.output_dir(), normalize_path(dir.path()).join("docs"));
        assert_eq!(config.site.title, "Notes");
        assert!(config.comments.is_empty());
        assert!(config.markdown.hard_breaks);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = SiteConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(SiteConfig::load(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_load_rejects_bad_url() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"site": {"url": "example.com"}}"#).unwrap();
        assert!(matches!(
            SiteConfig::load(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_full_config() {
        let config = SiteConfig::from_str(
            r#"{
                "site": {"title": "T", "url": "https://x.dev", "language": "zh-CN", "utc_offset": "+08:00"},
                "author": {"name": "Ann", "bio": "writes", "avatar": "a.png"},
                "comments": {"repo": "ann/blog"},
                "build": {"posts": "content", "feed_limit": 5},
                "markdown": {"footnotes": false}
            }"#,
        )
        .unwrap();

        assert_eq!(config.site.language, "zh-CN");
        assert_eq!(config.author.extra["avatar"], "a.png");
        assert_eq!(config.comments["repo"], "ann/blog");
        assert_eq!(config.build.posts, PathBuf::from("content"));
        assert_eq!(config.build.feed_limit, 5);
        assert!(!config.markdown.footnotes);
        assert!(config.markdown.tables);
    }

    #[test]
    fn test_parse_skips_validation() {
        let config: SiteConfig = r#"{"site": {"url": "not a url"}}"#.parse().unwrap();
        assert_eq!(config.site.url, "not a url");
        assert!(config.validate().is_err());

        assert!(matches!(
            "{".parse::<SiteConfig>(),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_apply_args_overrides() {
        let mut config = MINIMAL.parse::<SiteConfig>().unwrap();
        config.root = PathBuf::from("/site");

        config
            .apply_args(&build_args(Some("/tmp/out"), Some("https://other.dev")))
            .unwrap();
        assert_eq!(config.site.url, "https://other.dev");
        assert_eq!(config.output_dir(), PathBuf::from("/tmp/out"));

        let err = config.apply_args(&build_args(None, Some("nope")));
        assert!(err.is_err());
    }
}
