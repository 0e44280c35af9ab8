//! Site configuration module.
//!
//! Handles loading and validating `site.toml`, the one file that describes
//! the site as a whole rather than a single piece of content.
//!
//! ## Config File Location
//!
//! ```text
//! source/
//! ├── site.toml                 # Site config (optional, stock defaults otherwise)
//! ├── build.toml                # Template list (optional, discovered otherwise)
//! ├── errors/404/index.html.jinja
//! ├── standalone/about/
//! ├── posts/2025-06-27-foo/
//! └── private/comments/         # Comment metadata and bodies, kept out of the public tree
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! url = "https://example.com"      # Canonical URL, no trailing slash
//! title = "Example Site"
//! author = "owner"                 # Alias into [users]
//! language = "en-US"
//! direction = "ltr"                # ltr | rtl | auto
//! tags = ["dance", "music", "photos", "technology", "videos"]
//! standalone = ["standalone/about/index.html.jinja"]
//!
//! [users.owner]
//! name = "Site Owner"
//! uri = "https://example.com/"
//! email_address = "owner@example.com"
//!
//! [pagination]
//! posts_per_page = 10
//! feed_entries = 20
//! comment_feed_entries = 50
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::user::User;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the site config file in the source root.
pub const SITE_CONFIG_FILENAME: &str = "site.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Site is already initialized with a different config")]
    AlreadyInstalled,
}

/// Site configuration loaded from `site.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Canonical URL of the site, without a trailing slash.
    pub url: String,
    pub title: String,
    /// Alias of the site's author in `users`.
    pub author: String,
    /// BCP 47 language tag.
    pub language: String,
    /// Text direction: `ltr`, `rtl` or `auto`.
    pub direction: String,
    /// Every tag a post may carry, sorted and unique.
    pub tags: Vec<String>,
    /// Standalone page templates, in navigation order.
    pub standalone: Vec<String>,
    /// User alias table.
    pub users: BTreeMap<String, User>,
    pub pagination: PaginationConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: "https://example.com".to_string(),
            title: "Example Site".to_string(),
            author: "owner".to_string(),
            language: "en-US".to_string(),
            direction: "ltr".to_string(),
            tags: ["dance", "music", "photos", "technology", "videos"]
                .map(String::from)
                .to_vec(),
            standalone: vec!["standalone/about/index.html.jinja".to_string()],
            users: BTreeMap::from([(
                "owner".to_string(),
                User {
                    name: "Site Owner".to_string(),
                    uri: Some("https://example.com/".to_string()),
                    email_address: Some("owner@example.com".to_string()),
                },
            )]),
            pagination: PaginationConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.url.starts_with("https://") || self.url.starts_with("http://")) {
            return Err(ConfigError::Validation(
                "url must start with http:// or https://".into(),
            ));
        }
        if self.url.ends_with('/') {
            return Err(ConfigError::Validation(
                "url must not end with a slash".into(),
            ));
        }
        if !self.tags.is_sorted_by(|a, b| a < b) {
            return Err(ConfigError::Validation(
                "tags must be sorted and unique".into(),
            ));
        }
        if !self.users.contains_key(&self.author) {
            return Err(ConfigError::Validation(format!(
                "author {:?} is not in users",
                self.author
            )));
        }
        if !matches!(self.direction.as_str(), "ltr" | "rtl" | "auto") {
            return Err(ConfigError::Validation(
                "direction must be ltr, rtl or auto".into(),
            ));
        }
        self.pagination.validate()
    }
}

/// Page and feed sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    /// Posts on each page of a post list.
    pub posts_per_page: usize,
    /// Most recent posts included in a post feed.
    pub feed_entries: usize,
    /// Most recent comments included in a comments feed.
    pub comment_feed_entries: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            posts_per_page: 10,
            feed_entries: 20,
            comment_feed_entries: 50,
        }
    }
}

impl PaginationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.posts_per_page == 0 || self.feed_entries == 0 || self.comment_feed_entries == 0 {
            return Err(ConfigError::Validation(
                "pagination values must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Load config from `site.toml` in the given directory.
///
/// Missing keys take stock defaults, unknown keys are rejected, and the
/// result is validated.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join(SITE_CONFIG_FILENAME);
    let config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)?;
        toml::from_str(&content)?
    } else {
        SiteConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `site.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Site Configuration
# ==================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Canonical URL of the site, without a trailing slash.
url = "https://example.com"

title = "Example Site"

# Alias of the site's author in the [users] table. Posts without an
# explicit author are attributed to this user.
author = "owner"

language = "en-US"

# Text direction: ltr, rtl or auto.
direction = "ltr"

# Every tag a post may use. Must be sorted and unique; each tag gets its own
# post list at /tag/{tag}/.
tags = ["dance", "music", "photos", "technology", "videos"]

# Standalone page templates. Order matters: it is the navigation order.
standalone = ["standalone/about/index.html.jinja"]

# ---------------------------------------------------------------------------
# Users that content files can refer to by alias
# ---------------------------------------------------------------------------
[users.owner]
name = "Site Owner"
uri = "https://example.com/"
email_address = "owner@example.com"

# ---------------------------------------------------------------------------
# Pagination and feeds
# ---------------------------------------------------------------------------
[pagination]
# Posts on each page of a post list.
posts_per_page = 10

# Most recent posts in each post feed.
feed_entries = 20

# Most recent comments in each comments feed.
comment_feed_entries = 50
"##
}
