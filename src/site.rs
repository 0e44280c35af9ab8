//! The process-wide site identity.
//!
//! [`Site`] is built once from a validated [`SiteConfig`] and never changes
//! afterwards. The binary installs the site loaded from `site.toml` before
//! loading any content; anything that asks for [`site()`] before that gets
//! the stock defaults.

use crate::config::{ConfigError, PaginationConfig, SiteConfig};
use crate::user::User;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::OnceLock;

static SITE: OnceLock<Site> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Site {
    pub url: String,
    pub title: String,
    pub author: User,
    pub language: String,
    pub direction: String,
    pub tags: Vec<String>,
    pub users: BTreeMap<String, User>,
    pub standalone: Vec<PathBuf>,
    pub pagination: PaginationConfig,
}

impl Site {
    pub fn from_config(config: &SiteConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let author = config.users.get(&config.author).cloned().ok_or_else(|| {
            ConfigError::Validation(format!("author {:?} is not in users", config.author))
        })?;
        Ok(Self {
            url: config.url.clone(),
            title: config.title.clone(),
            author,
            language: config.language.clone(),
            direction: config.direction.clone(),
            tags: config.tags.clone(),
            users: config.users.clone(),
            standalone: config.standalone.iter().map(PathBuf::from).collect(),
            pagination: config.pagination,
        })
    }

    pub fn is_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Page title followed by the site title, for `<title>` elements.
    pub fn full_title(&self, title: &str) -> String {
        format!("{title} — {}", self.title)
    }
}

/// The installed site, or the stock default site if none was installed.
pub fn site() -> &'static Site {
    SITE.get_or_init(|| {
        Site::from_config(&SiteConfig::default()).expect("stock site config must be valid")
    })
}

/// Install the process-wide site.
///
/// Installing an identical site twice is fine; installing a different one
/// after the first is an error, since content may already have been
/// validated against the first.
pub fn install(site: Site) -> Result<&'static Site, ConfigError> {
    let installed = SITE.get_or_init(|| site.clone());
    if *installed == site {
        Ok(installed)
    } else {
        Err(ConfigError::AlreadyInstalled)
    }
}
