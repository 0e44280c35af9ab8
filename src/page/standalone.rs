//! Pages outside the blog, like "About".

use super::{PageBase, STANDALONE_DIR};
use crate::error::MetadataError;
use crate::fs::Filesystem;
use crate::media::{Media, media_of};
use crate::source::{check_keys, metadata_path, read_table, required_str};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standalone {
    pub template: PathBuf,
    pub url_path: String,
    pub title: String,
    pub media: Media,
}

impl Standalone {
    const KEYS: &[&str] = &["title", "media"];

    /// `standalone/about/index.html.jinja` is served at `/about/`.
    pub fn load(fs: &dyn Filesystem, template: &Path) -> Result<Self, MetadataError> {
        let path = metadata_path(template);
        let table = read_table(fs, &path)?;
        check_keys(&table, Self::KEYS, &path)?;
        let dir = template
            .strip_prefix(STANDALONE_DIR)
            .ok()
            .and_then(Path::parent)
            .ok_or_else(|| MetadataError::InvalidTemplate(template.to_path_buf()))?;
        let segments: Vec<_> = dir
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => Some(segment.to_string_lossy()),
                _ => None,
            })
            .collect();
        let url_path = if segments.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", segments.join("/"))
        };
        let page = Self {
            template: template.to_path_buf(),
            url_path,
            title: required_str(&table, "title", &path)?.to_string(),
            media: media_of(&table, template, &path)?,
        };
        debug!(template = %template.display(), url_path = %page.url_path, "Loaded standalone page");
        Ok(page)
    }
}

impl PageBase for Standalone {
    fn url_path(&self) -> &str {
        &self.url_path
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn media(&self) -> &Media {
        &self.media
    }

    fn metadata_path(&self) -> Option<PathBuf> {
        Some(metadata_path(&self.template))
    }
}
