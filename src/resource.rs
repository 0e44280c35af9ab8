//! Addressable URLs.
//!
//! Every page-like entity is a [`Resource`]: it knows its site-relative
//! `url_path` (`/2025/06/27/foo/`) and derives its absolute URL from the
//! site's canonical URL. A [`Fragment`] is a resource that points at an
//! element inside another resource (`/2025/06/27/foo/#2025-06-27-foo-comment-…`).
//!
//! Paths are stored unencoded; every segment is percent-encoded when the
//! absolute URL is produced.

use crate::site::site;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResourceError {
    #[error("Fragment of {0} must have a non-empty id")]
    EmptyFragmentId(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Resource {
    pub url_path: String,
}

impl Resource {
    pub fn new(url_path: impl Into<String>) -> Self {
        Self {
            url_path: url_path.into(),
        }
    }

    /// Absolute URL: the site URL joined with the percent-encoded path.
    pub fn url(&self) -> String {
        absolute_url(&self.url_path)
    }

    /// A fragment pointing at the element with `id` inside this resource.
    pub fn fragment(&self, id: &str) -> Result<Fragment, ResourceError> {
        Fragment::new(&self.url_path, id)
    }
}

/// A resource whose address carries a non-empty `#id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Fragment {
    /// Path of the containing resource, including the `#id` suffix.
    pub url_path: String,
    pub id: String,
}

impl Fragment {
    pub fn new(base_url_path: &str, id: &str) -> Result<Self, ResourceError> {
        if id.is_empty() {
            return Err(ResourceError::EmptyFragmentId(base_url_path.to_string()));
        }
        Ok(Self {
            url_path: format!("{base_url_path}#{id}"),
            id: id.to_string(),
        })
    }

    pub fn url(&self) -> String {
        absolute_url(&self.url_path)
    }

    /// Path of the resource that contains this fragment.
    pub fn base_url_path(&self) -> &str {
        self.url_path
            .split_once('#')
            .map(|(base, _)| base)
            .unwrap_or(&self.url_path)
    }
}

/// Join the site URL with a site-relative path, percent-encoding each segment.
pub fn absolute_url(url_path: &str) -> String {
    format!("{}{}", site().url, encode_url_path(url_path))
}

/// Percent-encode every `/`-separated segment of `url_path` and the fragment
/// id if there is one. Separators are left intact.
pub fn encode_url_path(url_path: &str) -> String {
    let (path, fragment) = match url_path.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (url_path, None),
    };
    let mut encoded = path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    if let Some(fragment) = fragment {
        encoded.push('#');
        encoded.push_str(&urlencoding::encode(fragment));
    }
    encoded
}
