//! Atom-style feeds over posts and comments.

use crate::memo::Memo;
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::rc::Rc;

/// Something that can appear in a feed.
pub trait FeedEntry {
    fn published(&self) -> DateTime<Utc>;
}

impl<T: FeedEntry + ?Sized> FeedEntry for Rc<T> {
    fn published(&self) -> DateTime<Utc> {
        (**self).published()
    }
}

/// A feed whose entries are the most recent `limit` candidates.
///
/// `entries` and `updated` are computed on first use and kept for the life
/// of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feed<E> {
    #[serde(flatten)]
    pub resource: Resource,
    pub title: String,
    pub limit: usize,
    #[serde(skip)]
    candidates: Vec<E>,
    #[serde(skip)]
    fallback_updated: Option<DateTime<Utc>>,
    #[serde(skip)]
    entries: Memo<Vec<E>>,
    #[serde(skip)]
    updated: Memo<Option<DateTime<Utc>>>,
}

impl<E: FeedEntry + Clone> Feed<E> {
    /// `fallback_updated` is used as the feed's `updated` time when there
    /// are no entries.
    pub fn new(
        url_path: impl Into<String>,
        title: impl Into<String>,
        candidates: Vec<E>,
        limit: usize,
        fallback_updated: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            resource: Resource::new(url_path),
            title: title.into(),
            limit,
            candidates,
            fallback_updated,
            entries: Memo::new(),
            updated: Memo::new(),
        }
    }

    pub fn url(&self) -> String {
        self.resource.url()
    }

    /// Most recent first, at most `limit` of them.
    pub fn entries(&self) -> &[E] {
        self.entries.get_or_init(|| {
            let mut entries = self.candidates.clone();
            entries.sort_by(|a, b| b.published().cmp(&a.published()));
            entries.truncate(self.limit);
            entries
        })
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        *self.updated.get_or_init(|| {
            self.entries()
                .first()
                .map(FeedEntry::published)
                .or(self.fallback_updated)
        })
    }
}
