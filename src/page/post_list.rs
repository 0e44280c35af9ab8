//! Paginated lists of posts: the main blog list and one list per tag.

use super::PageBase;
use crate::comment::Comment;
use crate::config::PaginationConfig;
use crate::feed::Feed;
use crate::media::Media;
use crate::memo::Memo;
use crate::page::post::Post;
use crate::pagination::{self, DEFAULT_SHOW_EITHER_SIDE};
use crate::resource::{Fragment, ResourceError};
use crate::site::site;
use chrono::Datelike;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostListKind {
    Main,
    Tag(String),
}

/// A filtered view over all posts, most recent first.
///
/// Pages, year links and feeds are derived on first use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostList {
    pub url_path: String,
    pub title: String,
    pub media: Media,
    pub list: PostListKind,
    #[serde(serialize_with = "serialize_post_ids")]
    pub posts: Vec<Rc<Post>>,
    #[serde(skip)]
    pagination: PaginationConfig,
    #[serde(skip)]
    page_by_number: Memo<BTreeMap<usize, PostListPage>>,
    #[serde(skip)]
    link_by_year: Memo<Vec<(i32, Fragment)>>,
    #[serde(skip)]
    feed: Memo<Feed<Rc<Post>>>,
    #[serde(skip)]
    comments_feed: Memo<Feed<Rc<Comment>>>,
}

impl PostList {
    fn new(url_path: String, title: String, list: PostListKind, posts: Vec<Rc<Post>>) -> Self {
        Self {
            url_path,
            title,
            media: Media::default(),
            list,
            posts,
            pagination: site().pagination,
            page_by_number: Memo::new(),
            link_by_year: Memo::new(),
            feed: Memo::new(),
            comments_feed: Memo::new(),
        }
    }

    /// Every post, at `/`.
    pub fn main(posts: Vec<Rc<Post>>) -> Self {
        Self::new("/".to_string(), "Blog".to_string(), PostListKind::Main, posts)
    }

    /// Posts with `tag`, at `/tag/{tag}/`.
    pub fn tag(tag: &str, posts: &[Rc<Post>]) -> Self {
        let posts = posts
            .iter()
            .filter(|post| post.tags.iter().any(|t| t == tag))
            .cloned()
            .collect();
        Self::new(
            format!("/tag/{tag}/"),
            format!("Tag: {tag}"),
            PostListKind::Tag(tag.to_string()),
            posts,
        )
    }

    /// Same list with different page and feed sizes.
    pub fn with_pagination(self, pagination: PaginationConfig) -> Self {
        Self {
            pagination,
            page_by_number: Memo::new(),
            link_by_year: Memo::new(),
            feed: Memo::new(),
            comments_feed: Memo::new(),
            ..self
        }
    }

    /// Pages of `posts_per_page` posts, numbered from 1. Page 1 is at the
    /// list's own URL. An empty list still has a page 1.
    pub fn page_by_number(&self) -> &BTreeMap<usize, PostListPage> {
        self.page_by_number.get_or_init(|| {
            let chunks: Vec<&[Rc<Post>]> = if self.posts.is_empty() {
                vec![&self.posts[..]]
            } else {
                self.posts
                    .chunks(self.pagination.posts_per_page.max(1))
                    .collect()
            };
            let total = chunks.len();
            chunks
                .into_iter()
                .enumerate()
                .map(|(index, posts)| {
                    let number = index + 1;
                    (number, self.build_page(number, total, posts.to_vec()))
                })
                .collect()
        })
    }

    fn build_page(&self, number: usize, total: usize, posts: Vec<Rc<Post>>) -> PostListPage {
        let title = if number == 1 {
            self.title.clone()
        } else {
            format!("{} (page {number})", self.title)
        };
        PostListPage {
            url_path: page_url_path(&self.url_path, number),
            title,
            media: Media::default(),
            number,
            total,
            list_url_path: self.url_path.clone(),
            posts,
        }
    }

    /// Page `number`, or `None` if there is no such page (including 0).
    pub fn page(&self, number: usize) -> Option<&PostListPage> {
        self.page_by_number().get(&number)
    }

    /// For each publish year, most recent first, a link to the most recent
    /// post of that year on the page where it appears.
    ///
    /// Relies on `posts` being sorted most recent first: the first post seen
    /// for a year wins.
    pub fn link_by_year(&self) -> Result<&[(i32, Fragment)], ResourceError> {
        let links = self.link_by_year.get_or_try_init(|| {
            let mut by_year: BTreeMap<i32, Fragment> = BTreeMap::new();
            for page in self.page_by_number().values() {
                for post in &page.posts {
                    let year = post.published.year();
                    if !by_year.contains_key(&year) {
                        by_year.insert(year, Fragment::new(&page.url_path, &post.id)?);
                    }
                }
            }
            Ok::<_, ResourceError>(by_year.into_iter().rev().collect())
        })?;
        Ok(links)
    }

    /// The most recent posts.
    pub fn feed(&self) -> &Feed<Rc<Post>> {
        self.feed.get_or_init(|| {
            Feed::new(
                format!("{}feed/", self.url_path),
                self.title.clone(),
                self.posts.clone(),
                self.pagination.feed_entries,
                None,
            )
        })
    }

    /// The most recent comments on any post in the list.
    ///
    /// With no comments at all, the feed's updated time is the earliest
    /// post's published time. That is an approximation: it ignores when the
    /// list's feeds last actually changed.
    pub fn comments_feed(&self) -> &Feed<Rc<Comment>> {
        self.comments_feed.get_or_init(|| {
            let comments = self
                .posts
                .iter()
                .flat_map(|post| post.comments.iter().cloned())
                .collect();
            Feed::new(
                format!("{}comments/feed/", self.url_path),
                format!("Comments: {}", self.title),
                comments,
                self.pagination.comment_feed_entries,
                self.posts.last().map(|post| post.published),
            )
        })
    }
}

impl PageBase for PostList {
    fn url_path(&self) -> &str {
        &self.url_path
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn media(&self) -> &Media {
        &self.media
    }
}

fn page_url_path(list_url_path: &str, number: usize) -> String {
    if number == 1 {
        list_url_path.to_string()
    } else {
        format!("{list_url_path}page/{number}/")
    }
}

fn serialize_post_ids<S: Serializer>(
    posts: &[Rc<Post>],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(posts.iter().map(|post| &post.id))
}

/// One page of a [`PostList`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostListPage {
    pub url_path: String,
    pub title: String,
    pub media: Media,
    /// 1-indexed.
    pub number: usize,
    pub total: usize,
    pub list_url_path: String,
    #[serde(serialize_with = "serialize_post_ids")]
    pub posts: Vec<Rc<Post>>,
}

impl PostListPage {
    /// Page navigation: `Some((number, url_path))` for each page link and
    /// `None` for each elided gap.
    pub fn nav(&self) -> Vec<Option<(usize, String)>> {
        pagination::nav(self.number, self.total, DEFAULT_SHOW_EITHER_SIDE)
            .map(|entry| entry.map(|number| (number, page_url_path(&self.list_url_path, number))))
            .collect()
    }

    pub fn previous_url_path(&self) -> Option<String> {
        (self.number > 1).then(|| page_url_path(&self.list_url_path, self.number - 1))
    }

    pub fn next_url_path(&self) -> Option<String> {
        (self.number < self.total).then(|| page_url_path(&self.list_url_path, self.number + 1))
    }
}

impl PageBase for PostListPage {
    fn url_path(&self) -> &str {
        &self.url_path
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn media(&self) -> &Media {
        &self.media
    }
}
