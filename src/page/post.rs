//! Blog posts.
//!
//! A post lives in `posts/{yyyy}-{mm}-{dd}-{slug}/`, where the date is the
//! local date of its `published` time:
//!
//! ```toml
//! uuid = "7a9d0c3e-2b1f-4e5d-8c6b-0a1b2c3d4e5f"
//! published = 2025-06-27T10:00:00-04:00
//! title = "First light"
//! tags = ["photos"]
//! ```
//!
//! The post is served at the UTC date of `published`. If the local date is
//! different, the URL with the local date is kept as an alias.

use super::{POSTS_DIR, PageBase};
use crate::comment::{Comment, parse_uuid};
use crate::error::MetadataError;
use crate::feed::FeedEntry;
use crate::fs::Filesystem;
use crate::iri;
use crate::media::{Media, media_of};
use crate::paths;
use crate::site::site;
use crate::source::{
    check_keys, metadata_path, read_table, required_str, string_list, timestamp,
};
use crate::user::User;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub url_path: String,
    pub title: String,
    pub media: Media,
    pub template: PathBuf,
    /// Name of the source directory, unique among posts.
    pub id: String,
    pub slug: String,
    pub uuid: Uuid,
    pub published: DateTime<Utc>,
    pub author: User,
    pub tags: Vec<String>,
    pub url_path_aliases: BTreeSet<String>,
    /// Oldest first.
    pub comments: Vec<Rc<Comment>>,
}

impl Post {
    const KEYS: &[&str] = &[
        "uuid",
        "published",
        "title",
        "author",
        "tags",
        "media",
        "url_path_aliases",
    ];

    pub fn load(fs: &dyn Filesystem, template: &Path) -> Result<Self, MetadataError> {
        let path = metadata_path(template);
        let table = read_table(fs, &path)?;
        check_keys(&table, Self::KEYS, &path)?;

        let published = timestamp(&table, "published", &path)?;
        let id = template
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| MetadataError::InvalidTemplate(template.to_path_buf()))?;
        let slug = id
            .strip_prefix(&published.format("%Y-%m-%d-").to_string())
            .ok_or_else(|| MetadataError::DateDirectoryMismatch {
                template: template.to_path_buf(),
            })?
            .to_string();

        let utc = published.with_timezone(&Utc);
        let url_path = format!("/{}/{slug}/", utc.format("%Y/%m/%d"));
        let mut url_path_aliases: BTreeSet<String> =
            string_list(&table, "url_path_aliases", &path)?
                .into_iter()
                .collect();
        url_path_aliases.insert(format!("/{}/{slug}/", published.format("%Y/%m/%d")));
        url_path_aliases.remove(&url_path);

        let author = match table.get("author") {
            Some(value) => User::from_value(value, &site().users).map_err(|error| {
                MetadataError::InvalidUser {
                    path: path.clone(),
                    error,
                }
            })?,
            None => site().author.clone(),
        };

        let comments = Comment::load_all(fs, &id, &url_path)?
            .into_iter()
            .map(Rc::new)
            .collect();

        let post = Self {
            title: required_str(&table, "title", &path)?.to_string(),
            media: media_of(&table, template, &path)?,
            template: template.to_path_buf(),
            uuid: parse_uuid(required_str(&table, "uuid", &path)?, &path)?,
            published: utc,
            author,
            tags: string_list(&table, "tags", &path)?,
            url_path,
            url_path_aliases,
            comments,
            id,
            slug,
        };
        post.validate()?;
        debug!(
            id = %post.id,
            url_path = %post.url_path,
            comments = post.comments.len(),
            "Loaded post"
        );
        Ok(post)
    }

    /// Checks that only need this post: tags, comment order and threading.
    pub(crate) fn validate(&self) -> Result<(), MetadataError> {
        let unknown: BTreeSet<String> = self
            .tags
            .iter()
            .filter(|tag| !site().is_tag(tag))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(MetadataError::UnknownTags {
                path: self.template.clone(),
                tags: unknown,
            });
        }
        if !self.tags.is_sorted_by(|a, b| a < b) {
            return Err(MetadataError::TagsNotSortedUnique {
                path: self.template.clone(),
                tags: self.tags.clone(),
            });
        }

        if !self.comments.is_sorted_by_key(|comment| comment.published) {
            return Err(MetadataError::CommentsNotSorted {
                post: self.id.clone(),
            });
        }
        // A reply must point at an earlier comment of this post, which rules
        // out self-replies and cycles.
        let published_by_uuid: HashMap<Uuid, DateTime<Utc>> = self
            .comments
            .iter()
            .map(|comment| (comment.uuid, comment.published))
            .collect();
        let invalid: BTreeSet<Uuid> = self
            .comments
            .iter()
            .filter(|comment| {
                comment.in_reply_to.is_some_and(|parent| {
                    published_by_uuid
                        .get(&parent)
                        .is_none_or(|parent_published| *parent_published >= comment.published)
                })
            })
            .map(|comment| comment.uuid)
            .collect();
        if !invalid.is_empty() {
            return Err(MetadataError::InvalidInReplyTo {
                post: self.id.clone(),
                comments: invalid,
            });
        }
        Ok(())
    }

    /// Comments grouped by the comment they reply to; `None` holds the
    /// top-level comments. Each group is oldest first.
    pub fn comments_by_parent(&self) -> BTreeMap<Option<Uuid>, Vec<&Comment>> {
        let mut by_parent: BTreeMap<Option<Uuid>, Vec<&Comment>> = BTreeMap::new();
        for comment in &self.comments {
            by_parent
                .entry(comment.in_reply_to)
                .or_default()
                .push(comment);
        }
        by_parent
    }

    /// Work-tree directory for this post's intermediate artifacts.
    pub fn work_path(&self) -> PathBuf {
        paths::work(&Path::new(POSTS_DIR).join(&self.id))
    }

    /// Rendered body, for including the post in lists.
    pub fn include_fragment_path(&self) -> PathBuf {
        self.work_path().join("include-fragment.html")
    }

    /// Rendered body, for including the post in feeds.
    pub fn atom_fragment_path(&self) -> PathBuf {
        self.work_path().join("atom-fragment.xml")
    }

    /// `mailto:` link for replying to this post, or to one of its comments.
    ///
    /// The reply goes to the site author, with the UUID of whatever is being
    /// replied to as the address extension.
    pub fn reply_mailto(&self, in_reply_to: Option<&Comment>) -> Result<String, MetadataError> {
        let uuid = in_reply_to.map_or(self.uuid, |comment| comment.uuid);
        let to = site()
            .author
            .email_address_with_extension(&uuid.simple().to_string())?;
        let subject = format!("Re: {}", self.title);
        Ok(iri::mailto(&to, &[("subject", subject.as_str())], None))
    }
}

impl PageBase for Post {
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

impl FeedEntry for Post {
    fn published(&self) -> DateTime<Utc> {
        self.published
    }
}

/// Fail if any two posts share a URL path, a UUID, or a published time.
///
/// Every colliding value is reported, with the ids of the posts sharing it.
pub(crate) fn check_unique(posts: &[Rc<Post>]) -> Result<(), MetadataError> {
    let mut by_url_path: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut by_uuid: BTreeMap<Uuid, BTreeSet<String>> = BTreeMap::new();
    let mut by_published: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for post in posts {
        for url_path in std::iter::once(&post.url_path).chain(&post.url_path_aliases) {
            by_url_path
                .entry(url_path.clone())
                .or_default()
                .insert(post.id.clone());
        }
        by_uuid.entry(post.uuid).or_default().insert(post.id.clone());
        by_published
            .entry(post.published.to_rfc3339())
            .or_default()
            .insert(post.id.clone());
    }
    let by_url_path = duplicates(by_url_path);
    if !by_url_path.is_empty() {
        return Err(MetadataError::DuplicateUrlPaths(by_url_path));
    }
    let by_uuid = duplicates(by_uuid);
    if !by_uuid.is_empty() {
        return Err(MetadataError::DuplicateUuids(by_uuid));
    }
    let by_published = duplicates(by_published);
    if !by_published.is_empty() {
        return Err(MetadataError::DuplicatePublished(by_published));
    }
    Ok(())
}

fn duplicates<K: Ord>(
    ids_by_value: BTreeMap<K, BTreeSet<String>>,
) -> BTreeMap<K, BTreeSet<String>> {
    ids_by_value
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{Mode, SourceTree};
    use crate::test_helpers::*;
    use chrono::TimeZone;

    const FIRST_LIGHT: &str = "posts/2025-06-27-first-light/index.html.jinja";

    fn load(tmp: &tempfile::TempDir, template: &str) -> Result<Post, MetadataError> {
        let fs = SourceTree::new(tmp.path(), Mode::Render);
        Post::load(&fs, Path::new(template))
    }

    #[test]
    fn load_post() {
        let tmp = setup_fixtures();
        let post = load(&tmp, FIRST_LIGHT).unwrap();
        assert_eq!(post.id, "2025-06-27-first-light");
        assert_eq!(post.slug, "first-light");
        assert_eq!(post.url_path, "/2025/06/27/first-light/");
        assert!(post.url_path_aliases.is_empty());
        assert_eq!(post.title, "First light");
        assert_eq!(post.uuid.to_string(), "7a9d0c3e-2b1f-4e5d-8c6b-0a1b2c3d4e5f");
        assert_eq!(
            post.published,
            Utc.with_ymd_and_hms(2025, 6, 27, 14, 0, 0).unwrap()
        );
        assert_eq!(post.author, site().author);
        assert_eq!(post.tags, vec!["photos"]);
        assert_eq!(post.comments.len(), 3);
        assert_eq!(post.media.len(), 3);
    }

    #[test]
    fn utc_date_differs_from_local_date() {
        let tmp = setup_fixtures();
        let post = load(&tmp, "posts/2024-12-31-new-years-eve/index.html.jinja").unwrap();
        assert_eq!(post.url_path, "/2025/01/01/new-years-eve/");
        assert_eq!(
            post.url_path_aliases,
            BTreeSet::from(["/2024/12/31/new-years-eve/".to_string()])
        );
    }

    #[test]
    fn explicit_aliases() {
        let tmp = setup_fixtures();
        write_post(
            tmp.path(),
            "2025-07-04-moved",
            r#"
            uuid = "4d1b8f6e-5a3c-4b2d-9e8f-7a6b5c4d3e2f"
            published = 2025-07-04T12:00:00Z
            title = "Moved"
            url_path_aliases = ["/old/moved/"]
            "#,
        );
        let post = load(&tmp, "posts/2025-07-04-moved/index.html.jinja").unwrap();
        assert_eq!(
            post.url_path_aliases,
            BTreeSet::from(["/old/moved/".to_string()])
        );
    }

    #[test]
    fn author_record() {
        let tmp = setup_fixtures();
        let post = load(&tmp, "posts/2025-03-14-pi-day/index.html.jinja").unwrap();
        assert_eq!(post.author.name, "Guest Author");
        assert_eq!(post.author.email_address, None);
    }

    #[test]
    fn no_timezone() {
        let tmp = setup_fixtures();
        write_post(
            tmp.path(),
            "2025-07-04-naive",
            r#"
            uuid = "4d1b8f6e-5a3c-4b2d-9e8f-7a6b5c4d3e2f"
            published = 2025-07-04T12:00:00
            title = "Naive"
            "#,
        );
        let err = load(&tmp, "posts/2025-07-04-naive/index.html.jinja").unwrap_err();
        assert!(err.to_string().contains("has no timezone"), "{err}");
    }

    #[test]
    fn date_directory_mismatch() {
        let tmp = setup_fixtures();
        write_post(
            tmp.path(),
            "2025-07-05-wrong-day",
            r#"
            uuid = "4d1b8f6e-5a3c-4b2d-9e8f-7a6b5c4d3e2f"
            published = 2025-07-04T12:00:00Z
            title = "Wrong day"
            "#,
        );
        let err = load(&tmp, "posts/2025-07-05-wrong-day/index.html.jinja").unwrap_err();
        assert!(
            err.to_string()
                .contains("published date and directory name don't match"),
            "{err}"
        );
    }

    #[test]
    fn directory_uses_local_date() {
        let tmp = setup_fixtures();
        // 2025-07-05T02:00Z, but July 4th in New York.
        write_post(
            tmp.path(),
            "2025-07-05-fireworks",
            r#"
            uuid = "4d1b8f6e-5a3c-4b2d-9e8f-7a6b5c4d3e2f"
            published = 2025-07-04T22:00:00-04:00
            title = "Fireworks"
            "#,
        );
        let err = load(&tmp, "posts/2025-07-05-fireworks/index.html.jinja").unwrap_err();
        assert!(matches!(err, MetadataError::DateDirectoryMismatch { .. }));
    }

    #[test]
    fn unknown_tags() {
        let tmp = setup_fixtures();
        write_post(
            tmp.path(),
            "2025-07-04-tags",
            r#"
            uuid = "4d1b8f6e-5a3c-4b2d-9e8f-7a6b5c4d3e2f"
            published = 2025-07-04T12:00:00Z
            title = "Tags"
            tags = ["music", "knitting"]
            "#,
        );
        let err = load(&tmp, "posts/2025-07-04-tags/index.html.jinja").unwrap_err();
        assert!(err.to_string().starts_with("Unknown tags"), "{err}");
    }

    #[test]
    fn unsorted_or_duplicate_tags() {
        for tags in [r#"["photos", "music"]"#, r#"["music", "music"]"#] {
            let tmp = setup_fixtures();
            write_post(
                tmp.path(),
                "2025-07-04-tags",
                &format!(
                    r#"
                    uuid = "4d1b8f6e-5a3c-4b2d-9e8f-7a6b5c4d3e2f"
                    published = 2025-07-04T12:00:00Z
                    title = "Tags"
                    tags = {tags}
                    "#
                ),
            );
            let err = load(&tmp, "posts/2025-07-04-tags/index.html.jinja").unwrap_err();
            assert!(err.to_string().contains("is not sorted and unique"), "{err}");
        }
    }

    #[test]
    fn unexpected_keys() {
        let tmp = setup_fixtures();
        write_post(
            tmp.path(),
            "2025-07-04-keys",
            r#"
            uuid = "4d1b8f6e-5a3c-4b2d-9e8f-7a6b5c4d3e2f"
            published = 2025-07-04T12:00:00Z
            title = "Keys"
            tag = ["music"]
            summary = "oops"
            "#,
        );
        let err = load(&tmp, "posts/2025-07-04-keys/index.html.jinja").unwrap_err();
        match err {
            MetadataError::UnexpectedKeys { keys, .. } => {
                assert_eq!(
                    keys,
                    BTreeSet::from(["summary".to_string(), "tag".to_string()])
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn comments_by_parent() {
        let tmp = setup_fixtures();
        let post = load(&tmp, FIRST_LIGHT).unwrap();
        let by_parent = post.comments_by_parent();
        let top_level: Vec<String> = by_parent[&None]
            .iter()
            .map(|comment| comment.uuid.to_string())
            .collect();
        assert_eq!(top_level, vec![COMMENT_1, COMMENT_3]);
        let replies: Vec<String> = by_parent[&Some(Uuid::parse_str(COMMENT_1).unwrap())]
            .iter()
            .map(|comment| comment.uuid.to_string())
            .collect();
        assert_eq!(replies, vec![COMMENT_2]);
    }

    #[test]
    fn reply_to_later_comment_is_invalid() {
        let tmp = setup_fixtures();
        write_comment(
            tmp.path(),
            "2025-06-27-first-light",
            COMMENT_1,
            &format!("published = 2025-06-28T09:15:00-04:00\nauthor = \"owner\"\nin_reply_to = \"{COMMENT_3}\"\n"),
            "<p>From the future?</p>",
        );
        let err = load(&tmp, FIRST_LIGHT).unwrap_err();
        assert!(err.to_string().contains("invalid in_reply_to"), "{err}");
        match err {
            MetadataError::InvalidInReplyTo { comments, .. } => {
                assert_eq!(comments, BTreeSet::from([Uuid::parse_str(COMMENT_1).unwrap()]));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reply_to_self_or_unknown_is_invalid() {
        let tmp = setup_fixtures();
        write_comment(
            tmp.path(),
            "2025-06-27-first-light",
            COMMENT_1,
            &format!("published = 2025-06-28T09:15:00-04:00\nauthor = \"owner\"\nin_reply_to = \"{COMMENT_1}\"\n"),
            "<p>Me again</p>",
        );
        write_comment(
            tmp.path(),
            "2025-06-27-first-light",
            COMMENT_3,
            "published = 2025-06-29T08:00:00+02:00\nauthor = \"owner\"\nin_reply_to = \"99999999-9999-4999-8999-999999999999\"\n",
            "<p>Who?</p>",
        );
        let err = load(&tmp, FIRST_LIGHT).unwrap_err();
        match err {
            MetadataError::InvalidInReplyTo { post, comments } => {
                assert_eq!(post, "2025-06-27-first-light");
                assert_eq!(
                    comments,
                    BTreeSet::from([
                        Uuid::parse_str(COMMENT_1).unwrap(),
                        Uuid::parse_str(COMMENT_3).unwrap(),
                    ])
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unsorted_comments_are_invalid() {
        let tmp = setup_fixtures();
        let mut post = load(&tmp, FIRST_LIGHT).unwrap();
        post.comments.reverse();
        let err = post.validate().unwrap_err();
        assert!(matches!(err, MetadataError::CommentsNotSorted { .. }));
    }

    #[test]
    fn loading_twice_is_equal() {
        let tmp = setup_fixtures();
        let first = load(&tmp, FIRST_LIGHT).unwrap();
        let second = load(&tmp, FIRST_LIGHT).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn work_paths() {
        let tmp = setup_fixtures();
        let post = load(&tmp, FIRST_LIGHT).unwrap();
        assert_eq!(post.work_path(), Path::new("work/posts/2025-06-27-first-light"));
        assert_eq!(
            post.include_fragment_path(),
            Path::new("work/posts/2025-06-27-first-light/include-fragment.html")
        );
        assert_eq!(
            post.atom_fragment_path(),
            Path::new("work/posts/2025-06-27-first-light/atom-fragment.xml")
        );
    }

    #[test]
    fn reply_mailto() {
        let tmp = setup_fixtures();
        let post = load(&tmp, FIRST_LIGHT).unwrap();
        assert_eq!(
            post.reply_mailto(None).unwrap(),
            "mailto:owner%2B7a9d0c3e2b1f4e5d8c6b0a1b2c3d4e5f@example.com?subject=Re%3A%20First%20light"
        );
        let reply = post.reply_mailto(Some(&post.comments[0])).unwrap();
        assert!(
            reply.starts_with("mailto:owner%2B11111111111141118111111111111111@example.com?"),
            "{reply}"
        );
    }
}
