//! Comments on posts.
//!
//! Comments live outside the public source tree, in
//! `private/comments/{post id}/`, as a `{uuid}.toml` metadata file and a
//! `{uuid}.html` body per comment:
//!
//! ```toml
//! published = 2025-06-28T09:15:00-04:00
//! author = { name = "A Reader", uri = "https://reader.example/" }
//! in_reply_to = "11111111-1111-4111-8111-111111111111"
//! ```
//!
//! Threading is validated by the owning post, since only the post can see
//! its sibling comments.

use crate::error::MetadataError;
use crate::feed::FeedEntry;
use crate::fs::Filesystem;
use crate::lint;
use crate::memo::Memo;
use crate::paths;
use crate::resource::Fragment;
use crate::site::site;
use crate::source::{check_keys, optional_str, read_table, required, timestamp};
use crate::user::User;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    #[serde(flatten)]
    pub fragment: Fragment,
    pub post_id: String,
    pub uuid: Uuid,
    pub published: DateTime<Utc>,
    pub author: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<Uuid>,
    pub contents_path: PathBuf,
    #[serde(skip)]
    contents: Memo<String>,
}

impl Comment {
    const KEYS: &[&str] = &["published", "author", "in_reply_to"];

    pub fn new(
        post_id: &str,
        post_url_path: &str,
        uuid: Uuid,
        published: DateTime<Utc>,
        author: User,
        in_reply_to: Option<Uuid>,
    ) -> Result<Self, MetadataError> {
        Ok(Self {
            fragment: Fragment::new(post_url_path, &format!("{post_id}-comment-{uuid}"))?,
            post_id: post_id.to_string(),
            uuid,
            published,
            author,
            in_reply_to,
            contents_path: paths::comments_dir(post_id).join(format!("{uuid}.html")),
            contents: Memo::new(),
        })
    }

    /// Load the comment whose metadata is at `path`.
    pub fn load(
        fs: &dyn Filesystem,
        post_id: &str,
        post_url_path: &str,
        path: &Path,
    ) -> Result<Self, MetadataError> {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let uuid = parse_uuid(&stem, path)?;
        let table = read_table(fs, path)?;
        check_keys(&table, Self::KEYS, path)?;
        let author = User::from_value(required(&table, "author", path)?, &site().users).map_err(
            |error| MetadataError::InvalidUser {
                path: path.to_path_buf(),
                error,
            },
        )?;
        let in_reply_to = optional_str(&table, "in_reply_to", path)?
            .map(|value| parse_uuid(value, path))
            .transpose()?;
        let comment = Self::new(
            post_id,
            post_url_path,
            uuid,
            timestamp(&table, "published", path)?.with_timezone(&Utc),
            author,
            in_reply_to,
        )?;
        debug!(post = post_id, comment = %uuid, "Loaded comment");
        Ok(comment)
    }

    /// Every comment of a post, sorted by published time.
    pub fn load_all(
        fs: &dyn Filesystem,
        post_id: &str,
        post_url_path: &str,
    ) -> Result<Vec<Self>, MetadataError> {
        let mut comments = fs
            .list_dir(&paths::comments_dir(post_id))?
            .into_iter()
            .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
            .map(|path| Self::load(fs, post_id, post_url_path, &path))
            .collect::<Result<Vec<_>, _>>()?;
        comments.sort_by_key(|comment| comment.published);
        Ok(comments)
    }

    pub fn url(&self) -> String {
        self.fragment.url()
    }

    /// The comment body, read and linted on first use.
    pub fn contents(&self, fs: &dyn Filesystem) -> Result<&str, MetadataError> {
        let contents = self.contents.get_or_try_init(|| {
            let path = &self.contents_path;
            let contents = fs
                .read_text(path, false)?
                .ok_or_else(|| crate::fs::FsError::Missing(path.clone()))?;
            lint::comment(&contents).map_err(|error| MetadataError::Lint {
                path: path.clone(),
                error,
            })?;
            Ok::<_, MetadataError>(contents)
        })?;
        Ok(contents)
    }
}

impl FeedEntry for Comment {
    fn published(&self) -> DateTime<Utc> {
        self.published
    }
}

pub(crate) fn parse_uuid(value: &str, path: &Path) -> Result<Uuid, MetadataError> {
    Uuid::parse_str(value).map_err(|_| MetadataError::InvalidUuid {
        path: path.to_path_buf(),
        value: value.to_string(),
    })
}
