//! Errors raised while loading and validating the content graph.
//!
//! Every failure is fatal for whatever depends on the content that produced
//! it: there is no partial-success mode. Errors from the lower layers
//! (filesystem collaborator, site config, users, URLs, lint) are wrapped so
//! a caller only has to handle [`MetadataError`].

use crate::config::ConfigError;
use crate::fs::FsError;
use crate::lint::LintError;
use crate::paths::PathError;
use crate::resource::ResourceError;
use crate::user::UserError;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error(transparent)]
    Fs(#[from] FsError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Email(#[from] UserError),
    #[error("Invalid user in {path}: {error}")]
    InvalidUser { path: PathBuf, error: UserError },
    #[error("TOML parse error in {path}: {error}")]
    Toml {
        path: PathBuf,
        error: toml::de::Error,
    },
    #[error("JSON parse error in {path}: {error}")]
    Json {
        path: PathBuf,
        error: serde_json::Error,
    },
    #[error("{path} failed lint: {error}")]
    Lint { path: PathBuf, error: LintError },

    // Schema errors
    #[error("Unexpected keys in {path}: {keys:?}")]
    UnexpectedKeys {
        path: PathBuf,
        keys: BTreeSet<String>,
    },
    #[error("Missing key {key:?} in {path}")]
    MissingKey { path: PathBuf, key: String },
    #[error("Key {key:?} in {path} must be {expected}")]
    WrongType {
        path: PathBuf,
        key: String,
        expected: &'static str,
    },

    // Cross-field consistency errors
    #[error("{key:?} in {path} has no timezone")]
    NoTimezone { path: PathBuf, key: String },
    #[error("Invalid timestamp {value:?} in {path}")]
    InvalidTimestamp { path: PathBuf, value: String },
    #[error("Invalid UUID {value:?} in {path}")]
    InvalidUuid { path: PathBuf, value: String },
    #[error("{template}'s published date and directory name don't match")]
    DateDirectoryMismatch { template: PathBuf },
    #[error("Unknown tags in {path}: {tags:?}")]
    UnknownTags {
        path: PathBuf,
        tags: BTreeSet<String>,
    },
    #[error("Tags in {path} {tags:?} is not sorted and unique")]
    TagsNotSortedUnique { path: PathBuf, tags: Vec<String> },
    #[error("Comments of post {post} are not sorted by published time")]
    CommentsNotSorted { post: String },
    #[error("Comments of post {post} have invalid in_reply_to: {comments:?}")]
    InvalidInReplyTo {
        post: String,
        comments: BTreeSet<Uuid>,
    },
    #[error("Duplicate media item {source_path} in {path}")]
    DuplicateMediaItem { path: PathBuf, source_path: PathBuf },
    #[error("Media source {source_path} in {path} has no file name")]
    InvalidMediaSource { path: PathBuf, source_path: PathBuf },
    #[error("Page {0} has media but no metadata.toml")]
    MediaWithoutMetadata(String),
    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(PathBuf),
    #[error("Unknown media type {kind:?} in {path}")]
    UnknownMediaType { path: PathBuf, kind: String },
    #[error("Invalid HTTP status {status:?} for error template {template}")]
    InvalidStatus { template: PathBuf, status: String },
    #[error("Template {0} is not inside a named directory")]
    InvalidTemplate(PathBuf),

    // Aggregate uniqueness errors, value → ids of the pages sharing it
    #[error("Duplicate url paths: {0:?}")]
    DuplicateUrlPaths(BTreeMap<String, BTreeSet<String>>),
    #[error("Duplicate UUIDs: {0:?}")]
    DuplicateUuids(BTreeMap<Uuid, BTreeSet<String>>),
    #[error("Duplicate published times: {0:?}")]
    DuplicatePublished(BTreeMap<String, BTreeSet<String>>),

    #[error("Not implemented: no page kind handles template {0}")]
    NotImplemented(PathBuf),
}
