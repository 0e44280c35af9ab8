//! # Sitegraph
//!
//! The content graph of a static personal website: the site identity, its
//! users, and every page the build renders, loaded from `metadata.toml`
//! files that sit next to each template.
//!
//! # Architecture: Load, Derive, Validate
//!
//! ```text
//! 1. Load      metadata.toml, comments  →  Error, Standalone, Post
//! 2. Derive    posts                    →  PostList, PostListPage, feeds
//!              gallery media            →  MediaItemDetails
//! 3. Validate  every page               →  unique URLs, UUIDs, instants
//! ```
//!
//! Loading is the only step that touches files, and it does so through the
//! [`fs::Filesystem`] collaborator so the build can record dependencies and
//! defer reads of artifacts that don't exist yet. Derived values (pages of a
//! list, feeds, year links, comment bodies) are computed on first use and
//! cached in the entity that owns them.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`page`] | The page hierarchy and the [`page::Loader`] that enumerates it |
//! | [`comment`] | Comments on posts, threaded by `in_reply_to` |
//! | [`media`] | Media items and the image conversions each use requires |
//! | [`feed`] | Most-recent-first feeds over posts and comments |
//! | [`pagination`] | Page-number navigation with elided gaps |
//! | [`lint`] | Structural checks on rendered HTML and comment bodies |
//! | [`site`] | The process-wide site identity |
//! | [`config`] | `site.toml` loading and validation |
//! | [`user`] | User aliases, records and `mailto:` addresses |
//! | [`resource`] | URL paths, fragments and absolute URLs |
//! | [`paths`] | URL path ↔ output path mapping and work-tree locations |
//! | [`iri`] | `mailto:` IRIs |
//! | [`source`] | Strict `metadata.toml` readers |
//! | [`fs`] | The filesystem collaborator and its on-disk implementation |
//! | [`error`] | Errors raised while loading content |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Strict Configuration, Lenient Artifacts
//!
//! Every `metadata.toml` rejects unknown keys and must exist. Build
//! artifacts (cache-busted file names, image metadata) may be missing during
//! a scan and are read again when rendering.
//!
//! ## Fail on Any Inconsistency
//!
//! There is no partial-success mode. A duplicate URL, an unknown tag, or a
//! reply to a comment that doesn't exist yet fails the whole load, since any
//! page rendered from it could be wrong.
//!
//! ## UTC URLs, Local Directories
//!
//! A post's directory is named after the local date of its `published` time,
//! which is what the author sees. Its URL uses the UTC date so URLs never
//! depend on where the author was; the local-date URL stays as an alias.

pub mod comment;
pub mod config;
pub mod error;
pub mod feed;
pub mod fs;
pub mod iri;
pub mod lint;
pub mod media;
pub mod memo;
pub mod output;
pub mod page;
pub mod pagination;
pub mod paths;
pub mod resource;
pub mod site;
pub mod source;
pub mod user;

#[cfg(test)]
pub(crate) mod test_helpers;
