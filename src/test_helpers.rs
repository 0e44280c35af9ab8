//! Shared test utilities for the sitegraph test suite.
//!
//! Provides a fixture source tree, writers for extra content, and lookup
//! helpers that panic with a clear message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! write_post(tmp.path(), "2025-07-04-extra", "...");
//! let fs = SourceTree::new(tmp.path(), Mode::Render);
//! let loader = Loader::new(&fs);
//!
//! let pages = loader.all().unwrap();
//! let about = find_page(&pages, "/about/");
//! assert_eq!(about.title(), "About");
//! ```

use std::path::Path;
use std::rc::Rc;

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

use crate::page::{Page, PageBase, Post};

// =========================================================================
// Fixture setup
// =========================================================================

/// Comments on `posts/2025-06-27-first-light`, in published order. The
/// second replies to the first.
pub const COMMENT_1: &str = "11111111-1111-4111-8111-111111111111";
pub const COMMENT_2: &str = "22222222-2222-4222-8222-222222222222";
pub const COMMENT_3: &str = "33333333-3333-4333-8333-333333333333";

/// Post ids in the fixture tree, most recently published first.
pub const FIXTURE_POSTS: [&str; 4] = [
    "2025-06-27-first-light",
    "2025-03-14-pi-day",
    "2024-12-31-new-years-eve",
    "2023-08-01-old-post",
];

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Writers
// =========================================================================

/// Write `contents` to `relative` under `root`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// Write a post template and its metadata to `posts/{dir_name}/`.
pub fn write_post(root: &Path, dir_name: &str, metadata: &str) {
    write_file(root, &format!("posts/{dir_name}/index.html.jinja"), "");
    write_file(root, &format!("posts/{dir_name}/metadata.toml"), metadata);
}

/// Write a comment's metadata and body for the post with `post_id`.
pub fn write_comment(root: &Path, post_id: &str, uuid: &str, metadata: &str, html: &str) {
    write_file(
        root,
        &format!("private/comments/{post_id}/{uuid}.toml"),
        metadata,
    );
    write_file(root, &format!("private/comments/{post_id}/{uuid}.html"), html);
}

/// Write `count` posts published 40 days apart from 2020-01-01 onwards.
///
/// Even-numbered posts are tagged `music`. Returns the post ids, oldest
/// first.
pub fn write_dated_posts(root: &Path, count: usize) -> Vec<String> {
    let start = Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap();
    (0..count)
        .map(|index| {
            let published = start + Duration::days(40 * index as i64);
            let id = format!("{}-post-{index}", published.format("%Y-%m-%d"));
            let tags = if index % 2 == 0 { r#"["music"]"# } else { "[]" };
            write_post(
                root,
                &id,
                &format!(
                    "uuid = \"00000000-0000-4000-8000-{:012x}\"\n\
                     published = {}\n\
                     title = \"Post {index}\"\n\
                     tags = {tags}\n",
                    index + 1,
                    published.format("%Y-%m-%dT%H:%M:%SZ"),
                ),
            );
            id
        })
        .collect()
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a page by URL path. Panics if not found.
pub fn find_page<'a>(pages: &'a [Page], url_path: &str) -> &'a Page {
    pages
        .iter()
        .find(|page| page.url_path() == url_path)
        .unwrap_or_else(|| {
            let url_paths: Vec<&str> = pages.iter().map(|page| page.url_path()).collect();
            panic!("page '{url_path}' not found. Available: {url_paths:?}")
        })
}

/// Ids of posts, in order.
pub fn post_ids(posts: &[Rc<Post>]) -> Vec<&str> {
    posts.iter().map(|post| post.id.as_str()).collect()
}
