//! CLI output formatting for the loaded content graph.
//!
//! # Information-First Display
//!
//! Every page is shown by its semantic identity (positional index and title)
//! followed by the URL it is served at. Where the page came from is shown
//! as secondary context on indented lines, so the output reads as a content
//! inventory while still letting users trace a page back to its files.
//!
//! # Output Format
//!
//! ## Pages
//!
//! ```text
//! Posts
//! 001 First light → /2025/06/27/first-light/
//!     Source: posts/2025-06-27-first-light/index.html.jinja
//!     Tags: photos
//!     Comments: 3
//!     Media: 3 items
//!     Gallery harbor: 2 items
//!     Open Graph: posts/2025-06-27-first-light/sunrise.jpg
//!
//! Post list pages
//! 001 Blog → /
//!     Page 1 of 1, 4 posts
//! ```
//!
//! ## Post
//!
//! ```text
//! First light → /2025/06/27/first-light/
//!     Published: 2025-06-27T14:00:00+00:00
//!     Author: Site Owner
//!     Comments
//!     001 A Reader (2025-06-28T13:15:00+00:00)
//!         Great photo, where was this?
//!         001 Site Owner (2025-06-28T18:00:00+00:00)
//! ```
//!
//! ## Check
//!
//! ```text
//! 2 error, 1 standalone, 4 post, 6 post_list_page, 3 media_item_details
//! Checked 16 pages, 3 comments
//! Resolved 21 image outputs, 0 built
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: comment contents are read by the caller and passed
//! in.

use crate::comment::Comment;
use crate::media::ResolvedOutput;
use crate::page::{Page, PageBase, PageKind, Post};
use crate::pagination;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Longest comment preview, in characters.
const PREVIEW_LEN: usize = 60;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Index, title and the URL path the page is served at.
///
/// ```text
/// 001 First light → /2025/06/27/first-light/
/// ```
fn entity_header(index: usize, title: &str, url_path: &str) -> String {
    format!("{} {} \u{2192} {}", format_index(index), title, url_path)
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Collapse whitespace and truncate to `max` characters, appending `...` if
/// truncated.
fn preview(text: &str, max: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max {
        collapsed
    } else {
        let truncated: String = collapsed.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn section_title(kind: PageKind) -> &'static str {
    match kind {
        PageKind::Error => "Error pages",
        PageKind::Standalone => "Standalone pages",
        PageKind::Post => "Posts",
        PageKind::PostList => "Post lists",
        PageKind::PostListPage => "Post list pages",
        PageKind::MediaItemDetails => "Media details pages",
    }
}

// ============================================================================
// Pages
// ============================================================================

/// Context lines shown under a page's header.
fn page_context(page: &Page) -> Vec<String> {
    let mut lines = Vec::new();
    match page {
        Page::Error(error) => lines.push(format!("Status: {}", error.status)),
        Page::Standalone(_) => {}
        Page::Post(post) => {
            lines.push(format!("Source: {}", post.template.display()));
            for alias in &post.url_path_aliases {
                lines.push(format!("Alias: {}", alias));
            }
            if !post.tags.is_empty() {
                lines.push(format!("Tags: {}", post.tags.join(", ")));
            }
            if !post.comments.is_empty() {
                lines.push(format!("Comments: {}", post.comments.len()));
            }
        }
        Page::PostList(list) => lines.push(format!("Posts: {}", list.posts.len())),
        Page::PostListPage(list_page) => lines.push(format!(
            "Page {} of {}, {} posts",
            list_page.number,
            list_page.total,
            list_page.posts.len()
        )),
        Page::MediaItemDetails(details) => {
            lines.push(format!("Source: {}", details.item.source_path().display()));
            lines.push(format!("Parent: {}", details.parent_url_path));
        }
    }
    if !matches!(page, Page::MediaItemDetails(_)) && !page.media().is_empty() {
        lines.push(format!("Media: {} items", page.media().len()));
        for (group, items) in page.media().galleries() {
            lines.push(format!("Gallery {}: {} items", group, items.len()));
        }
    }
    for item in page.media().opengraph() {
        lines.push(format!("Open Graph: {}", item.source_path().display()));
    }
    lines
}

/// Format every page, grouped by kind in load order.
pub fn format_pages(pages: &[Page]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_kind = None;
    let mut position = 0;
    for page in pages {
        if current_kind != Some(page.kind()) {
            if current_kind.is_some() {
                lines.push(String::new());
            }
            current_kind = Some(page.kind());
            position = 0;
            lines.push(section_title(page.kind()).to_string());
        }
        position += 1;
        lines.push(entity_header(position, page.title(), page.url_path()));
        for context in page_context(page) {
            lines.push(format!("{}{}", indent(1), context));
        }
    }
    lines
}

pub fn print_pages(pages: &[Page]) {
    for line in format_pages(pages) {
        println!("{}", line);
    }
}

// ============================================================================
// Single post
// ============================================================================

fn format_thread(
    lines: &mut Vec<String>,
    by_parent: &BTreeMap<Option<Uuid>, Vec<&Comment>>,
    parent: Option<Uuid>,
    contents: &HashMap<Uuid, String>,
    depth: usize,
) {
    let Some(children) = by_parent.get(&parent) else {
        return;
    };
    for (i, comment) in children.iter().enumerate() {
        lines.push(format!(
            "{}{} {} ({})",
            indent(depth),
            format_index(i + 1),
            comment.author.name,
            comment.published.to_rfc3339()
        ));
        if let Some(html) = contents.get(&comment.uuid) {
            let text = preview(&strip_html_tags(html), PREVIEW_LEN);
            if !text.is_empty() {
                lines.push(format!("{}{}", indent(depth + 1), text));
            }
        }
        format_thread(lines, by_parent, Some(comment.uuid), contents, depth + 1);
    }
}

/// Format one post with its comment threads.
///
/// `contents` maps comment UUIDs to their HTML; comments without an entry
/// are listed without a preview.
pub fn format_post(post: &Post, contents: &HashMap<Uuid, String>) -> Vec<String> {
    let mut lines = vec![format!("{} \u{2192} {}", post.title, post.url_path)];
    lines.push(format!("{}Published: {}", indent(1), post.published.to_rfc3339()));
    lines.push(format!("{}Author: {}", indent(1), post.author.name));
    lines.push(format!("{}UUID: {}", indent(1), post.uuid));
    if !post.tags.is_empty() {
        lines.push(format!("{}Tags: {}", indent(1), post.tags.join(", ")));
    }
    for item in post.media.iter() {
        lines.push(format!(
            "{}Media: {}",
            indent(1),
            item.source_path().display()
        ));
    }
    if !post.comments.is_empty() {
        lines.push(format!("{}Comments", indent(1)));
        format_thread(&mut lines, &post.comments_by_parent(), None, contents, 1);
    }
    lines
}

pub fn print_post(post: &Post, contents: &HashMap<Uuid, String>) {
    for line in format_post(post, contents) {
        println!("{}", line);
    }
}

/// Format any page: posts get the detailed view, everything else the same
/// header and context lines as [`format_pages`].
pub fn format_page(page: &Page, contents: &HashMap<Uuid, String>) -> Vec<String> {
    if let Page::Post(post) = page {
        return format_post(post, contents);
    }
    let mut lines = vec![format!("{} \u{2192} {}", page.title(), page.url_path())];
    lines.push(format!("{}Kind: {}", indent(1), page.kind()));
    for context in page_context(page) {
        lines.push(format!("{}{}", indent(1), context));
    }
    lines
}

pub fn print_page(page: &Page, contents: &HashMap<Uuid, String>) {
    for line in format_page(page, contents) {
        println!("{}", line);
    }
}

// ============================================================================
// Pagination nav
// ============================================================================

/// One line of page numbers, with the current page in brackets and `...`
/// for each gap.
///
/// ```text
/// 1 ... 4 [5] 6 ... 10
/// ```
pub fn format_nav(current: usize, total: usize, show_either_side: usize) -> String {
    pagination::nav(current, total, show_either_side)
        .map(|entry| match entry {
            Some(page) if page == current => format!("[{}]", page),
            Some(page) => page.to_string(),
            None => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Check summary
// ============================================================================

/// Page counts per kind followed by totals for pages and image outputs.
pub fn format_check_summary(
    pages: &[Page],
    comments: usize,
    outputs: &[ResolvedOutput],
) -> Vec<String> {
    let mut counts: BTreeMap<PageKind, usize> = BTreeMap::new();
    for page in pages {
        *counts.entry(page.kind()).or_default() += 1;
    }
    let per_kind = counts
        .iter()
        .map(|(kind, count)| format!("{} {}", count, kind))
        .collect::<Vec<_>>()
        .join(", ");
    vec![
        per_kind,
        format!("Checked {} pages, {} comments", pages.len(), comments),
        format!(
            "Resolved {} image outputs, {} built",
            outputs.len(),
            outputs.iter().filter(|output| output.is_built()).count()
        ),
    ]
}

pub fn print_check_summary(pages: &[Page], comments: usize, outputs: &[ResolvedOutput]) {
    for line in format_check_summary(pages, comments, outputs) {
        println!("{}", line);
    }
}
