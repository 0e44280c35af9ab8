//! Every renderable URL of the site.
//!
//! [`Page`] is a closed set of page kinds. Error, standalone and post pages
//! are loaded from a template's `metadata.toml`; post lists and their pages
//! are derived from the loaded posts; media details pages are derived from
//! the gallery media of every other page.
//!
//! Loading goes through a [`Loader`], which owns the filesystem collaborator
//! and caches each loaded page by template path:
//!
//! ```text
//! Loader::current(template)     errors/ → Error, standalone/ → Standalone, posts/ → Post
//! Loader::all()                 Error + Standalone + Post + PostListPage, then MediaItemDetails
//! ```

pub mod error;
pub mod media_details;
pub mod post;
pub mod post_list;
pub mod standalone;

pub use error::ErrorPage;
pub use media_details::MediaItemDetails;
pub use post::Post;
pub use post_list::{PostList, PostListKind, PostListPage};
pub use standalone::Standalone;

use crate::error::MetadataError;
use crate::fs::Filesystem;
use crate::media::{Media, ResolvedOutput};
use crate::memo::Memo;
use crate::resource::absolute_url;
use crate::site::site;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info};

/// Top-level source directories and the page kinds loaded from them.
pub const ERRORS_DIR: &str = "errors";
pub const STANDALONE_DIR: &str = "standalone";
pub const POSTS_DIR: &str = "posts";

/// Fields every page has.
pub trait PageBase {
    fn url_path(&self) -> &str;
    fn title(&self) -> &str;
    fn media(&self) -> &Media;

    /// The `metadata.toml` this page was loaded from. Derived pages have none.
    fn metadata_path(&self) -> Option<PathBuf> {
        None
    }

    fn url(&self) -> String {
        absolute_url(self.url_path())
    }

    /// Title for `<title>`, with the site title appended.
    fn full_title(&self) -> String {
        site().full_title(self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Error,
    Standalone,
    Post,
    PostList,
    PostListPage,
    MediaItemDetails,
}

impl PageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PageKind::Error => "error",
            PageKind::Standalone => "standalone",
            PageKind::Post => "post",
            PageKind::PostList => "post_list",
            PageKind::PostListPage => "post_list_page",
            PageKind::MediaItemDetails => "media_item_details",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Page {
    Error(ErrorPage),
    Standalone(Standalone),
    Post(Rc<Post>),
    PostList(Rc<PostList>),
    PostListPage(PostListPage),
    MediaItemDetails(MediaItemDetails),
}

impl Page {
    pub fn kind(&self) -> PageKind {
        match self {
            Page::Error(_) => PageKind::Error,
            Page::Standalone(_) => PageKind::Standalone,
            Page::Post(_) => PageKind::Post,
            Page::PostList(_) => PageKind::PostList,
            Page::PostListPage(_) => PageKind::PostListPage,
            Page::MediaItemDetails(_) => PageKind::MediaItemDetails,
        }
    }

    fn base(&self) -> &dyn PageBase {
        match self {
            Page::Error(page) => page,
            Page::Standalone(page) => page,
            Page::Post(page) => page.as_ref(),
            Page::PostList(page) => page.as_ref(),
            Page::PostListPage(page) => page,
            Page::MediaItemDetails(page) => page,
        }
    }

    /// Every URL path this page answers to, primary first.
    pub fn url_paths(&self) -> Vec<&str> {
        let mut url_paths = vec![self.url_path()];
        if let Page::Post(post) = self {
            url_paths.extend(post.url_path_aliases.iter().map(String::as_str));
        }
        url_paths
    }
}

impl PageBase for Page {
    fn url_path(&self) -> &str {
        self.base().url_path()
    }

    fn title(&self) -> &str {
        self.base().title()
    }

    fn media(&self) -> &Media {
        self.base().media()
    }

    fn metadata_path(&self) -> Option<PathBuf> {
        self.base().metadata_path()
    }
}

/// Loaded values keyed by template path.
struct TemplateCache<T> {
    entries: RefCell<HashMap<PathBuf, T>>,
}

impl<T: Clone> TemplateCache<T> {
    fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }

    fn get_or_load(
        &self,
        template: &Path,
        load: impl FnOnce() -> Result<T, MetadataError>,
    ) -> Result<T, MetadataError> {
        if let Some(cached) = self.entries.borrow().get(template) {
            return Ok(cached.clone());
        }
        let loaded = load()?;
        self.entries
            .borrow_mut()
            .insert(template.to_path_buf(), loaded.clone());
        Ok(loaded)
    }

    fn clear(&mut self) {
        self.entries.get_mut().clear();
    }
}

type KindLoader = fn(&Loader<'_>) -> Result<Vec<Page>, MetadataError>;

/// Page kinds enumerated by [`Loader::all`], in output order.
///
/// Post lists themselves are left out: their first page has the same URL.
/// Media details pages are derived from these afterwards and never from
/// each other.
const PAGE_KINDS: [(PageKind, KindLoader); 4] = [
    (PageKind::Error, error_pages),
    (PageKind::Standalone, standalone_pages),
    (PageKind::Post, post_pages),
    (PageKind::PostListPage, post_list_pages),
];

fn error_pages(loader: &Loader<'_>) -> Result<Vec<Page>, MetadataError> {
    Ok(loader.errors()?.into_iter().map(Page::Error).collect())
}

fn standalone_pages(loader: &Loader<'_>) -> Result<Vec<Page>, MetadataError> {
    Ok(loader
        .standalone()?
        .into_iter()
        .map(Page::Standalone)
        .collect())
}

fn post_pages(loader: &Loader<'_>) -> Result<Vec<Page>, MetadataError> {
    Ok(loader.posts()?.iter().cloned().map(Page::Post).collect())
}

fn post_list_pages(loader: &Loader<'_>) -> Result<Vec<Page>, MetadataError> {
    let mut pages = Vec::new();
    for list in loader.post_lists()? {
        pages.extend(
            list.page_by_number()
                .values()
                .cloned()
                .map(Page::PostListPage),
        );
    }
    Ok(pages)
}

/// Loads pages through a filesystem collaborator.
///
/// Loaded pages are cached by template path for the life of the loader, or
/// until [`clear_cache`](Self::clear_cache).
pub struct Loader<'fs> {
    fs: &'fs dyn Filesystem,
    errors: TemplateCache<ErrorPage>,
    standalone: TemplateCache<Standalone>,
    posts: TemplateCache<Rc<Post>>,
    all_posts: Memo<Rc<[Rc<Post>]>>,
}

impl<'fs> Loader<'fs> {
    pub fn new(fs: &'fs dyn Filesystem) -> Self {
        Self {
            fs,
            errors: TemplateCache::new(),
            standalone: TemplateCache::new(),
            posts: TemplateCache::new(),
            all_posts: Memo::new(),
        }
    }

    pub fn fs(&self) -> &'fs dyn Filesystem {
        self.fs
    }

    pub fn clear_cache(&mut self) {
        self.errors.clear();
        self.standalone.clear();
        self.posts.clear();
        self.all_posts = Memo::new();
    }

    /// Load the page rendered by `template`, classified by its top-level
    /// directory.
    pub fn current(&self, template: &Path) -> Result<Page, MetadataError> {
        let template = &source_relative(template);
        if template.starts_with(ERRORS_DIR) {
            Ok(Page::Error(self.error(template)?))
        } else if template.starts_with(STANDALONE_DIR) {
            Ok(Page::Standalone(self.standalone_page(template)?))
        } else if template.starts_with(POSTS_DIR) {
            Ok(Page::Post(self.post(template)?))
        } else {
            Err(MetadataError::NotImplemented(template.to_path_buf()))
        }
    }

    pub fn error(&self, template: &Path) -> Result<ErrorPage, MetadataError> {
        self.errors
            .get_or_load(template, || ErrorPage::load(template))
    }

    /// One page per error template in the build config.
    pub fn errors(&self) -> Result<Vec<ErrorPage>, MetadataError> {
        let config = self.fs.read_config()?;
        config
            .templates_in(ERRORS_DIR)
            .map(|template| self.error(template))
            .collect()
    }

    pub fn standalone_page(&self, template: &Path) -> Result<Standalone, MetadataError> {
        self.standalone
            .get_or_load(template, || Standalone::load(self.fs, template))
    }

    /// Standalone pages in site navigation order.
    ///
    /// The list comes from the site config rather than the build config, so
    /// adding a template elsewhere doesn't change every page's navigation.
    pub fn standalone(&self) -> Result<Vec<Standalone>, MetadataError> {
        site()
            .standalone
            .iter()
            .map(|template| self.standalone_page(template))
            .collect()
    }

    pub fn post(&self, template: &Path) -> Result<Rc<Post>, MetadataError> {
        self.posts
            .get_or_load(template, || Post::load(self.fs, template).map(Rc::new))
    }

    /// Every post, most recently published first.
    ///
    /// Fails if any two posts share a URL path (aliases included), a UUID,
    /// or a published instant.
    pub fn posts(&self) -> Result<Rc<[Rc<Post>]>, MetadataError> {
        let posts = self.all_posts.get_or_try_init(|| {
            let config = self.fs.read_config()?;
            let mut posts = config
                .templates_in(POSTS_DIR)
                .map(|template| self.post(template))
                .collect::<Result<Vec<_>, _>>()?;
            posts.sort_by(|a, b| b.published.cmp(&a.published));
            post::check_unique(&posts)?;
            info!(count = posts.len(), "Loaded posts");
            Ok::<_, MetadataError>(Rc::from(posts))
        })?;
        Ok(Rc::clone(posts))
    }

    pub fn main_list(&self) -> Result<PostList, MetadataError> {
        Ok(PostList::main(self.posts()?.to_vec()))
    }

    /// One list per site tag, in site tag order. Tags without posts still
    /// get a (single, empty) list.
    pub fn tag_lists(&self) -> Result<Vec<PostList>, MetadataError> {
        let posts = self.posts()?;
        Ok(site()
            .tags
            .iter()
            .map(|tag| PostList::tag(tag, &posts))
            .collect())
    }

    pub fn tag_list(&self, tag: &str) -> Result<Option<PostList>, MetadataError> {
        if !site().is_tag(tag) {
            return Ok(None);
        }
        Ok(Some(PostList::tag(tag, &self.posts()?)))
    }

    /// The main list followed by every tag list.
    pub fn post_lists(&self) -> Result<Vec<PostList>, MetadataError> {
        let mut lists = vec![self.main_list()?];
        lists.extend(self.tag_lists()?);
        Ok(lists)
    }

    /// Links for the site-wide navigation bar.
    pub fn main_nav(&self) -> Result<Vec<Page>, MetadataError> {
        let mut nav = vec![Page::PostList(Rc::new(self.main_list()?))];
        nav.extend(self.standalone()?.into_iter().map(Page::Standalone));
        Ok(nav)
    }

    /// Every page of the site.
    ///
    /// Fails if any two pages answer to the same URL path.
    pub fn all(&self) -> Result<Vec<Page>, MetadataError> {
        let mut pages = Vec::new();
        for (kind, load) in PAGE_KINDS {
            let loaded = load(self)?;
            debug!(%kind, count = loaded.len(), "Loaded pages");
            pages.extend(loaded);
        }
        let details = MediaItemDetails::derive(&pages)?;
        debug!(count = details.len(), "Derived media details pages");
        pages.extend(details.into_iter().map(Page::MediaItemDetails));
        check_unique_url_paths(&pages)?;
        info!(count = pages.len(), "Loaded site");
        Ok(pages)
    }
}

/// Build artifacts of every page's media, one per work path.
///
/// Reads go through `fs`, so its mode decides whether outputs that aren't
/// built yet are deferred or fail, and every artifact becomes a recorded
/// dependency.
pub fn resolve_media(
    fs: &dyn Filesystem,
    pages: &[Page],
) -> Result<Vec<ResolvedOutput>, MetadataError> {
    let mut by_work_path: BTreeMap<PathBuf, ResolvedOutput> = BTreeMap::new();
    for page in pages {
        for item in page.media().iter() {
            for output in item.resolve_outputs(fs)? {
                by_work_path.entry(output.work_path.clone()).or_insert(output);
            }
        }
    }
    let outputs: Vec<ResolvedOutput> = by_work_path.into_values().collect();
    let built = outputs.iter().filter(|output| output.is_built()).count();
    info!(count = outputs.len(), built, "Resolved image outputs");
    Ok(outputs)
}

/// `template` without leading `./` components.
fn source_relative(template: &Path) -> PathBuf {
    template
        .components()
        .skip_while(|component| matches!(component, Component::CurDir))
        .collect()
}

fn check_unique_url_paths(pages: &[Page]) -> Result<(), MetadataError> {
    let mut pages_by_url_path: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for page in pages {
        for url_path in page.url_paths() {
            pages_by_url_path
                .entry(url_path.to_string())
                .or_default()
                .push(format!("{} {:?}", page.kind(), page.title()));
        }
    }
    let duplicates: BTreeMap<String, BTreeSet<String>> = pages_by_url_path
        .into_iter()
        .filter(|(_, pages)| pages.len() > 1)
        .map(|(url_path, pages)| (url_path, pages.into_iter().collect()))
        .collect();
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(MetadataError::DuplicateUrlPaths(duplicates))
    }
}
