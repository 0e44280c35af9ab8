//! Pages showing a single gallery item at full size.

use super::{Page, PageBase};
use crate::error::MetadataError;
use crate::media::{Media, MediaItem};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItemDetails {
    pub url_path: String,
    pub title: String,
    /// Just the details variant of `item`.
    pub media: Media,
    pub parent_url_path: String,
    /// The item as it appears on the parent page.
    pub item: MediaItem,
}

impl MediaItemDetails {
    /// `{parent url}media/{file stem}/`, titled like the parent.
    pub fn new(parent: &dyn PageBase, item: &MediaItem) -> Result<Self, MetadataError> {
        let path = parent
            .metadata_path()
            .ok_or_else(|| MetadataError::MediaWithoutMetadata(parent.url_path().to_string()))?;
        let source_path = item.source_path();
        let stem = source_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| MetadataError::InvalidMediaSource {
                path: path.clone(),
                source_path: source_path.to_path_buf(),
            })?;
        let media = Media::from_items([item.details_page_item()], &path)?;
        Ok(Self {
            url_path: format!("{}media/{stem}/", parent.url_path()),
            title: parent.title().to_string(),
            media,
            parent_url_path: parent.url_path().to_string(),
            item: item.clone(),
        })
    }

    /// One page per gallery item of each page in `pages`.
    ///
    /// Details pages in `pages` are skipped, so details never nest.
    pub fn derive(pages: &[Page]) -> Result<Vec<Self>, MetadataError> {
        let mut details = Vec::new();
        for page in pages {
            if matches!(page, Page::MediaItemDetails(_)) {
                continue;
            }
            for item in page.media().iter() {
                if item.gallery_group().is_some() {
                    details.push(Self::new(page, item)?);
                }
            }
        }
        Ok(details)
    }
}

impl PageBase for MediaItemDetails {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{Mode, SourceTree};
    use crate::page::Loader;
    use crate::test_helpers::*;
    use std::path::Path;

    #[test]
    fn derived_from_gallery_items() {
        let tmp = setup_fixtures();
        let fs = SourceTree::new(tmp.path(), Mode::Render);
        let loader = Loader::new(&fs);
        let post = loader
            .post(Path::new("posts/2025-06-27-first-light/index.html.jinja"))
            .unwrap();
        let details = MediaItemDetails::derive(&[Page::Post(post)]).unwrap();
        let url_paths: Vec<&str> = details.iter().map(|d| d.url_path.as_str()).collect();
        assert_eq!(
            url_paths,
            vec![
                "/2025/06/27/first-light/media/gulls/",
                "/2025/06/27/first-light/media/boats/",
            ]
        );
        let gulls = &details[0];
        assert_eq!(gulls.title, "First light");
        assert_eq!(gulls.parent_url_path, "/2025/06/27/first-light/");
        assert_eq!(gulls.item.gallery_group(), Some("harbor"));
        let shown: Vec<&MediaItem> = gulls.media.iter().collect();
        assert_eq!(shown, vec![&gulls.item.details_page_item()]);
        assert_eq!(shown[0].gallery_group(), None);
    }

    #[test]
    fn source_without_file_name() {
        let tmp = setup_fixtures();
        write_file(
            tmp.path(),
            "standalone/about/metadata.toml",
            r#"
            title = "About"
            media = [{ type = "image", source = "..", alt_text = "Up", gallery_group = "g" }]
            "#,
        );
        let fs = SourceTree::new(tmp.path(), Mode::Render);
        let about = Loader::new(&fs)
            .standalone_page(Path::new("standalone/about/index.html.jinja"))
            .unwrap();
        let err = MediaItemDetails::derive(&[Page::Standalone(about)]).unwrap_err();
        match err {
            MetadataError::InvalidMediaSource { path, source_path } => {
                assert_eq!(path, Path::new("standalone/about/metadata.toml"));
                assert_eq!(source_path, Path::new("standalone/about/.."));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn derived_pages_have_no_metadata() {
        let tmp = setup_fixtures();
        let fs = SourceTree::new(tmp.path(), Mode::Render);
        let loader = Loader::new(&fs);
        let list = loader.main_list().unwrap();
        let item = loader
            .standalone_page(Path::new("standalone/about/index.html.jinja"))
            .unwrap()
            .media
            .iter()
            .next()
            .cloned()
            .unwrap();
        let err = MediaItemDetails::new(&list, &item).unwrap_err();
        assert!(matches!(err, MetadataError::MediaWithoutMetadata(url_path) if url_path == "/"));
    }

    #[test]
    fn details_do_not_nest() {
        let tmp = setup_fixtures();
        let fs = SourceTree::new(tmp.path(), Mode::Render);
        let loader = Loader::new(&fs);
        let about = loader
            .standalone_page(Path::new("standalone/about/index.html.jinja"))
            .unwrap();
        let first = MediaItemDetails::derive(&[Page::Standalone(about)]).unwrap();
        assert_eq!(first.len(), 1);
        let pages: Vec<Page> = first.into_iter().map(Page::MediaItemDetails).collect();
        assert!(MediaItemDetails::derive(&pages).unwrap().is_empty());
    }
}
