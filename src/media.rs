//! Media items embedded in pages.
//!
//! A page's `metadata.toml` lists its media as an array of typed tables:
//!
//! ```toml
//! [[media]]
//! type = "image"
//! source = "P1230630.jpg"
//! alt_text = "A cat asleep on a keyboard"
//! gallery_group = "cats"
//! opengraph = true
//! ```
//!
//! Source paths are relative to the template's directory. Each image is
//! converted once per use (gallery thumbnail, floated, full screen, Open
//! Graph, main) by an external converter; this module only describes the
//! conversions and reads back the artifacts they leave in the work tree.
//! Those reads are lenient: during a scan the artifacts may not exist yet.

use crate::error::MetadataError;
use crate::fs::Filesystem;
use crate::memo::Memo;
use crate::paths;
use crate::source::{check_keys, optional_bool, optional_str, required_str};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix of the file holding the output path chosen by the cache buster.
pub const CACHE_BUSTER_SUFFIX: &str = ".cache-buster-output-filename";
pub const METADATA_SUFFIX: &str = ".json";

/// How to convert a source image into one output file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImageConversion {
    /// Appended to the source stem for the file in the work tree.
    pub work_suffix: String,
    /// Appended to the source stem for the published file.
    pub output_suffix: String,
    pub max_width: u32,
    pub max_height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
}

impl ImageConversion {
    pub fn jpeg(max_width: u32, max_height: u32, quality: u8) -> Self {
        Self {
            work_suffix: format!("-{max_width}x{max_height}q{quality}.jpg"),
            output_suffix: format!("-q{quality}.jpg"),
            max_width,
            max_height,
            quality: Some(quality),
        }
    }

    pub fn png(max_width: u32, max_height: u32) -> Self {
        Self {
            work_suffix: format!("-{max_width}x{max_height}.png"),
            output_suffix: ".png".to_string(),
            max_width,
            max_height,
            quality: None,
        }
    }
}

/// Dimensions and type of a converted image, as recorded by the converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOutputMetadata {
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
}

/// Result of applying an [`ImageConversion`] to a source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageOutput {
    pub source: PathBuf,
    pub conversion: ImageConversion,
    #[serde(skip)]
    url_path: Memo<Option<String>>,
    #[serde(skip)]
    metadata: Memo<Option<ImageOutputMetadata>>,
}

impl ImageOutput {
    pub fn new(source: impl Into<PathBuf>, conversion: ImageConversion) -> Self {
        Self {
            source: source.into(),
            conversion,
            url_path: Memo::new(),
            metadata: Memo::new(),
        }
    }

    fn stem(&self) -> String {
        self.source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn work_path(&self) -> PathBuf {
        let parent = self.source.parent().unwrap_or_else(|| Path::new(""));
        paths::work(parent).join(format!("{}{}", self.stem(), self.conversion.work_suffix))
    }

    /// File name the cache buster starts from before adding its hash.
    pub fn output_filename_base(&self) -> String {
        format!("{}{}", self.stem(), self.conversion.output_suffix)
    }

    pub fn cache_buster_path(&self) -> PathBuf {
        with_suffix(&self.work_path(), CACHE_BUSTER_SUFFIX)
    }

    pub fn metadata_path(&self) -> PathBuf {
        with_suffix(&self.work_path(), METADATA_SUFFIX)
    }

    /// URL path of the published file, or `None` while it isn't built yet.
    pub fn url_path(&self, fs: &dyn Filesystem) -> Result<Option<&str>, MetadataError> {
        let url_path = self.url_path.get_or_try_init(|| {
            let Some(output_path) = fs.read_text(&self.cache_buster_path(), true)? else {
                return Ok::<_, MetadataError>(None);
            };
            Ok(Some(paths::to_url_path(Path::new(output_path.trim()))?))
        })?;
        Ok(url_path.as_deref())
    }

    /// Converter metadata, or `None` while it isn't built yet.
    pub fn metadata(
        &self,
        fs: &dyn Filesystem,
    ) -> Result<Option<&ImageOutputMetadata>, MetadataError> {
        let metadata = self.metadata.get_or_try_init(|| {
            let path = self.metadata_path();
            let Some(raw) = fs.read_text(&path, true)? else {
                return Ok::<_, MetadataError>(None);
            };
            serde_json::from_str(&raw)
                .map(Some)
                .map_err(|error| MetadataError::Json { path, error })
        })?;
        Ok(metadata.as_ref())
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut path = path.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}

/// Built state of one [`ImageOutput`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedOutput {
    pub image_use: ImageUse,
    pub work_path: PathBuf,
    /// `None` while the output isn't built yet.
    pub url_path: Option<String>,
    pub metadata: Option<ImageOutputMetadata>,
}

impl ResolvedOutput {
    pub fn is_built(&self) -> bool {
        self.url_path.is_some() && self.metadata.is_some()
    }
}

/// Sizes for one use of an image, at several pixel densities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageProfile {
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: u8,
    /// Multipliers of the base size; the largest is the primary output.
    pub factors: &'static [u32],
    /// CSS `sizes` value for responsive images.
    pub inline_size: &'static str,
}

impl ImageProfile {
    fn conversion(&self, source: &Path, factor: u32) -> Result<ImageConversion, MetadataError> {
        let width = self.max_width * factor;
        let height = self.max_height * factor;
        let extension = source
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
        match extension.as_deref() {
            Some("jpg" | "jpeg") => Ok(ImageConversion::jpeg(width, height, self.jpeg_quality)),
            Some("png") => Ok(ImageConversion::png(width, height)),
            _ => Err(MetadataError::UnsupportedImageFormat(source.to_path_buf())),
        }
    }

    /// One output per factor, largest first.
    pub fn outputs(&self, source: &Path) -> Result<Vec<ImageOutput>, MetadataError> {
        let mut factors = self.factors.to_vec();
        factors.sort_unstable_by(|a, b| b.cmp(a));
        factors
            .into_iter()
            .map(|factor| Ok(ImageOutput::new(source, self.conversion(source, factor)?)))
            .collect()
    }

    pub fn primary_output(&self, source: &Path) -> Result<ImageOutput, MetadataError> {
        let factor = self.factors.iter().copied().max().unwrap_or(1);
        Ok(ImageOutput::new(source, self.conversion(source, factor)?))
    }

    /// Outputs whose published files differ.
    ///
    /// Small sources scaled by different factors can end up as the same
    /// file, which the cache buster then publishes once. Outputs that aren't
    /// built yet are all kept.
    pub fn unique_outputs(
        &self,
        source: &Path,
        fs: &dyn Filesystem,
    ) -> Result<Vec<ImageOutput>, MetadataError> {
        let mut seen = Vec::new();
        let mut unique = Vec::new();
        for output in self.outputs(source)? {
            match output.url_path(fs)? {
                Some(url_path) if seen.iter().any(|s: &String| s == url_path) => continue,
                Some(url_path) => seen.push(url_path.to_string()),
                None => {}
            }
            unique.push(output);
        }
        // Smallest first so srcset candidates read naturally.
        unique.reverse();
        Ok(unique)
    }
}

/// The ways a page can show an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageUse {
    Gallery,
    Float,
    FullScreen,
    OpenGraph,
    Main,
}

impl ImageUse {
    pub fn profile(self) -> ImageProfile {
        match self {
            ImageUse::Gallery => ImageProfile {
                max_width: 240,
                max_height: 240,
                jpeg_quality: 85,
                factors: &[1, 2, 4],
                inline_size: "15em",
            },
            ImageUse::Float => ImageProfile {
                max_width: 320,
                max_height: 480,
                jpeg_quality: 85,
                factors: &[1, 2, 4],
                inline_size: "20em",
            },
            ImageUse::FullScreen => ImageProfile {
                max_width: 1920,
                max_height: 1920,
                jpeg_quality: 90,
                factors: &[1, 2],
                inline_size: "100vw",
            },
            // Open Graph consumers only ever fetch one size.
            ImageUse::OpenGraph => ImageProfile {
                max_width: 1200,
                max_height: 1200,
                jpeg_quality: 90,
                factors: &[1],
                inline_size: "",
            },
            ImageUse::Main => ImageProfile {
                max_width: 960,
                max_height: 960,
                jpeg_quality: 90,
                factors: &[1, 2],
                inline_size: "60em",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub source_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery_group: Option<String>,
    pub opengraph: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_template: Option<PathBuf>,
    pub alt_text: String,
    pub float: bool,
    pub full_screen: bool,
    pub main: bool,
}

impl Image {
    const KEYS: &[&str] = &[
        "type",
        "source",
        "alt_text",
        "gallery_group",
        "opengraph",
        "description_template",
        "float",
        "full_screen",
        "main",
    ];

    fn from_table(table: &toml::Table, dir: &Path, path: &Path) -> Result<Self, MetadataError> {
        check_keys(table, Self::KEYS, path)?;
        Ok(Self {
            source_path: dir.join(required_str(table, "source", path)?),
            gallery_group: optional_str(table, "gallery_group", path)?.map(str::to_string),
            opengraph: optional_bool(table, "opengraph", path)?,
            description_template: optional_str(table, "description_template", path)?
                .map(|template| dir.join(template)),
            alt_text: required_str(table, "alt_text", path)?.to_string(),
            float: optional_bool(table, "float", path)?,
            full_screen: optional_bool(table, "full_screen", path)?,
            main: optional_bool(table, "main", path)?,
        })
    }

    /// Every use this image is configured for.
    pub fn uses(&self) -> Vec<ImageUse> {
        [
            (self.gallery_group.is_some(), ImageUse::Gallery),
            (self.float, ImageUse::Float),
            (self.full_screen, ImageUse::FullScreen),
            (self.opengraph, ImageUse::OpenGraph),
            (self.main, ImageUse::Main),
        ]
        .into_iter()
        .filter_map(|(enabled, image_use)| enabled.then_some(image_use))
        .collect()
    }

    /// Outputs for one use of this image, largest first.
    pub fn outputs(&self, image_use: ImageUse) -> Result<Vec<ImageOutput>, MetadataError> {
        image_use.profile().outputs(&self.source_path)
    }

    /// Read back the artifacts of every configured use.
    ///
    /// Outputs that collapse into the same published file are resolved once
    /// per use. During a scan, outputs not built yet resolve with `None`
    /// fields; when rendering they are errors.
    pub fn resolve_outputs(
        &self,
        fs: &dyn Filesystem,
    ) -> Result<Vec<ResolvedOutput>, MetadataError> {
        let mut resolved = Vec::new();
        for image_use in self.uses() {
            for output in image_use.profile().unique_outputs(&self.source_path, fs)? {
                resolved.push(ResolvedOutput {
                    image_use,
                    work_path: output.work_path(),
                    url_path: output.url_path(fs)?.map(str::to_string),
                    metadata: output.metadata(fs)?.cloned(),
                });
            }
        }
        Ok(resolved)
    }

    pub fn details_page_item(&self) -> Self {
        Self {
            gallery_group: None,
            opengraph: true,
            float: false,
            full_screen: true,
            main: false,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaItem {
    Image(Image),
}

impl MediaItem {
    fn from_value(value: &toml::Value, dir: &Path, path: &Path) -> Result<Self, MetadataError> {
        let table = value.as_table().ok_or_else(|| MetadataError::WrongType {
            path: path.to_path_buf(),
            key: "media".to_string(),
            expected: "an array of tables",
        })?;
        match required_str(table, "type", path)? {
            "image" => Ok(MediaItem::Image(Image::from_table(table, dir, path)?)),
            kind => Err(MetadataError::UnknownMediaType {
                path: path.to_path_buf(),
                kind: kind.to_string(),
            }),
        }
    }

    pub fn source_path(&self) -> &Path {
        match self {
            MediaItem::Image(image) => &image.source_path,
        }
    }

    pub fn gallery_group(&self) -> Option<&str> {
        match self {
            MediaItem::Image(image) => image.gallery_group.as_deref(),
        }
    }

    pub fn opengraph(&self) -> bool {
        match self {
            MediaItem::Image(image) => image.opengraph,
        }
    }

    pub fn description_template(&self) -> Option<&Path> {
        match self {
            MediaItem::Image(image) => image.description_template.as_deref(),
        }
    }

    /// Variant of this item for its own media details page.
    pub fn details_page_item(&self) -> Self {
        match self {
            MediaItem::Image(image) => MediaItem::Image(image.details_page_item()),
        }
    }

    pub fn resolve_outputs(
        &self,
        fs: &dyn Filesystem,
    ) -> Result<Vec<ResolvedOutput>, MetadataError> {
        match self {
            MediaItem::Image(image) => image.resolve_outputs(fs),
        }
    }
}

/// The media of one page, keyed by source path, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Media {
    pub item_by_source: BTreeMap<PathBuf, MediaItem>,
    #[serde(skip)]
    order: Vec<PathBuf>,
}

impl Media {
    /// Parse the optional `media` array of a page's configuration.
    pub fn from_config(
        value: Option<&toml::Value>,
        dir: &Path,
        path: &Path,
    ) -> Result<Self, MetadataError> {
        let Some(value) = value else {
            return Ok(Self::default());
        };
        let items = value.as_array().ok_or_else(|| MetadataError::WrongType {
            path: path.to_path_buf(),
            key: "media".to_string(),
            expected: "an array of tables",
        })?;
        let mut media = Self::default();
        for item in items {
            media.insert(MediaItem::from_value(item, dir, path)?, path)?;
        }
        debug!(path = %path.display(), items = media.len(), "Loaded media");
        Ok(media)
    }

    pub fn from_items(
        items: impl IntoIterator<Item = MediaItem>,
        path: &Path,
    ) -> Result<Self, MetadataError> {
        let mut media = Self::default();
        for item in items {
            media.insert(item, path)?;
        }
        Ok(media)
    }

    fn insert(&mut self, item: MediaItem, path: &Path) -> Result<(), MetadataError> {
        let source_path = item.source_path().to_path_buf();
        if self.item_by_source.contains_key(&source_path) {
            return Err(MetadataError::DuplicateMediaItem {
                path: path.to_path_buf(),
                source_path,
            });
        }
        self.order.push(source_path.clone());
        self.item_by_source.insert(source_path, item);
        Ok(())
    }

    pub fn get(&self, source_path: &Path) -> Option<&MediaItem> {
        self.item_by_source.get(source_path)
    }

    /// Items in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &MediaItem> {
        self.order
            .iter()
            .filter_map(|source_path| self.item_by_source.get(source_path))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Items that appear in a gallery, grouped by gallery name.
    pub fn galleries(&self) -> BTreeMap<&str, Vec<&MediaItem>> {
        let mut galleries: BTreeMap<&str, Vec<&MediaItem>> = BTreeMap::new();
        for item in self.iter() {
            if let Some(group) = item.gallery_group() {
                galleries.entry(group).or_default().push(item);
            }
        }
        galleries
    }

    pub fn opengraph(&self) -> impl Iterator<Item = &MediaItem> {
        self.iter().filter(|item| item.opengraph())
    }
}

/// Media parsed from the `media` key of an already-read table.
pub(crate) fn media_of(
    table: &toml::Table,
    template: &Path,
    path: &Path,
) -> Result<Media, MetadataError> {
    let dir = template.parent().unwrap_or_else(|| Path::new(""));
    Media::from_config(table.get("media"), dir, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{Mode, SourceTree};
    use std::fs;
    use tempfile::TempDir;

    fn parse(text: &str) -> Result<Media, MetadataError> {
        let table = crate::source::parse_table(text, Path::new("metadata.toml")).unwrap();
        media_of(
            &table,
            Path::new("posts/2025-06-27-foo/index.html.jinja"),
            Path::new("metadata.toml"),
        )
    }

    fn image(media: &Media, source: &str) -> Image {
        match media.get(Path::new(source)).unwrap() {
            MediaItem::Image(image) => image.clone(),
        }
    }

    #[test]
    fn conversions() {
        let jpeg = ImageConversion::jpeg(64, 48, 90);
        assert_eq!(jpeg.work_suffix, "-64x48q90.jpg");
        assert_eq!(jpeg.output_suffix, "-q90.jpg");
        let png = ImageConversion::png(64, 48);
        assert_eq!(png.work_suffix, "-64x48.png");
        assert_eq!(png.output_suffix, ".png");
    }

    #[test]
    fn parse_image() {
        let media = parse(
            r#"
            [[media]]
            type = "image"
            source = "foo.jpg"
            alt_text = "Foo"
            gallery_group = "g"
            description_template = "foo.html.jinja"
            float = true
            "#,
        )
        .unwrap();
        let foo = image(&media, "posts/2025-06-27-foo/foo.jpg");
        assert_eq!(foo.alt_text, "Foo");
        assert_eq!(foo.gallery_group.as_deref(), Some("g"));
        assert_eq!(
            foo.description_template.as_deref(),
            Some(Path::new("posts/2025-06-27-foo/foo.html.jinja"))
        );
        assert!(foo.float);
        assert!(!foo.opengraph && !foo.full_screen && !foo.main);
        assert_eq!(foo.uses(), vec![ImageUse::Gallery, ImageUse::Float]);
    }

    #[test]
    fn no_media_key_is_empty() {
        assert!(parse("title = \"x\"").unwrap().is_empty());
    }

    #[test]
    fn order_is_preserved() {
        let media = parse(
            r#"
            media = [
                { type = "image", source = "b.jpg", alt_text = "B" },
                { type = "image", source = "a.jpg", alt_text = "A" },
            ]
            "#,
        )
        .unwrap();
        let order: Vec<_> = media
            .iter()
            .map(|item| item.source_path().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(order, vec!["b.jpg", "a.jpg"]);
    }

    #[test]
    fn duplicate_source_is_error() {
        let err = parse(
            r#"
            media = [
                { type = "image", source = "a.jpg", alt_text = "A" },
                { type = "image", source = "a.jpg", alt_text = "A again" },
            ]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, MetadataError::DuplicateMediaItem { .. }));
    }

    #[test]
    fn unknown_type_is_error() {
        let err = parse(r#"media = [{ type = "video", source = "a.mp4" }]"#).unwrap_err();
        assert!(matches!(err, MetadataError::UnknownMediaType { kind, .. } if kind == "video"));
    }

    #[test]
    fn unknown_key_is_error() {
        let err = parse(r#"media = [{ type = "image", source = "a.jpg", alt_text = "A", caption = "c" }]"#)
            .unwrap_err();
        match err {
            MetadataError::UnexpectedKeys { keys, .. } => {
                assert_eq!(keys.into_iter().collect::<Vec<_>>(), vec!["caption"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn details_page_item() {
        let media = parse(
            r#"
            [[media]]
            type = "image"
            source = "foo.jpg"
            alt_text = "Foo"
            gallery_group = "g"
            float = true
            main = true
            "#,
        )
        .unwrap();
        let item = media.get(Path::new("posts/2025-06-27-foo/foo.jpg")).unwrap();
        let MediaItem::Image(details) = item.details_page_item();
        assert_eq!(details.gallery_group, None);
        assert!(details.opengraph && details.full_screen);
        assert!(!details.float && !details.main);
        assert_eq!(details.alt_text, "Foo");
        // The gallery item itself is unchanged.
        assert_eq!(item.gallery_group(), Some("g"));
    }

    #[test]
    fn output_paths() {
        let output = ImageOutput::new("media/foo.jpg", ImageConversion::png(16, 16));
        assert_eq!(output.work_path(), Path::new("work/media/foo-16x16.png"));
        assert_eq!(output.output_filename_base(), "foo.png");
        assert_eq!(
            output.cache_buster_path(),
            Path::new("work/media/foo-16x16.png.cache-buster-output-filename")
        );
        assert_eq!(
            output.metadata_path(),
            Path::new("work/media/foo-16x16.png.json")
        );
    }

    #[test]
    fn output_artifacts_deferred_during_scan() {
        let dir = TempDir::new().unwrap();
        let fs = SourceTree::new(dir.path(), Mode::Scan);
        let output = ImageOutput::new("media/foo.jpg", ImageConversion::png(16, 16));
        assert_eq!(output.url_path(&fs).unwrap(), None);
        assert_eq!(output.metadata(&fs).unwrap(), None);
    }

    #[test]
    fn output_artifacts_read_during_render() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("work/media")).unwrap();
        fs::write(
            dir.path()
                .join("work/media/foo-16x16.png.cache-buster-output-filename"),
            "output/media/foo-16x16-some-hash.png\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("work/media/foo-16x16.png.json"),
            r#"{"width": 16, "height": 12, "mime_type": "image/png"}"#,
        )
        .unwrap();
        let fs = SourceTree::new(dir.path(), Mode::Render);
        let output = ImageOutput::new("media/foo.jpg", ImageConversion::png(16, 16));
        assert_eq!(
            output.url_path(&fs).unwrap(),
            Some("/media/foo-16x16-some-hash.png")
        );
        assert_eq!(
            output.metadata(&fs).unwrap(),
            Some(&ImageOutputMetadata {
                width: 16,
                height: 12,
                mime_type: "image/png".to_string(),
            })
        );
    }

    #[test]
    fn missing_artifact_during_render_is_error() {
        let dir = TempDir::new().unwrap();
        let fs = SourceTree::new(dir.path(), Mode::Render);
        let output = ImageOutput::new("media/foo.jpg", ImageConversion::png(16, 16));
        assert!(output.url_path(&fs).is_err());
    }

    #[test]
    fn profile_outputs() {
        let profile = ImageProfile {
            max_width: 480,
            max_height: 480,
            jpeg_quality: 90,
            factors: &[1, 2],
            inline_size: "60em",
        };
        let source = Path::new("foo.jpg");
        let outputs = profile.outputs(source).unwrap();
        assert_eq!(
            outputs,
            vec![
                ImageOutput::new(source, ImageConversion::jpeg(960, 960, 90)),
                ImageOutput::new(source, ImageConversion::jpeg(480, 480, 90)),
            ]
        );
        assert_eq!(
            profile.primary_output(Path::new("foo.png")).unwrap(),
            ImageOutput::new("foo.png", ImageConversion::png(960, 960))
        );
        assert!(matches!(
            profile.outputs(Path::new("foo.txt")),
            Err(MetadataError::UnsupportedImageFormat(_))
        ));
    }

    #[test]
    fn unique_outputs_drop_identical_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("work/media")).unwrap();
        for (size, output) in [
            ("16x16", "output/assets/foo-16x16.png"),
            ("32x32", "output/assets/foo-32x32.png"),
            ("64x64", "output/assets/foo-32x32.png"),
        ] {
            fs::write(
                dir.path().join(format!(
                    "work/media/foo-{size}.png.cache-buster-output-filename"
                )),
                output,
            )
            .unwrap();
        }
        let fs = SourceTree::new(dir.path(), Mode::Render);
        let profile = ImageProfile {
            max_width: 16,
            max_height: 16,
            jpeg_quality: 100,
            factors: &[1, 2, 4],
            inline_size: "",
        };
        let unique = profile.unique_outputs(Path::new("media/foo.png"), &fs).unwrap();
        let url_paths: Vec<_> = unique
            .iter()
            .map(|output| output.url_path(&fs).unwrap().unwrap().to_string())
            .collect();
        assert_eq!(url_paths, vec!["/assets/foo-16x16.png", "/assets/foo-32x32.png"]);
    }
}
