//! The filesystem collaborator.
//!
//! Content loading never touches the disk directly. It goes through
//! [`Filesystem`], which lets the build system record every file a page
//! depends on and decide what happens when a file doesn't exist yet.
//!
//! ## Modes
//!
//! The build runs twice over the same templates:
//!
//! - **Scan** builds the dependency graph. Build artifacts (cache-busted file
//!   names, image metadata JSON) usually don't exist yet, so a read that is
//!   allowed to defer (`defer_ok = true`) returns `None` instead of failing.
//! - **Render** produces output. Every read must succeed.
//!
//! Reads that are not allowed to defer fail in both modes. Source
//! configuration is always read that way: a missing `metadata.toml` is a
//! content error, not a pending dependency.
//!
//! [`SourceTree`] is the directory-backed implementation used by the CLI and
//! the tests.

use serde::Deserialize;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Name of the optional template list in the source root.
pub const BUILD_CONFIG_FILENAME: &str = "build.toml";

/// Extension of template files discovered when there is no `build.toml`.
const TEMPLATE_EXTENSION: &str = "jinja";

/// Top-level directories that never contain templates.
const NON_TEMPLATE_DIRS: &[&str] = &["output", "work", "private", "target"];

#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO error on {path}: {error}")]
    Io { path: PathBuf, error: io::Error },
    #[error("{0} does not exist")]
    Missing(PathBuf),
    #[error("Invalid build config {path}: {error}")]
    BuildConfig {
        path: PathBuf,
        error: toml::de::Error,
    },
    #[error("Failed to walk {path}: {error}")]
    Walk {
        path: PathBuf,
        error: walkdir::Error,
    },
}

/// Build-level configuration: which templates exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Template paths relative to the source root.
    pub templates: Vec<PathBuf>,
}

impl BuildConfig {
    /// Templates under the top-level directory `dir`, in config order.
    pub fn templates_in<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = &'a Path> + 'a {
        self.templates
            .iter()
            .map(PathBuf::as_path)
            .filter(move |template| template.starts_with(dir))
    }
}

/// Dependency-tracking access to the source tree.
///
/// All paths are relative to the source root.
pub trait Filesystem {
    /// Read a text file.
    ///
    /// Returns `Ok(None)` only when the file is missing, `defer_ok` is set,
    /// and the build is in a phase where missing files are expected.
    fn read_text(&self, path: &Path, defer_ok: bool) -> Result<Option<String>, FsError>;

    /// Record a dependency on `path` without reading it.
    ///
    /// Returns whether the file exists. Deferral follows the same rules as
    /// [`read_text`](Self::read_text).
    fn add_dependency(&self, path: &Path, defer_ok: bool) -> Result<bool, FsError>;

    /// The build configuration.
    fn read_config(&self) -> Result<BuildConfig, FsError>;

    /// Files directly inside `dir`, sorted. A missing directory is empty.
    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, FsError>;
}

/// Which build phase a [`SourceTree`] serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Scan,
    Render,
}

/// A [`Filesystem`] backed by a directory on disk.
#[derive(Debug)]
pub struct SourceTree {
    root: PathBuf,
    mode: Mode,
    dependencies: RefCell<BTreeSet<PathBuf>>,
}

impl SourceTree {
    pub fn new(root: impl Into<PathBuf>, mode: Mode) -> Self {
        Self {
            root: root.into(),
            mode,
            dependencies: RefCell::new(BTreeSet::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Every path read or depended on so far.
    pub fn dependencies(&self) -> Vec<PathBuf> {
        self.dependencies.borrow().iter().cloned().collect()
    }

    fn record(&self, path: &Path) {
        self.dependencies.borrow_mut().insert(path.to_path_buf());
    }

    fn missing<T>(&self, path: &Path, defer_ok: bool, deferred: T) -> Result<T, FsError> {
        if defer_ok && self.mode == Mode::Scan {
            debug!(path = %path.display(), "Deferring missing file");
            Ok(deferred)
        } else {
            Err(FsError::Missing(path.to_path_buf()))
        }
    }

    fn discover_templates(&self) -> Result<Vec<PathBuf>, FsError> {
        let mut templates = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                let skipped_dir = entry.depth() == 1 && NON_TEMPLATE_DIRS.contains(&&*name);
                !name.starts_with('.') && !skipped_dir
            });
        for entry in walker {
            let entry = entry.map_err(|error| FsError::Walk {
                path: self.root.clone(),
                error,
            })?;
            let is_template = entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext == TEMPLATE_EXTENSION);
            if is_template && let Ok(relative) = entry.path().strip_prefix(&self.root) {
                templates.push(relative.to_path_buf());
            }
        }
        templates.sort();
        Ok(templates)
    }
}

impl Filesystem for SourceTree {
    fn read_text(&self, path: &Path, defer_ok: bool) -> Result<Option<String>, FsError> {
        self.record(path);
        match fs::read_to_string(self.root.join(path)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.missing(path, defer_ok, None),
            Err(error) => Err(FsError::Io {
                path: path.to_path_buf(),
                error,
            }),
        }
    }

    fn add_dependency(&self, path: &Path, defer_ok: bool) -> Result<bool, FsError> {
        self.record(path);
        if self.root.join(path).exists() {
            Ok(true)
        } else {
            self.missing(path, defer_ok, false)
        }
    }

    fn read_config(&self) -> Result<BuildConfig, FsError> {
        let path = Path::new(BUILD_CONFIG_FILENAME);
        match self.read_text(path, true) {
            Ok(Some(text)) => toml::from_str(&text).map_err(|error| FsError::BuildConfig {
                path: path.to_path_buf(),
                error,
            }),
            Ok(None) | Err(FsError::Missing(_)) => Ok(BuildConfig {
                templates: self.discover_templates()?,
            }),
            Err(e) => Err(e),
        }
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, FsError> {
        self.record(dir);
        let entries = match fs::read_dir(self.root.join(dir)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => {
                return Err(FsError::Io {
                    path: dir.to_path_buf(),
                    error,
                });
            }
        };
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|error| FsError::Io {
                path: dir.to_path_buf(),
                error,
            })?;
            if entry.path().is_file() {
                files.push(dir.join(entry.file_name()));
            }
        }
        files.sort();
        Ok(files)
    }
}
