//! Where things live in the output and work trees.
//!
//! ```text
//! output/                       # Published site, mirrors URL paths
//! work/                         # Intermediate build artifacts, mirrors source paths
//! private/comments/{post id}/   # Comment metadata and bodies
//! ```

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

pub const OUTPUT: &str = "output";
pub const WORK: &str = "work";
pub const PRIVATE: &str = "private";

/// File names that stand in for a directory URL.
pub const DIR_INDEXES: &[&str] = &["index.html", "index.xml"];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PathError {
    #[error("Invalid dir_index {0:?}, allowed values are: {DIR_INDEXES:?}")]
    InvalidDirIndex(String),
    #[error("Relative url paths are not supported: {0:?}")]
    RelativeUrlPath(String),
    #[error("{0:?} is not in {OUTPUT:?}")]
    NotInOutput(PathBuf),
}

/// Output file for a URL path. Directory URLs map to `dir_index`.
pub fn from_url_path(url_path: &str, dir_index: &str) -> Result<PathBuf, PathError> {
    if !DIR_INDEXES.contains(&dir_index) {
        return Err(PathError::InvalidDirIndex(dir_index.to_string()));
    }
    let Some(relative) = url_path.strip_prefix('/') else {
        return Err(PathError::RelativeUrlPath(url_path.to_string()));
    };
    let output = Path::new(OUTPUT);
    if relative.is_empty() {
        Ok(output.join(dir_index))
    } else if relative.ends_with('/') {
        Ok(output.join(relative).join(dir_index))
    } else {
        Ok(output.join(relative))
    }
}

/// URL path for an output file. Directory indexes map to their directory.
pub fn to_url_path(path: &Path) -> Result<String, PathError> {
    let relative = path
        .strip_prefix(OUTPUT)
        .map_err(|_| PathError::NotInOutput(path.to_path_buf()))?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    match parts.split_last() {
        None => Err(PathError::NotInOutput(path.to_path_buf())),
        Some((last, [])) if DIR_INDEXES.contains(&last.as_str()) => Ok("/".to_string()),
        Some((last, parents)) if DIR_INDEXES.contains(&last.as_str()) => {
            Ok(format!("/{}/", parents.join("/")))
        }
        Some(_) => Ok(format!("/{}", parts.join("/"))),
    }
}

/// Work-tree location for artifacts derived from a source path.
pub fn work(path: &Path) -> PathBuf {
    Path::new(WORK).join(path)
}

/// Directory holding the comments of the post with `post_id`.
pub fn comments_dir(post_id: &str) -> PathBuf {
    Path::new(PRIVATE).join("comments").join(post_id)
}
