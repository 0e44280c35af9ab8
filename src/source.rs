//! Helpers for reading `metadata.toml` blocks.
//!
//! Source configuration always exists unconditionally, so every read here is
//! strict: a missing file is a configuration error rather than a pending
//! build dependency.

use crate::error::MetadataError;
use crate::fs::Filesystem;
use chrono::{DateTime, FixedOffset};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Name of the configuration file that sits next to each content template.
pub const METADATA_FILENAME: &str = "metadata.toml";

/// Path of the `metadata.toml` belonging to `template`.
pub fn metadata_path(template: &Path) -> PathBuf {
    template
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(METADATA_FILENAME)
}

/// Read and parse a TOML table through the filesystem collaborator.
pub fn read_table(fs: &dyn Filesystem, path: &Path) -> Result<toml::Table, MetadataError> {
    let text = fs
        .read_text(path, false)?
        .ok_or_else(|| crate::fs::FsError::Missing(path.to_path_buf()))?;
    parse_table(&text, path)
}

pub fn parse_table(text: &str, path: &Path) -> Result<toml::Table, MetadataError> {
    text.parse::<toml::Table>()
        .map_err(|error| MetadataError::Toml {
            path: path.to_path_buf(),
            error,
        })
}

/// Keys of `table` that are not in `known`.
pub fn unexpected_keys(table: &toml::Table, known: &[&str]) -> BTreeSet<String> {
    table
        .keys()
        .filter(|key| !known.contains(&key.as_str()))
        .cloned()
        .collect()
}

/// Reject any key outside `known`, naming every offender.
pub fn check_keys(table: &toml::Table, known: &[&str], path: &Path) -> Result<(), MetadataError> {
    let keys = unexpected_keys(table, known);
    if keys.is_empty() {
        Ok(())
    } else {
        Err(MetadataError::UnexpectedKeys {
            path: path.to_path_buf(),
            keys,
        })
    }
}

pub fn required<'a>(
    table: &'a toml::Table,
    key: &str,
    path: &Path,
) -> Result<&'a toml::Value, MetadataError> {
    table.get(key).ok_or_else(|| MetadataError::MissingKey {
        path: path.to_path_buf(),
        key: key.to_string(),
    })
}

pub fn as_str<'a>(value: &'a toml::Value, key: &str, path: &Path) -> Result<&'a str, MetadataError> {
    value.as_str().ok_or_else(|| wrong_type(key, "a string", path))
}

pub fn required_str<'a>(
    table: &'a toml::Table,
    key: &str,
    path: &Path,
) -> Result<&'a str, MetadataError> {
    as_str(required(table, key, path)?, key, path)
}

pub fn optional_str<'a>(
    table: &'a toml::Table,
    key: &str,
    path: &Path,
) -> Result<Option<&'a str>, MetadataError> {
    table
        .get(key)
        .map(|value| as_str(value, key, path))
        .transpose()
}

pub fn optional_bool(table: &toml::Table, key: &str, path: &Path) -> Result<bool, MetadataError> {
    match table.get(key) {
        None => Ok(false),
        Some(value) => value
            .as_bool()
            .ok_or_else(|| wrong_type(key, "a boolean", path)),
    }
}

/// An optional array of strings; absent means empty.
pub fn string_list(table: &toml::Table, key: &str, path: &Path) -> Result<Vec<String>, MetadataError> {
    let Some(value) = table.get(key) else {
        return Ok(Vec::new());
    };
    let items = value
        .as_array()
        .ok_or_else(|| wrong_type(key, "an array of strings", path))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| wrong_type(key, "an array of strings", path))
        })
        .collect()
}

/// A TOML offset date-time. Local date-times (no offset) are rejected.
pub fn timestamp(
    table: &toml::Table,
    key: &str,
    path: &Path,
) -> Result<DateTime<FixedOffset>, MetadataError> {
    let value = required(table, key, path)?;
    let datetime = value
        .as_datetime()
        .ok_or_else(|| wrong_type(key, "a date-time", path))?;
    if datetime.offset.is_none() {
        return Err(MetadataError::NoTimezone {
            path: path.to_path_buf(),
            key: key.to_string(),
        });
    }
    let text = datetime.to_string();
    DateTime::parse_from_rfc3339(&text).map_err(|_| MetadataError::InvalidTimestamp {
        path: path.to_path_buf(),
        value: text,
    })
}

fn wrong_type(key: &str, expected: &'static str, path: &Path) -> MetadataError {
    MetadataError::WrongType {
        path: path.to_path_buf(),
        key: key.to_string(),
        expected,
    }
}
