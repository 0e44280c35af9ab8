//! People who write posts and comments.
//!
//! In content files a user is either a short alias from the site's user
//! table:
//!
//! ```toml
//! author = "owner"
//! ```
//!
//! or a full record:
//!
//! ```toml
//! author = { name = "Someone Else", uri = "https://example.net/", email_address = "someone@example.net" }
//! ```

use crate::source::unexpected_keys;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// RFC 5321 limit on the local part of an address.
pub const MAX_LOCAL_PART_LEN: usize = 64;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UserError {
    #[error("Unknown user alias {0:?}")]
    UnknownAlias(String),
    #[error("Unexpected keys in user record: {0:?}")]
    UnexpectedKeys(BTreeSet<String>),
    #[error("User must be an alias or a record: {0}")]
    InvalidRecord(String),
    #[error("{0} has no email address")]
    NoEmailAddress(String),
    #[error("Invalid email address {0:?}")]
    InvalidEmailAddress(String),
    #[error("{0:?} already has extension")]
    AlreadyHasExtension(String),
    #[error("Local part of {address:?} is too long ({len} > {MAX_LOCAL_PART_LEN} bytes)")]
    TooLong { address: String, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

impl User {
    const KEYS: &[&str] = &["name", "uri", "email_address"];

    /// Parse an alias or a structured record.
    pub fn from_value(
        value: &toml::Value,
        aliases: &BTreeMap<String, User>,
    ) -> Result<Self, UserError> {
        match value {
            toml::Value::String(alias) => aliases
                .get(alias)
                .cloned()
                .ok_or_else(|| UserError::UnknownAlias(alias.clone())),
            toml::Value::Table(table) => {
                let keys = unexpected_keys(table, Self::KEYS);
                if !keys.is_empty() {
                    return Err(UserError::UnexpectedKeys(keys));
                }
                value
                    .clone()
                    .try_into()
                    .map_err(|e: toml::de::Error| UserError::InvalidRecord(e.message().to_string()))
            }
            other => Err(UserError::InvalidRecord(other.type_str().to_string())),
        }
    }

    /// The user's address with a `+extension` address tag.
    ///
    /// `someone@example.com` with extension `foo` becomes
    /// `someone+foo@example.com`.
    pub fn email_address_with_extension(&self, extension: &str) -> Result<String, UserError> {
        let address = self
            .email_address
            .as_deref()
            .ok_or_else(|| UserError::NoEmailAddress(self.name.clone()))?;
        let (local, domain) = address
            .rsplit_once('@')
            .ok_or_else(|| UserError::InvalidEmailAddress(address.to_string()))?;
        if local.contains('+') {
            return Err(UserError::AlreadyHasExtension(address.to_string()));
        }
        let extended_local = format!("{local}+{extension}");
        let extended = format!("{extended_local}@{domain}");
        if extended_local.len() > MAX_LOCAL_PART_LEN {
            return Err(UserError::TooLong {
                address: extended,
                len: extended_local.len(),
            });
        }
        Ok(extended)
    }
}
