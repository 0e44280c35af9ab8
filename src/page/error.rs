//! HTTP error pages, one per `errors/{status}/` template.

use super::PageBase;
use crate::error::MetadataError;
use crate::media::Media;
use http::StatusCode;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPage {
    pub url_path: String,
    pub title: String,
    pub media: Media,
    pub status: u16,
}

impl ErrorPage {
    /// The status comes from the name of the template's directory and must
    /// be a client or server error with a registered reason phrase.
    pub fn load(template: &Path) -> Result<Self, MetadataError> {
        let dir_name = template
            .parent()
            .and_then(Path::file_name)
            .ok_or_else(|| MetadataError::InvalidTemplate(template.to_path_buf()))?
            .to_string_lossy();
        let invalid = || MetadataError::InvalidStatus {
            template: template.to_path_buf(),
            status: dir_name.to_string(),
        };
        let status: u16 = dir_name.parse().map_err(|_| invalid())?;
        let code = StatusCode::from_u16(status).map_err(|_| invalid())?;
        if !(code.is_client_error() || code.is_server_error()) {
            return Err(invalid());
        }
        let phrase = code.canonical_reason().ok_or_else(invalid)?;
        Ok(Self {
            url_path: format!("/errors/{status}/"),
            title: format!("{status} {phrase}"),
            media: Media::default(),
            status,
        })
    }
}

impl PageBase for ErrorPage {
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
