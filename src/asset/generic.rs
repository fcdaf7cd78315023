//! Generic asset for files without an HTML representation.

use std::path::PathBuf;
use std::sync::OnceLock;

use crate::helpers::sniff_content_type;

/// Any file type. Exposes only the URL and a MIME type.
#[derive(Debug, Clone, Default)]
pub struct GenericAsset {
    pub url: String,
    pub file: Option<PathBuf>,
    pub media: Option<String>,
    pub integrity: Option<String>,
    mime_type: Option<String>,
    sniffed: OnceLock<Option<String>>,
}

impl GenericAsset {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }

    pub fn with_mime_type(mut self, mime_type: Option<String>) -> Self {
        self.mime_type = mime_type;
        self
    }

    pub fn with_media(mut self, media: Option<String>) -> Self {
        self.media = media;
        self
    }

    pub fn with_integrity(mut self, integrity: Option<String>) -> Self {
        self.integrity = integrity;
        self
    }

    /// Supplied MIME type, else the sniffed content type of the local file.
    pub fn mime_type(&self) -> Option<&str> {
        if let Some(mime) = &self.mime_type {
            return Some(mime);
        }
        self.sniffed
            .get_or_init(|| self.file.as_deref().and_then(sniff_content_type))
            .as_deref()
    }
}
