//! Font asset.

use std::path::PathBuf;

use super::HtmlRenderable;
use crate::helpers::guess_mime_type;
use crate::html::Element;

/// Font, always rendered as a `<link rel="preload" as="font">` hint.
#[derive(Debug, Clone)]
pub struct FontAsset {
    pub url: String,
    pub file: Option<PathBuf>,
    pub mime_type: Option<String>,
    /// SRI integrity hash.
    pub integrity: Option<String>,
}

impl FontAsset {
    /// MIME type defaults to the extension guess of the file, else the URL.
    pub fn new(url: impl Into<String>, file: Option<PathBuf>, mime_type: Option<String>) -> Self {
        let url = url.into();
        let mime_type = mime_type.or_else(|| guess_mime_type(&url, file.as_deref()).map(str::to_string));
        Self {
            url,
            file,
            mime_type,
            integrity: None,
        }
    }

    pub fn with_integrity(mut self, integrity: Option<String>) -> Self {
        self.integrity = integrity;
        self
    }
}

impl HtmlRenderable for FontAsset {
    fn import_element(&self) -> Element {
        Element::new("link")
            .attr("rel", "preload")
            .attr("href", self.url.as_str())
            .attr("as", "font")
            .attr_opt("type", self.mime_type.as_deref())
            .attr("crossorigin", true)
            .attr_opt("integrity", self.integrity.as_deref())
    }

    fn preload_element(&self) -> Element {
        self.import_element()
    }
}
