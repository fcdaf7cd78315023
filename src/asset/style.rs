//! Stylesheet asset.

use std::path::PathBuf;

use super::{CrossOrigin, HtmlRenderable};
use crate::html::Element;

/// Stylesheet rendered as `<link rel="stylesheet">`.
#[derive(Debug, Clone, Default)]
pub struct StyleAsset {
    pub url: String,
    pub file: Option<PathBuf>,
    /// Media query for the stylesheet.
    pub media: Option<String>,
    /// SRI integrity hash.
    pub integrity: Option<String>,
    pub crossorigin: Option<CrossOrigin>,
}

impl StyleAsset {
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

    pub fn with_media(mut self, media: Option<String>) -> Self {
        self.media = media;
        self
    }

    pub fn with_integrity(mut self, integrity: Option<String>) -> Self {
        self.integrity = integrity;
        self
    }

    pub fn with_crossorigin(mut self, crossorigin: Option<CrossOrigin>) -> Self {
        self.crossorigin = crossorigin;
        self
    }

    fn effective_crossorigin(&self) -> CrossOrigin {
        self.crossorigin
            .clone()
            .unwrap_or(CrossOrigin::Bool(self.integrity.is_some()))
    }
}

impl HtmlRenderable for StyleAsset {
    fn import_element(&self) -> Element {
        Element::new("link")
            .attr("rel", "stylesheet")
            .attr("href", self.url.as_str())
            .attr_opt("media", self.media.as_deref())
            .attr_opt("integrity", self.integrity.as_deref())
            .attr("crossorigin", self.effective_crossorigin())
    }

    fn preload_element(&self) -> Element {
        Element::new("link")
            .attr("rel", "preload")
            .attr("href", self.url.as_str())
            .attr("as", "style")
            .attr("crossorigin", self.effective_crossorigin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_import() {
        let style = StyleAsset::new("/site.css").with_media(Some("print".into()));
        assert_eq!(
            style.import_element().to_string(),
            r#"<link rel="stylesheet" href="/site.css" media="print">"#
        );
    }

    #[test]
    fn test_style_preload_with_integrity() {
        let style = StyleAsset::new("/site.css").with_integrity(Some("sha256-x".into()));
        assert_eq!(
            style.preload_element().to_string(),
            r#"<link rel="preload" href="/site.css" as="style" crossorigin>"#
        );
    }
}
