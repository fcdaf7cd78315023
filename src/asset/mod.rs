//! Resolved asset values.
//!
//! An [`Asset`] is produced by a mapper for one reference and is never
//! mutated afterwards. A few fields (image dimensions, audio duration,
//! generic MIME type) are computed on first access and memoized.
//!
//! ```text
//! Asset
//! ├── Generic   url + sniffed MIME type, not renderable
//! ├── Script    <script>, preload via modulepreload / preload as=script
//! ├── Style     <link rel=stylesheet>
//! ├── Image     <img>, dimensions from the file
//! ├── Font      <link rel=preload as=font>
//! ├── Audio     <audio>, duration from MP3 frame header
//! ├── Video     <video>
//! └── Entry     script + ordered style imports and script preloads
//! ```

mod font;
mod generic;
mod image;
mod media;
mod script;
mod style;

use std::fmt;
use std::path::Path;

pub use font::FontAsset;
pub use generic::GenericAsset;
pub use image::ImageAsset;
pub use media::{AudioAsset, VideoAsset};
pub use script::{EntryAsset, ScriptAsset};
pub use style::StyleAsset;

use crate::html::{AttrValue, Element};

/// Assets that can be rendered as HTML elements.
pub trait HtmlRenderable {
    /// Element that makes the browser load and use the asset.
    fn import_element(&self) -> Element;

    /// Resource hint element for the asset.
    fn preload_element(&self) -> Element;
}

/// Value of the `crossorigin` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrossOrigin {
    /// `true` renders a bare attribute, `false` omits it.
    Bool(bool),
    /// Explicit policy such as `use-credentials`.
    Value(String),
}

impl From<bool> for CrossOrigin {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for CrossOrigin {
    fn from(s: &str) -> Self {
        Self::Value(s.to_string())
    }
}

impl From<CrossOrigin> for AttrValue {
    fn from(c: CrossOrigin) -> Self {
        match c {
            CrossOrigin::Bool(b) => AttrValue::Bool(b),
            CrossOrigin::Value(s) => AttrValue::Text(s),
        }
    }
}

/// A resolved asset.
#[derive(Debug, Clone)]
pub enum Asset {
    Generic(GenericAsset),
    Script(ScriptAsset),
    Style(StyleAsset),
    Image(ImageAsset),
    Font(FontAsset),
    Audio(AudioAsset),
    Video(VideoAsset),
    Entry(EntryAsset),
}

impl Asset {
    /// Public URL of the asset.
    pub fn url(&self) -> &str {
        match self {
            Self::Generic(a) => &a.url,
            Self::Script(a) => &a.url,
            Self::Style(a) => &a.url,
            Self::Image(a) => &a.url,
            Self::Font(a) => &a.url,
            Self::Audio(a) => &a.url,
            Self::Video(a) => &a.url,
            Self::Entry(a) => &a.script.url,
        }
    }

    /// Local file backing the asset, if the mapper verified one.
    pub fn file(&self) -> Option<&Path> {
        match self {
            Self::Generic(a) => a.file.as_deref(),
            Self::Script(a) => a.file.as_deref(),
            Self::Style(a) => a.file.as_deref(),
            Self::Image(a) => a.file.as_deref(),
            Self::Font(a) => a.file.as_deref(),
            Self::Audio(a) => a.file.as_deref(),
            Self::Video(a) => a.file.as_deref(),
            Self::Entry(a) => a.script.file.as_deref(),
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Generic(_) => "generic",
            Self::Script(_) => "script",
            Self::Style(_) => "style",
            Self::Image(_) => "image",
            Self::Font(_) => "font",
            Self::Audio(_) => "audio",
            Self::Video(_) => "video",
            Self::Entry(_) => "entry",
        }
    }

    /// HTML rendering capability; `None` for generic assets.
    pub fn renderable(&self) -> Option<&dyn HtmlRenderable> {
        match self {
            Self::Generic(_) => None,
            Self::Script(a) => Some(a),
            Self::Style(a) => Some(a),
            Self::Image(a) => Some(a),
            Self::Font(a) => Some(a),
            Self::Audio(a) => Some(a),
            Self::Video(a) => Some(a),
            Self::Entry(a) => Some(a),
        }
    }

    /// Whether the asset is a script (plain or entry point).
    pub fn is_script(&self) -> bool {
        matches!(self, Self::Script(_) | Self::Entry(_))
    }

    pub fn is_style(&self) -> bool {
        matches!(self, Self::Style(_))
    }

    pub fn as_entry(&self) -> Option<&EntryAsset> {
        match self {
            Self::Entry(a) => Some(a),
            _ => None,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_url() {
        let asset = Asset::Style(StyleAsset::new("/css/site.css"));
        assert_eq!(asset.to_string(), "/css/site.css");
        assert_eq!(asset.url(), "/css/site.css");
        assert_eq!(asset.file(), None);
    }

    #[test]
    fn test_generic_not_renderable() {
        let asset = Asset::Generic(GenericAsset::new("/doc.pdf"));
        assert!(asset.renderable().is_none());
        assert_eq!(asset.kind(), "generic");
    }

    #[test]
    fn test_entry_is_script() {
        let asset = Asset::Entry(EntryAsset::new("/main.js"));
        assert!(asset.is_script());
        assert!(asset.as_entry().is_some());
        assert!(asset.renderable().is_some());
    }

    #[test]
    fn test_crossorigin_attr_value() {
        assert_eq!(AttrValue::from(CrossOrigin::Bool(true)), AttrValue::Bool(true));
        assert_eq!(
            AttrValue::from(CrossOrigin::from("use-credentials")),
            AttrValue::Text("use-credentials".into())
        );
    }
}
