//! Stateless helpers shared by mappers and the runtime.
//!
//! - `parse_reference()` - split `mapper:reference`
//! - `check_options()` - validate mapper options
//! - `create_asset_from_url()` - MIME-driven asset construction
//! - `guess_mime_type_from_extension()`, `sniff_content_type()` - MIME detection
//! - `guess_mp3_duration()` - CBR duration estimate
//! - `detect_dev_server()` - dev server discovery

mod dev_server;
mod mime;
mod mp3;

use std::path::{Path, PathBuf};

pub use dev_server::detect_dev_server;
pub use mime::{guess_mime_type_from_extension, sniff_content_type};
pub use mp3::guess_mp3_duration;

use crate::asset::{
    Asset, AudioAsset, CrossOrigin, FontAsset, GenericAsset, ImageAsset, ScriptAsset, StyleAsset,
    VideoAsset,
};
use crate::error::{AssetError, Result};
use crate::mapper::Options;

// ============================================================================
// References and options
// ============================================================================

/// Split a qualified reference `mapper:reference` on the first colon.
///
/// A reference without a colon has no mapper (the default one is used).
pub fn parse_reference(qualified: &str) -> (Option<&str>, &str) {
    match qualified.split_once(':') {
        Some((mapper, reference)) => (Some(mapper), reference),
        None => (None, qualified),
    }
}

/// Validate option keys against allowed optional and required keys.
///
/// # Errors
///
/// `InvalidArgument` listing unsupported keys, or listing missing required keys.
pub fn check_options(options: &Options, optional: &[&str], required: &[&str]) -> Result<()> {
    let unsupported: Vec<&str> = options
        .keys()
        .map(String::as_str)
        .filter(|key| !optional.contains(key) && !required.contains(key))
        .collect();
    if !unsupported.is_empty() {
        return Err(AssetError::invalid_argument(format!(
            "Unsupported asset options: {}",
            unsupported.join(", ")
        )));
    }

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|key| !options.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(AssetError::invalid_argument(format!(
            "Missing asset options: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

/// Guess MIME type from the extension of the local file, else of the URL.
pub fn guess_mime_type(url: &str, file: Option<&Path>) -> Option<&'static str> {
    let subject = file.and_then(Path::to_str).unwrap_or(url);
    guess_mime_type_from_extension(subject)
}

// ============================================================================
// Asset factory
// ============================================================================

/// Optional constructor arguments for [`create_asset_from_url`].
///
/// Each asset type picks the fields it understands and ignores the rest.
#[derive(Debug, Clone, Default)]
pub struct AssetArgs {
    pub mime_type: Option<String>,
    pub script_type: Option<String>,
    pub integrity: Option<String>,
    pub crossorigin: Option<CrossOrigin>,
    pub media: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub alternative: Option<String>,
    pub lazy_load: bool,
    pub density: Option<u32>,
    pub duration: Option<f64>,
    pub poster: Option<String>,
    pub autoplay: bool,
}

impl AssetArgs {
    pub fn crossorigin(mut self, crossorigin: impl Into<CrossOrigin>) -> Self {
        self.crossorigin = Some(crossorigin.into());
        self
    }

    pub fn script_type(mut self, script_type: impl Into<String>) -> Self {
        self.script_type = Some(script_type.into());
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Create an asset whose type is chosen by MIME type.
///
/// The MIME type comes from `args.mime_type` when given, otherwise it is
/// guessed from the extension of `file` or `url`:
///
/// | MIME type                | Asset    |
/// |--------------------------|----------|
/// | `application/javascript` | Script   |
/// | `text/css`               | Style    |
/// | `image/*`                | Image    |
/// | `audio/*`                | Audio    |
/// | `video/*`                | Video    |
/// | `font/*`                 | Font     |
/// | anything else            | Generic  |
pub fn create_asset_from_url(url: impl Into<String>, file: Option<PathBuf>, args: AssetArgs) -> Asset {
    let url = url.into();
    let explicit_mime = args.mime_type.clone();
    let mime = explicit_mime
        .clone()
        .or_else(|| guess_mime_type(&url, file.as_deref()).map(str::to_string));
    let primary = mime
        .as_deref()
        .and_then(|m| m.split('/').next())
        .unwrap_or_default();

    match (mime.as_deref(), primary) {
        (Some("application/javascript"), _) => Asset::Script(
            ScriptAsset::new(url)
                .with_file(file)
                .with_type(args.script_type)
                .with_integrity(args.integrity)
                .with_crossorigin(args.crossorigin),
        ),
        (Some("text/css"), _) => Asset::Style(
            StyleAsset::new(url)
                .with_file(file)
                .with_media(args.media)
                .with_integrity(args.integrity)
                .with_crossorigin(args.crossorigin),
        ),
        // images probe their own MIME type unless one was given explicitly
        (_, "image") => Asset::Image(
            ImageAsset::new(url)
                .with_file(file)
                .with_size(args.width, args.height)
                .with_mime_type(explicit_mime)
                .with_alternative(args.alternative)
                .with_lazy_load(args.lazy_load)
                .with_density(args.density.unwrap_or(1))
                .with_crossorigin(args.crossorigin),
        ),
        (_, "audio") => {
            Asset::Audio(AudioAsset::new(url, file, mime).with_duration(args.duration))
        }
        (_, "video") => Asset::Video(VideoAsset {
            width: args.width,
            height: args.height,
            duration: args.duration,
            poster: args.poster,
            autoplay: args.autoplay,
            ..VideoAsset::new(url, file, mime)
        }),
        (_, "font") => {
            Asset::Font(FontAsset::new(url, file, mime).with_integrity(args.integrity))
        }
        _ => Asset::Generic(
            GenericAsset::new(url)
                .with_file(file)
                .with_mime_type(mime)
                .with_media(args.media)
                .with_integrity(args.integrity),
        ),
    }
}
