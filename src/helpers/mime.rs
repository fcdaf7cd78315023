//! MIME type detection utilities.
//!
//! Two strategies are used:
//! - extension lookup in a fixed table (URLs and paths)
//! - content sniffing of a local file (generic assets)

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Trailing dotted extension, optionally followed by a query or fragment.
static EXTENSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.([a-z0-9]{1,5})([?#]|$)").expect("valid regex"));

/// Bytes read from the file head when sniffing content.
const SNIFF_LEN: u64 = 512;

/// Fallback for readable files of unknown content.
const OCTET_STREAM: &str = "application/octet-stream";

/// Look up a lowercase extension in the fixed extension table.
pub fn from_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext {
        // Images
        "avif" => "image/avif",
        "gif" => "image/gif",
        "ico" => "image/vnd.microsoft.icon",
        "jpeg" | "jpg" => "image/jpeg",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",

        // Scripts and styles
        "js" | "mjs" => "application/javascript",
        "css" => "text/css",

        // Audio
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",

        // Video
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        "mp4" => "video/mp4",
        "ogv" => "video/ogg",
        "webm" => "video/webm",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",

        _ => return None,
    };
    Some(mime)
}

/// Guess MIME type from the trailing extension of a URL or path.
///
/// The extension may be followed by `?query` or `#fragment`.
pub fn guess_mime_type_from_extension(url: &str) -> Option<&'static str> {
    let caps = EXTENSION_RE.captures(url)?;
    from_extension(&caps[1].to_ascii_lowercase())
}

/// Detect the content type of a local file.
///
/// Image signatures are recognized from the file head; other files fall back
/// to a path-based guess. Returns `None` if the file cannot be read.
pub fn sniff_content_type(path: &Path) -> Option<String> {
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    File::open(path)
        .ok()?
        .take(SNIFF_LEN)
        .read_to_end(&mut head)
        .ok()?;

    if let Ok(format) = image::guess_format(&head) {
        return Some(format.to_mime_type().to_string());
    }

    let mime = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(OCTET_STREAM);
    Some(mime.to_string())
}
