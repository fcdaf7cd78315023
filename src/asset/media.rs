//! Audio and video assets.

use std::path::PathBuf;
use std::sync::OnceLock;

use super::HtmlRenderable;
use crate::error::Result;
use crate::helpers::{guess_mime_type, guess_mp3_duration};
use crate::html::Element;

/// Audio rendered as `<audio>`.
#[derive(Debug, Clone)]
pub struct AudioAsset {
    pub url: String,
    pub file: Option<PathBuf>,
    pub mime_type: Option<String>,
    duration: Option<f64>,
    probed: OnceLock<Option<f64>>,
}

impl AudioAsset {
    /// MIME type defaults to the extension guess of the file, else the URL.
    pub fn new(url: impl Into<String>, file: Option<PathBuf>, mime_type: Option<String>) -> Self {
        let url = url.into();
        let mime_type = mime_type.or_else(|| guess_mime_type(&url, file.as_deref()).map(str::to_string));
        Self {
            url,
            file,
            mime_type,
            duration: None,
            probed: OnceLock::new(),
        }
    }

    pub fn with_duration(mut self, duration: Option<f64>) -> Self {
        self.duration = duration;
        self
    }

    /// Duration in seconds.
    ///
    /// Unless supplied, estimated from the MP3 frame header of the local
    /// file on first access. Probe failures are returned and not memoized.
    pub fn duration(&self) -> Result<Option<f64>> {
        if let Some(duration) = self.duration {
            return Ok(Some(duration));
        }
        if let Some(probed) = self.probed.get() {
            return Ok(*probed);
        }
        let probed = match &self.file {
            Some(file) => Some(guess_mp3_duration(file)?),
            None => None,
        };
        Ok(*self.probed.get_or_init(|| probed))
    }
}

impl HtmlRenderable for AudioAsset {
    fn import_element(&self) -> Element {
        Element::new("audio")
            .attr("src", self.url.as_str())
            .attr_opt("type", self.mime_type.as_deref())
    }

    fn preload_element(&self) -> Element {
        Element::new("link")
            .attr("rel", "preload")
            .attr("href", self.url.as_str())
            .attr("as", "audio")
            .attr_opt("type", self.mime_type.as_deref())
    }
}

/// Video rendered as `<video>`.
#[derive(Debug, Clone, Default)]
pub struct VideoAsset {
    pub url: String,
    pub file: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub mime_type: Option<String>,
    /// Duration in seconds.
    pub duration: Option<f64>,
    /// Poster image URL.
    pub poster: Option<String>,
    pub autoplay: bool,
}

impl VideoAsset {
    /// MIME type defaults to the extension guess of the file, else the URL.
    pub fn new(url: impl Into<String>, file: Option<PathBuf>, mime_type: Option<String>) -> Self {
        let url = url.into();
        let mime_type = mime_type.or_else(|| guess_mime_type(&url, file.as_deref()).map(str::to_string));
        Self {
            url,
            file,
            mime_type,
            ..Self::default()
        }
    }
}

impl HtmlRenderable for VideoAsset {
    fn import_element(&self) -> Element {
        Element::new("video")
            .attr("src", self.url.as_str())
            .attr_opt("width", self.width.filter(|w| *w > 0).map(|w| w.to_string()))
            .attr_opt("height", self.height.filter(|h| *h > 0).map(|h| h.to_string()))
            .attr_opt("type", self.mime_type.as_deref())
            .attr_opt("poster", self.poster.as_deref())
            .attr_opt("autoplay", self.autoplay.then_some(true))
    }

    fn preload_element(&self) -> Element {
        Element::new("link")
            .attr("rel", "preload")
            .attr("href", self.url.as_str())
            .attr("as", "video")
            .attr_opt("type", self.mime_type.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_audio_render() {
        let audio = AudioAsset::new("/a.mp3", None, None);
        assert_eq!(
            audio.import_element().to_string(),
            r#"<audio src="/a.mp3" type="audio/mpeg"></audio>"#
        );
        assert_eq!(
            audio.preload_element().to_string(),
            r#"<link rel="preload" href="/a.mp3" as="audio" type="audio/mpeg">"#
        );
    }

    #[test]
    fn test_audio_duration_lazy() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.mp3");
        let mut bytes = vec![0xFF, 0xFB, 0x90, 0x00];
        bytes.resize(128_000, 0);
        fs::write(&path, bytes).unwrap();

        let audio = AudioAsset::new("/a.mp3", Some(path.clone()), None);
        assert_eq!(audio.duration().unwrap(), Some(8.0));

        // memoized: removing the file does not change the answer
        fs::remove_file(&path).unwrap();
        assert_eq!(audio.duration().unwrap(), Some(8.0));
    }

    #[test]
    fn test_audio_duration_supplied_or_absent() {
        let audio = AudioAsset::new("/a.mp3", None, None);
        assert_eq!(audio.duration().unwrap(), None);

        let audio = AudioAsset::new("/a.mp3", Some("/missing.mp3".into()), None)
            .with_duration(Some(3.5));
        assert_eq!(audio.duration().unwrap(), Some(3.5));
    }

    #[test]
    fn test_video_render() {
        let video = VideoAsset {
            width: Some(640),
            height: Some(360),
            poster: Some("/poster.jpg".into()),
            autoplay: true,
            ..VideoAsset::new("/clip.mp4", None, None)
        };
        assert_eq!(
            video.import_element().to_string(),
            r#"<video src="/clip.mp4" width="640" height="360" type="video/mp4" poster="/poster.jpg" autoplay></video>"#
        );
        assert_eq!(
            video.preload_element().to_string(),
            r#"<link rel="preload" href="/clip.mp4" as="video" type="video/mp4">"#
        );
    }
}
