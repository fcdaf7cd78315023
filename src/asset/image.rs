//! Image asset with lazily probed dimensions.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::{CrossOrigin, HtmlRenderable};
use crate::html::Element;

/// Dimensions and MIME type after taking supplied values into account.
#[derive(Debug, Clone, Default)]
struct ImageProbe {
    width: Option<u32>,
    height: Option<u32>,
    mime_type: Option<String>,
}

/// Image rendered as `<img>`.
///
/// Width, height and MIME type not supplied at construction are read from
/// the local file on first access.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub url: String,
    pub file: Option<PathBuf>,
    /// Alternative text for accessibility.
    pub alternative: Option<String>,
    pub lazy_load: bool,
    /// Pixel density divisor applied to probed dimensions (e.g. 2 for @2x).
    pub density: u32,
    pub crossorigin: Option<CrossOrigin>,
    width: Option<u32>,
    height: Option<u32>,
    mime_type: Option<String>,
    probe: OnceLock<ImageProbe>,
}

impl ImageAsset {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            file: None,
            alternative: None,
            lazy_load: false,
            density: 1,
            crossorigin: None,
            width: None,
            height: None,
            mime_type: None,
            probe: OnceLock::new(),
        }
    }

    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }

    pub fn with_size(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_mime_type(mut self, mime_type: Option<String>) -> Self {
        self.mime_type = mime_type;
        self
    }

    pub fn with_alternative(mut self, alternative: Option<String>) -> Self {
        self.alternative = alternative;
        self
    }

    pub fn with_lazy_load(mut self, lazy_load: bool) -> Self {
        self.lazy_load = lazy_load;
        self
    }

    pub fn with_density(mut self, density: u32) -> Self {
        self.density = density.max(1);
        self
    }

    pub fn with_crossorigin(mut self, crossorigin: Option<CrossOrigin>) -> Self {
        self.crossorigin = crossorigin;
        self
    }

    pub fn width(&self) -> Option<u32> {
        self.probe().width
    }

    pub fn height(&self) -> Option<u32> {
        self.probe().height
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.probe().mime_type.as_deref()
    }

    fn probe(&self) -> &ImageProbe {
        self.probe.get_or_init(|| {
            let needs_size = self.width.is_none() && self.height.is_none();
            let needs_mime = self.mime_type.is_none();
            let info = match &self.file {
                Some(file) if needs_size || needs_mime => read_image_info(file),
                _ => None,
            };

            let mut probe = ImageProbe {
                width: self.width,
                height: self.height,
                mime_type: self.mime_type.clone(),
            };
            if let Some(info) = info {
                if needs_mime {
                    probe.mime_type = info.mime_type.map(str::to_string);
                }
                // a single supplied dimension leaves the other unknown
                if needs_size && let Some((w, h)) = info.size {
                    probe.width = Some(scale(w, self.density));
                    probe.height = Some(scale(h, self.density));
                }
            }
            probe
        })
    }
}

struct ImageInfo {
    size: Option<(u32, u32)>,
    mime_type: Option<&'static str>,
}

fn read_image_info(path: &Path) -> Option<ImageInfo> {
    let reader = image::ImageReader::open(path)
        .ok()?
        .with_guessed_format()
        .ok()?;
    let mime_type = reader.format().map(|f| f.to_mime_type());
    let size = reader.into_dimensions().ok();
    Some(ImageInfo { size, mime_type })
}

fn scale(value: u32, density: u32) -> u32 {
    (f64::from(value) / f64::from(density.max(1))).round() as u32
}

impl HtmlRenderable for ImageAsset {
    fn import_element(&self) -> Element {
        Element::new("img")
            .attr("src", self.url.as_str())
            .attr_opt("width", self.width().filter(|w| *w > 0).map(|w| w.to_string()))
            .attr_opt("height", self.height().filter(|h| *h > 0).map(|h| h.to_string()))
            .attr_opt("alt", self.alternative.as_deref())
            .attr_opt("loading", self.lazy_load.then_some("lazy"))
            .attr_opt("crossorigin", self.crossorigin.clone())
    }

    fn preload_element(&self) -> Element {
        Element::new("link")
            .attr("rel", "preload")
            .attr("href", self.url.as_str())
            .attr("as", "image")
            .attr_opt("type", self.mime_type())
            .attr_opt("crossorigin", self.crossorigin.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.path().join(name);
        RgbaImage::new(width, height)
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();
        path
    }

    #[test]
    fn test_probe_dimensions_and_mime() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "logo.png", 200, 100);
        let image = ImageAsset::new("/logo.png").with_file(Some(path));

        assert_eq!(image.width(), Some(200));
        assert_eq!(image.height(), Some(100));
        assert_eq!(image.mime_type(), Some("image/png"));
        assert_eq!(
            image.import_element().to_string(),
            r#"<img src="/logo.png" width="200" height="100">"#
        );
    }

    #[test]
    fn test_probe_icon_dimensions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("favicon.ico");
        RgbaImage::new(32, 16)
            .save_with_format(&path, ImageFormat::Ico)
            .unwrap();
        let image = ImageAsset::new("/favicon.ico").with_file(Some(path));

        assert_eq!(image.width(), Some(32));
        assert_eq!(image.height(), Some(16));
    }

    #[test]
    fn test_density_divides_dimensions() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "logo@2x.png", 201, 100);
        let image = ImageAsset::new("/logo@2x.png")
            .with_file(Some(path))
            .with_density(2);

        assert_eq!(image.width(), Some(101));
        assert_eq!(image.height(), Some(50));
    }

    #[test]
    fn test_single_supplied_dimension() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "a.png", 200, 100);
        let image = ImageAsset::new("/a.png")
            .with_file(Some(path))
            .with_size(Some(50), None);

        assert_eq!(image.width(), Some(50));
        assert_eq!(image.height(), None);
        assert_eq!(image.mime_type(), Some("image/png"));
    }

    #[test]
    fn test_without_file() {
        let image = ImageAsset::new("https://cdn.test/a.png")
            .with_alternative(Some("Logo".into()))
            .with_lazy_load(true);
        assert_eq!(image.width(), None);
        assert_eq!(
            image.import_element().to_string(),
            r#"<img src="https://cdn.test/a.png" alt="Logo" loading="lazy">"#
        );
    }

    #[test]
    fn test_preload() {
        let image = ImageAsset::new("/a.webp")
            .with_mime_type(Some("image/webp".into()))
            .with_crossorigin(Some(true.into()));
        assert_eq!(
            image.preload_element().to_string(),
            r#"<link rel="preload" href="/a.webp" as="image" type="image/webp" crossorigin>"#
        );
    }
}
