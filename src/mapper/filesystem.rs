//! Filesystem mapper: references are paths under a base directory.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use super::{Mapper, Options, is_truthy};
use crate::asset::Asset;
use crate::error::{AssetError, Result};
use crate::helpers::{AssetArgs, check_options, create_asset_from_url};

/// Option toggling the `?v=<mtime>` query for a single lookup.
const OPTION_VERSION: &str = "version";

/// Maps references to files within a local directory.
///
/// Supports optional extension auto-detection and mtime-based cache busting.
#[derive(Debug, Clone)]
pub struct FilesystemMapper {
    base_url: String,
    base_path: PathBuf,
    extensions: Vec<String>,
    versioning: bool,
}

impl FilesystemMapper {
    /// Create a mapper serving `base_path` under `base_url`. Versioning is on.
    pub fn new(base_url: impl Into<String>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into(),
            base_path: base_path.into(),
            extensions: Vec::new(),
            versioning: true,
        }
    }

    /// Extensions tried in order, without the dot. `""` means "as is".
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_versioning(mut self, versioning: bool) -> Self {
        self.versioning = versioning;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Find the first configured extension with an existing file.
    ///
    /// Falls back to the first non-empty extension, or to `""` if an empty
    /// extension is configured anywhere in the list.
    fn find_extension(&self, base: &str) -> String {
        let mut fallback: Option<String> = None;
        for ext in &self.extensions {
            let candidate = if ext.is_empty() {
                fallback = Some(String::new());
                String::new()
            } else {
                let dotted = format!(".{ext}");
                fallback.get_or_insert_with(|| dotted.clone());
                dotted
            };
            if Path::new(&format!("{base}{candidate}")).is_file() {
                return candidate;
            }
        }
        fallback.unwrap_or_default()
    }
}

/// Append `v=<mtime>` using `?` or `&` as appropriate.
fn apply_version(url: String, path: &Path) -> String {
    let mtime = path
        .metadata()
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok());
    match mtime {
        Some(mtime) => {
            let sep = if url.contains('?') { '&' } else { '?' };
            format!("{url}{sep}v={}", mtime.as_secs())
        }
        None => url,
    }
}

impl Mapper for FilesystemMapper {
    /// Resolve `reference` relative to the base path.
    ///
    /// Available options: `version` (bool) overrides the versioning default.
    fn get_asset(&self, reference: &str, options: &Options) -> Result<Asset> {
        check_options(options, &[OPTION_VERSION], &[])?;

        let base = format!("{}/{}", self.base_path.display(), reference);
        let ext = self.find_extension(&base);
        let path = PathBuf::from(format!("{base}{ext}"));

        if !path.is_file() {
            return Err(AssetError::not_found(format!(
                "Asset file '{reference}' not found at path: '{}'",
                path.display()
            )));
        }

        let mut url = format!("{}/{}{}", self.base_url, reference, ext);
        let versioning = match options.get(OPTION_VERSION) {
            Some(value) if !value.is_null() => is_truthy(value),
            _ => self.versioning,
        };
        if versioning {
            url = apply_version(url, &path);
        }

        Ok(create_asset_from_url(url, Some(path), AssetArgs::default()))
    }
}
