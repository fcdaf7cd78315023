//! Vite build manifest (`.vite/manifest.json`).
//!
//! ```json
//! {
//!   "main.js": {
//!     "file": "assets/main-abc.js",
//!     "css": ["assets/main-xyz.css"],
//!     "imports": ["_shared.js"],
//!     "isEntry": true
//!   },
//!   "_shared.js": { "file": "assets/shared-def.js" }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AssetError, Result};

/// One manifest entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Chunk {
    /// Output path relative to the build directory.
    pub file: String,
    /// Stylesheets emitted for this chunk.
    #[serde(default)]
    pub css: Vec<String>,
    /// Manifest keys of statically imported chunks.
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default, rename = "isEntry")]
    is_entry: Option<Value>,
    #[serde(default, rename = "isDynamicEntry")]
    is_dynamic_entry: Option<Value>,
}

impl Chunk {
    /// Entry and dynamic-entry chunks may be referenced directly.
    pub fn is_entry(&self) -> bool {
        self.is_entry.is_some() || self.is_dynamic_entry.is_some()
    }
}

/// Parsed manifest keyed by source reference.
#[derive(Debug)]
pub struct Manifest {
    pub path: PathBuf,
    chunks: FxHashMap<String, Chunk>,
}

impl Manifest {
    /// Read and parse the manifest file.
    ///
    /// # Errors
    ///
    /// `ManifestRead`/`ManifestParse` when the file is missing or not JSON,
    /// `InvalidManifest` when the top level is not an object of chunks.
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| AssetError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value =
            serde_json::from_str(&content).map_err(|source| AssetError::ManifestParse {
                path: path.to_path_buf(),
                source,
            })?;
        if !value.is_object() {
            return Err(AssetError::InvalidManifest(path.to_path_buf()));
        }
        let chunks = serde_json::from_value(value)
            .map_err(|_| AssetError::InvalidManifest(path.to_path_buf()))?;

        Ok(Self {
            path: path.to_path_buf(),
            chunks,
        })
    }

    pub fn get(&self, reference: &str) -> Option<&Chunk> {
        self.chunks.get(reference)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }
}
