//! `[mapping]` entries.
//!
//! ```toml
//! [mapping]
//! default = "assets"          # shorthand for a filesystem mapper
//!
//! [mapping.vite]
//! type = "vite"
//! path = "build"
//! dev_server = true
//! ```

use serde::Deserialize;

/// Mapper implementation selected by `type`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapperKind {
    #[default]
    File,
    Vite,
}

impl MapperKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Vite => "vite",
        }
    }
}

/// One `[mapping]` value: a bare path or a full table.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MappingEntry {
    Path(String),
    Mapper(MapperConfig),
}

impl MappingEntry {
    /// Expand the shorthand form into a full table.
    pub fn to_config(&self) -> MapperConfig {
        match self {
            Self::Path(path) => MapperConfig {
                path: Some(path.clone()),
                ..MapperConfig::default()
            },
            Self::Mapper(config) => config.clone(),
        }
    }
}

/// `[mapping.<name>]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapperConfig {
    #[serde(default, rename = "type")]
    pub kind: MapperKind,

    /// Directory, relative to `base_path`.
    pub path: Option<String>,

    /// URL, relative to `base_url`. Defaults to `path`.
    pub url: Option<String>,

    /// Extensions tried in order; `""` means "as is".
    #[serde(default)]
    pub extension: Extensions,

    /// Overrides the top-level `versioning`.
    pub versioning: Option<bool>,

    /// Manifest file, relative to the mapper path.
    pub manifest: Option<String>,

    #[serde(default, alias = "devServer")]
    pub dev_server: DevServer,
}

/// `extension = "js"` or `extension = ["js", ""]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
pub enum Extensions {
    #[default]
    None,
    One(String),
    Many(Vec<String>),
}

impl Extensions {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::None => Vec::new(),
            Self::One(ext) => vec![ext.clone()],
            Self::Many(exts) => exts.clone(),
        }
    }
}

/// `dev_server = true` detects the server, a string names it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DevServer {
    Enabled(bool),
    Url(String),
}

impl Default for DevServer {
    fn default() -> Self {
        Self::Enabled(true)
    }
}
