//! Asset configuration management for `assets.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── error      # ConfigError
//! ├── mapping    # [mapping] entries
//! ├── util       # URL/path resolution, config discovery
//! └── mod.rs     # AssetsConfig (this file)
//! ```
//!
//! # Keys
//!
//! | Key            | Purpose                                         |
//! |----------------|-------------------------------------------------|
//! | `base_path`    | Directory the mapper paths are relative to      |
//! | `base_url`     | URL the mapper URLs are relative to             |
//! | `versioning`   | Default `?v=<mtime>` for filesystem mappers     |
//! | `debug`        | Enables Vite dev server detection               |
//! | `[mapping]`    | Named mappers, in registration order            |

mod error;
mod mapping;
mod util;

pub use error::ConfigError;
pub use mapping::{DevServer, Extensions, MapperConfig, MapperKind, MappingEntry};
pub use util::find_config_file;

use indexmap::IndexMap;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::debug;
use crate::helpers::detect_dev_server;
use crate::mapper::FilesystemMapper;
use crate::mapper::ViteMapper;
use crate::registry::Registry;
use util::{resolve_path, resolve_url};

/// Info file written by the Vite plugin while the dev server runs.
const DEV_SERVER_INFO: &str = ".vite/nette.json";

type Result<T> = std::result::Result<T, ConfigError>;

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing assets.toml
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetsConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    pub base_path: Option<PathBuf>,

    pub base_url: Option<String>,

    pub versioning: Option<bool>,

    #[serde(default)]
    pub debug: bool,

    #[serde(default = "default_mapping")]
    pub mapping: IndexMap<String, MappingEntry>,
}

fn default_mapping() -> IndexMap<String, MappingEntry> {
    IndexMap::from([("default".to_string(), MappingEntry::Path("assets".to_string()))])
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            base_path: None,
            base_url: None,
            versioning: None,
            debug: false,
            mapping: default_mapping(),
        }
    }
}

impl AssetsConfig {
    /// Find `config_name` upward from the working directory and load it.
    pub fn load(config_name: &Path) -> Result<Self> {
        let path = find_config_file(config_name).ok_or_else(|| {
            ConfigError::Validation(format!(
                "config file '{}' not found",
                config_name.display()
            ))
        })?;
        Self::from_path(&path)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from a file; a relative `base_path` is taken
    /// relative to the file's directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let mut config = Self::from_str(&content)?;

        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        if let Some(base) = &config.base_path
            && base.is_relative()
        {
            config.base_path = Some(root.join(base));
        }
        config.config_path = path.to_path_buf();
        debug!("config"; "loaded {}", path.display());
        Ok(config)
    }

    /// Directory served by a mapper.
    pub fn mapper_path(&self, mapper: &MapperConfig) -> Result<PathBuf> {
        resolve_path(self.base_path.as_deref(), mapper.path.as_deref())
            .ok_or_else(|| ConfigError::Validation("'base_path' is not defined".into()))
    }

    /// Public URL of a mapper.
    pub fn mapper_url(&self, mapper: &MapperConfig) -> Result<String> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| ConfigError::Validation("'base_url' is not defined".into()))?;
        let relative = mapper.url.as_deref().or(mapper.path.as_deref()).unwrap_or_default();
        Ok(resolve_url(base_url, relative))
    }

    /// Build a registry with every `[mapping]` entry, in file order.
    pub fn build_registry(&self) -> Result<Registry> {
        let mut registry = Registry::new();
        for (name, entry) in &self.mapping {
            let mapper = entry.to_config();
            match mapper.kind {
                MapperKind::File => registry.add_mapper(name, self.filesystem_mapper(&mapper)?)?,
                MapperKind::Vite => registry.add_mapper(name, self.vite_mapper(&mapper)?)?,
            }
            debug!("config"; "mapper '{}' ({})", name, mapper.kind.as_str());
        }
        Ok(registry)
    }

    fn filesystem_mapper(&self, mapper: &MapperConfig) -> Result<FilesystemMapper> {
        let versioning = mapper.versioning.or(self.versioning).unwrap_or(true);
        Ok(FilesystemMapper::new(self.mapper_url(mapper)?, self.mapper_path(mapper)?)
            .with_extensions(mapper.extension.to_vec())
            .with_versioning(versioning))
    }

    fn vite_mapper(&self, mapper: &MapperConfig) -> Result<ViteMapper> {
        let path = self.mapper_path(mapper)?;
        let manifest = mapper.manifest.as_deref().map(|m| path.join(m));
        let dev_server = self.dev_server(mapper, &path);

        Ok(ViteMapper::new(self.mapper_url(mapper)?, path)
            .with_manifest_path(manifest)
            .with_dev_server(dev_server)?
            .with_public_mapper(self.filesystem_mapper(mapper)?))
    }

    /// Dev server URL, only in debug mode.
    fn dev_server(&self, mapper: &MapperConfig, path: &Path) -> Option<String> {
        if !self.debug {
            return None;
        }
        match &mapper.dev_server {
            DevServer::Enabled(false) => None,
            DevServer::Enabled(true) => {
                let detected = detect_dev_server(&path.join(DEV_SERVER_INFO));
                if let Some(url) = &detected {
                    debug!("vite"; "dev server detected at {}", url);
                }
                detected
            }
            DevServer::Url(url) if url.is_empty() => None,
            DevServer::Url(url) => Some(url.trim_end_matches('/').to_string()),
        }
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;
    use crate::mapper::Options;
    use tempfile::TempDir;

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("www/assets")).unwrap();
        fs::write(dir.path().join("www/assets/app.js"), "").unwrap();
        dir
    }

    #[test]
    fn test_defaults() {
        let config = AssetsConfig::from_str("").unwrap();
        assert!(!config.debug);
        assert_eq!(config.mapping.len(), 1);
        assert_eq!(
            config.mapping["default"].to_config().path.as_deref(),
            Some("assets")
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(
            AssetsConfig::from_str("basepath = 'x'"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_from_path_resolves_base_path() {
        let dir = setup();
        let path = dir.path().join("assets.toml");
        fs::write(&path, "base_path = 'www'\nbase_url = '/'\nversioning = false").unwrap();

        let config = AssetsConfig::from_path(&path).unwrap();
        assert_eq!(config.base_path, Some(dir.path().join("www")));
        assert_eq!(config.config_path, path);

        let registry = config.build_registry().unwrap();
        let asset = registry.get_asset("app.js", &Options::new()).unwrap();
        assert_eq!(asset.url(), "/assets/app.js");
        assert!(matches!(*asset, Asset::Script(_)));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(matches!(
            AssetsConfig::from_path(&path),
            Err(ConfigError::Io(p, _)) if p == path
        ));
    }

    #[test]
    fn test_mapper_url_and_path() {
        let config = AssetsConfig::from_str(
            r#"
            base_path = "/srv/www/"
            base_url = "https://example.com/app"
            "#,
        )
        .unwrap();

        let mapper = MappingEntry::Path("assets".into()).to_config();
        assert_eq!(config.mapper_path(&mapper).unwrap(), PathBuf::from("/srv/www/assets"));
        assert_eq!(config.mapper_url(&mapper).unwrap(), "https://example.com/app/assets");

        let mapper = MapperConfig {
            path: Some("build".into()),
            url: Some("/static".into()),
            ..MapperConfig::default()
        };
        assert_eq!(config.mapper_url(&mapper).unwrap(), "https://example.com/static");
    }

    #[test]
    fn test_missing_base_path_and_url() {
        let config = AssetsConfig::from_str("base_url = '/'\n[mapping]\nx = {}").unwrap();
        let err = config.build_registry().unwrap_err();
        assert!(err.to_string().contains("'base_path' is not defined"));

        let config = AssetsConfig::from_str("base_path = '/www'").unwrap();
        let err = config.build_registry().unwrap_err();
        assert!(err.to_string().contains("'base_url' is not defined"));
    }

    #[test]
    fn test_versioning_inheritance() {
        let dir = setup();
        let config = AssetsConfig {
            base_path: Some(dir.path().join("www")),
            base_url: Some("/".into()),
            versioning: Some(true),
            mapping: IndexMap::from([
                ("versioned".to_string(), MappingEntry::Path("assets".into())),
                (
                    "plain".to_string(),
                    MappingEntry::Mapper(MapperConfig {
                        path: Some("assets".into()),
                        versioning: Some(false),
                        ..MapperConfig::default()
                    }),
                ),
            ]),
            ..AssetsConfig::default()
        };
        let registry = config.build_registry().unwrap();

        let versioned = registry.get_asset("versioned:app.js", &Options::new()).unwrap();
        assert!(versioned.url().starts_with("/assets/app.js?v="));
        let plain = registry.get_asset("plain:app.js", &Options::new()).unwrap();
        assert_eq!(plain.url(), "/assets/app.js");
    }

    #[test]
    fn test_vite_mapping_with_public_fallback() {
        let dir = setup();
        fs::create_dir_all(dir.path().join("www/build/.vite")).unwrap();
        fs::write(dir.path().join("www/build/robots.txt"), "").unwrap();
        fs::write(
            dir.path().join("www/build/.vite/manifest.json"),
            r#"{"main.js": {"file": "assets/main-1a2b.js", "isEntry": true}}"#,
        )
        .unwrap();

        let config = AssetsConfig::from_str(&format!(
            r#"
            base_path = "{}"
            base_url = "https://example.com/"
            versioning = false

            [mapping.vite]
            type = "vite"
            path = "build"
            "#,
            dir.path().join("www").display()
        ))
        .unwrap();
        let registry = config.build_registry().unwrap();

        let main = registry.get_asset("vite:main.js", &Options::new()).unwrap();
        assert_eq!(main.url(), "https://example.com/build/assets/main-1a2b.js");

        let robots = registry.get_asset("vite:robots.txt", &Options::new()).unwrap();
        assert_eq!(robots.url(), "https://example.com/build/robots.txt");
    }

    #[test]
    fn test_dev_server_only_in_debug() {
        let dir = setup();
        fs::create_dir_all(dir.path().join("www/build/.vite")).unwrap();
        fs::write(
            dir.path().join("www/build/.vite/nette.json"),
            r#"{"devServer": "http://localhost:5173"}"#,
        )
        .unwrap();

        let mut config = AssetsConfig {
            base_path: Some(dir.path().join("www")),
            base_url: Some("/".into()),
            ..AssetsConfig::default()
        };
        let mapper = MapperConfig {
            kind: MapperKind::Vite,
            path: Some("build".into()),
            ..MapperConfig::default()
        };
        let path = config.mapper_path(&mapper).unwrap();
        assert_eq!(config.dev_server(&mapper, &path), None);

        config.debug = true;
        assert_eq!(
            config.dev_server(&mapper, &path).as_deref(),
            Some("http://localhost:5173")
        );

        let explicit = MapperConfig {
            dev_server: DevServer::Url("http://localhost:3000/".into()),
            ..mapper.clone()
        };
        assert_eq!(
            config.dev_server(&explicit, &path).as_deref(),
            Some("http://localhost:3000")
        );

        let disabled = MapperConfig {
            dev_server: DevServer::Enabled(false),
            ..mapper
        };
        assert_eq!(config.dev_server(&disabled, &path), None);
    }

    #[test]
    fn test_invalid_dev_server_url() {
        let config = AssetsConfig::from_str(
            r#"
            base_path = "/www"
            base_url = "/"
            debug = true

            [mapping.vite]
            type = "vite"
            path = "build"
            dev_server = "localhost:5173"
            "#,
        )
        .unwrap();
        assert!(matches!(config.build_registry(), Err(ConfigError::Asset(_))));
    }
}
