//! Vite mapper: resolves entry points through the build manifest.
//!
//! # Modes
//!
//! - **development**: a dev server URL is set; references map straight to
//!   the dev server and the manifest is never read
//! - **production**: references are manifest keys; entry chunks carry their
//!   transitive CSS imports and JS preloads
//!
//! References missing from the manifest fall through to an optional public
//! mapper (static files Vite copied verbatim).

mod manifest;

use std::path::{Path, PathBuf};
use std::sync::{LazyLock, OnceLock};

use indexmap::IndexMap;
use parking_lot::Mutex;
use regex::Regex;
use rustc_hash::FxHashMap;

pub use manifest::{Chunk, Manifest};

use super::{Mapper, Options};
use crate::asset::{Asset, EntryAsset, ScriptAsset, StyleAsset};
use crate::error::{AssetError, Result};
use crate::helpers::{AssetArgs, check_options, create_asset_from_url};

/// Default manifest location relative to the build directory.
const MANIFEST_FILE: &str = ".vite/manifest.json";

/// Client script injected by the dev server for HMR.
const DEV_CLIENT: &str = "@vite/client";

static DEV_SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(jsx?|mjs|tsx?)$").expect("valid regex"));
static DEV_STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(sass|scss)$").expect("valid regex"));

/// Built files a chunk depends on, keyed by output path.
type Dependencies = IndexMap<String, Asset>;

/// Maps references to Vite build output.
pub struct ViteMapper {
    base_url: String,
    base_path: PathBuf,
    manifest_path: Option<PathBuf>,
    dev_server: Option<String>,
    public_mapper: Option<Box<dyn Mapper>>,
    manifest: OnceLock<Manifest>,
    dependencies: Mutex<FxHashMap<String, Dependencies>>,
}

impl ViteMapper {
    pub fn new(base_url: impl Into<String>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into(),
            base_path: base_path.into(),
            manifest_path: None,
            dev_server: None,
            public_mapper: None,
            manifest: OnceLock::new(),
            dependencies: Mutex::new(FxHashMap::default()),
        }
    }

    /// Override the manifest location (default `<base_path>/.vite/manifest.json`).
    pub fn with_manifest_path(mut self, path: Option<PathBuf>) -> Self {
        self.manifest_path = path;
        self
    }

    /// Serve references from a running dev server.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` unless the URL is absolute (`http...`).
    pub fn with_dev_server(mut self, dev_server: Option<String>) -> Result<Self> {
        if let Some(server) = &dev_server
            && !server.starts_with("http")
        {
            return Err(AssetError::invalid_argument(format!(
                "Vite dev server must be absolute URL, '{server}' given"
            )));
        }
        self.dev_server = dev_server;
        Ok(self)
    }

    /// Mapper consulted for references absent from the manifest.
    pub fn with_public_mapper(mut self, mapper: impl Mapper + 'static) -> Self {
        self.public_mapper = Some(Box::new(mapper));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn dev_server(&self) -> Option<&str> {
        self.dev_server.as_deref()
    }

    fn manifest(&self) -> Result<&Manifest> {
        if let Some(manifest) = self.manifest.get() {
            return Ok(manifest);
        }
        let path = self
            .manifest_path
            .clone()
            .unwrap_or_else(|| self.base_path.join(MANIFEST_FILE));
        let manifest = Manifest::read(&path)?;
        crate::debug!("vite"; "loaded {} ({} chunks)", path.display(), manifest.len());
        Ok(self.manifest.get_or_init(|| manifest))
    }

    fn output_url(&self, file: &str) -> String {
        format!("{}/{}", self.base_url, file)
    }

    fn output_file(&self, file: &str) -> PathBuf {
        PathBuf::from(format!("{}/{}", self.base_path.display(), file))
    }

    fn create_development_asset(&self, dev_server: &str, reference: &str) -> Asset {
        let url = format!("{dev_server}/{reference}");
        if DEV_SCRIPT_RE.is_match(reference) {
            let client = ScriptAsset::new(format!("{dev_server}/{DEV_CLIENT}"))
                .with_type(Some("module".into()));
            Asset::Entry(EntryAsset::new(url).with_imports(vec![Asset::Script(client)]))
        } else if DEV_STYLE_RE.is_match(reference) {
            Asset::Style(StyleAsset::new(url))
        } else {
            create_asset_from_url(url, None, AssetArgs::default())
        }
    }

    fn create_production_asset(&self, manifest: &Manifest, reference: &str, chunk: &Chunk) -> Result<Asset> {
        if reference.starts_with('_') && !chunk.is_entry() {
            return Err(AssetError::not_found(format!(
                "Cannot directly access internal chunk '{reference}'"
            )));
        }

        let mut dependencies = {
            let mut memo = self.dependencies.lock();
            collect_dependencies(self, manifest, &mut memo, reference)?
        };
        dependencies.shift_remove(&chunk.file);

        let url = self.output_url(&chunk.file);
        let file = Some(self.output_file(&chunk.file));
        if dependencies.is_empty() {
            return Ok(create_asset_from_url(url, file, AssetArgs::default().crossorigin(true)));
        }

        let (imports, preloads): (Vec<_>, Vec<_>) = dependencies
            .into_values()
            .filter(|asset| asset.is_style() || asset.is_script())
            .partition(Asset::is_style);

        Ok(Asset::Entry(
            EntryAsset::new(url)
                .with_file(file)
                .with_crossorigin(Some(true.into()))
                .with_imports(imports)
                .with_preloads(preloads),
        ))
    }
}

/// Depth-first collection of a chunk's CSS and imported JS files.
///
/// Each chunk is computed once. Shared chunks reached through several
/// imports collapse to a single entry per output file. The memo holds the
/// partial result while a chunk is being expanded so import cycles end.
fn collect_dependencies(
    mapper: &ViteMapper,
    manifest: &Manifest,
    memo: &mut FxHashMap<String, Dependencies>,
    chunk_id: &str,
) -> Result<Dependencies> {
    if let Some(deps) = memo.get(chunk_id) {
        return Ok(deps.clone());
    }

    let mut deps = Dependencies::new();
    memo.insert(chunk_id.to_string(), deps.clone());
    let Some(chunk) = manifest.get(chunk_id) else {
        return Ok(deps);
    };

    for file in &chunk.css {
        let asset = create_asset_from_url(
            mapper.output_url(file),
            Some(mapper.output_file(file)),
            AssetArgs::default().crossorigin(true),
        );
        deps.insert(file.clone(), asset);
    }

    for id in &chunk.imports {
        let imported = manifest
            .get(id)
            .ok_or_else(|| AssetError::InvalidManifest(manifest.path.clone()))?;
        let asset = create_asset_from_url(
            mapper.output_url(&imported.file),
            Some(mapper.output_file(&imported.file)),
            AssetArgs::default().script_type("module").crossorigin(true),
        );
        deps.insert(imported.file.clone(), asset);
        memo.insert(chunk_id.to_string(), deps.clone());

        for (file, asset) in collect_dependencies(mapper, manifest, memo, id)? {
            deps.entry(file).or_insert(asset);
        }
    }

    memo.insert(chunk_id.to_string(), deps.clone());
    Ok(deps)
}

impl Mapper for ViteMapper {
    fn get_asset(&self, reference: &str, options: &Options) -> Result<Asset> {
        check_options(options, &[], &[])?;

        if let Some(dev_server) = &self.dev_server {
            return Ok(self.create_development_asset(dev_server, reference));
        }

        let manifest = self.manifest()?;
        if let Some(chunk) = manifest.get(reference) {
            return self.create_production_asset(manifest, reference, chunk);
        }

        match &self.public_mapper {
            Some(public) => public.get_asset(reference, &Options::new()),
            None => Err(AssetError::not_found(format!(
                "File '{reference}' not found in Vite manifest"
            ))),
        }
    }
}
