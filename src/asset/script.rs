//! Script and entry-point assets.

use std::path::PathBuf;

use super::{Asset, CrossOrigin, HtmlRenderable};
use crate::html::Element;

/// Script asset rendered as `<script src>`.
#[derive(Debug, Clone, Default)]
pub struct ScriptAsset {
    pub url: String,
    pub file: Option<PathBuf>,
    /// Value of the `type` attribute, e.g. `module`.
    pub script_type: Option<String>,
    /// SRI integrity hash.
    pub integrity: Option<String>,
    pub crossorigin: Option<CrossOrigin>,
}

impl ScriptAsset {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }

    pub fn with_type(mut self, script_type: Option<String>) -> Self {
        self.script_type = script_type;
        self
    }

    pub fn with_integrity(mut self, integrity: Option<String>) -> Self {
        self.integrity = integrity;
        self
    }

    pub fn with_crossorigin(mut self, crossorigin: Option<CrossOrigin>) -> Self {
        self.crossorigin = crossorigin;
        self
    }

    pub fn is_module(&self) -> bool {
        self.script_type.as_deref() == Some("module")
    }
}

impl HtmlRenderable for ScriptAsset {
    fn import_element(&self) -> Element {
        // integrity without an explicit policy implies an anonymous CORS request
        let crossorigin = self
            .crossorigin
            .clone()
            .unwrap_or(CrossOrigin::Bool(self.integrity.is_some()));

        Element::new("script")
            .attr("src", self.url.as_str())
            .attr_opt("type", self.script_type.as_deref())
            .attr_opt("integrity", self.integrity.as_deref())
            .attr("crossorigin", crossorigin)
    }

    fn preload_element(&self) -> Element {
        let el = if self.is_module() {
            Element::new("link")
                .attr("rel", "modulepreload")
                .attr("href", self.url.as_str())
        } else {
            Element::new("link")
                .attr("rel", "preload")
                .attr("href", self.url.as_str())
                .attr("as", "script")
        };
        el.attr_opt("crossorigin", self.crossorigin.clone())
    }
}

/// Bundler entry point: a module script with its transitive dependencies.
///
/// `imports` are stylesheets rendered after the script, `preloads` are
/// scripts hinted with `modulepreload`. Both are owned by the entry.
#[derive(Debug, Clone)]
pub struct EntryAsset {
    pub script: ScriptAsset,
    pub imports: Vec<Asset>,
    pub preloads: Vec<Asset>,
}

impl EntryAsset {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            script: ScriptAsset::new(url).with_type(Some("module".into())),
            imports: Vec::new(),
            preloads: Vec::new(),
        }
    }

    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.script.file = file;
        self
    }

    pub fn with_crossorigin(mut self, crossorigin: Option<CrossOrigin>) -> Self {
        self.script.crossorigin = crossorigin;
        self
    }

    pub fn with_imports(mut self, imports: Vec<Asset>) -> Self {
        self.imports = imports;
        self
    }

    pub fn with_preloads(mut self, preloads: Vec<Asset>) -> Self {
        self.preloads = preloads;
        self
    }
}

impl HtmlRenderable for EntryAsset {
    fn import_element(&self) -> Element {
        self.script.import_element()
    }

    fn preload_element(&self) -> Element {
        self.script.preload_element()
    }
}
