//! Template runtime: resolves references and renders assets as HTML.
//!
//! - `resolve()`, `asset()`, `try_asset()` - lookups for templates
//! - `render_asset()` - import tag, plus entry dependencies
//! - `render_asset_preload()` - preload hint only
//! - `render_attributes()` - attributes for an element written in the template

mod nonce;

use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;

pub use nonce::{CspHeaders, NonceProvider, StaticNonce};

use crate::asset::Asset;
use crate::error::{AssetError, Result};
use crate::html::Element;
use crate::mapper::Options;
use crate::registry::{QualifiedRef, Registry};

/// Elements that receive the CSP nonce.
const NONCE_ELEMENTS: [&str; 3] = ["script", "link", "style"];

/// Something a template can pass where an asset is expected.
#[derive(Debug, Clone)]
pub enum AssetRef {
    /// Already resolved; passed through.
    Asset(Arc<Asset>),
    Reference(QualifiedRef),
    Null,
}

impl From<Arc<Asset>> for AssetRef {
    fn from(asset: Arc<Asset>) -> Self {
        Self::Asset(asset)
    }
}

impl From<QualifiedRef> for AssetRef {
    fn from(reference: QualifiedRef) -> Self {
        Self::Reference(reference)
    }
}

impl From<&str> for AssetRef {
    fn from(reference: &str) -> Self {
        Self::Reference(reference.into())
    }
}

impl<T: Into<AssetRef>> From<Option<T>> for AssetRef {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// An attribute the template already writes on the element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsedAttribute {
    /// Static text, e.g. `width="100"`.
    Literal(String),
    /// Computed at render time; the value is unknown here.
    Dynamic,
}

/// Attributes written in the template, by name.
pub type UsedAttributes = IndexMap<String, UsedAttribute>;

/// Runtime helpers used by rendered templates.
pub struct Runtime {
    registry: Arc<Registry>,
    nonce_provider: Option<Box<dyn NonceProvider>>,
    nonce: OnceLock<Option<String>>,
}

impl Runtime {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            nonce_provider: None,
            nonce: OnceLock::new(),
        }
    }

    /// Use `provider` to discover the CSP nonce on first render.
    pub fn with_nonce(mut self, provider: impl NonceProvider + 'static) -> Self {
        self.nonce_provider = Some(Box::new(provider));
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolve a template argument to an asset.
    ///
    /// With `try_mode`, null references and not-found assets yield `None`.
    pub fn resolve(&self, asset: impl Into<AssetRef>, options: &Options, try_mode: bool) -> Result<Option<Arc<Asset>>> {
        match asset.into() {
            AssetRef::Asset(asset) => Ok(Some(asset)),
            AssetRef::Null if try_mode => Ok(None),
            AssetRef::Null => Err(AssetError::invalid_argument("Asset cannot be null.")),
            AssetRef::Reference(reference) if try_mode => self.registry.try_get_asset(reference, options),
            AssetRef::Reference(reference) => self.registry.get_asset(reference, options).map(Some),
        }
    }

    /// Template function `asset()`: fails when not found.
    pub fn asset(&self, reference: impl Into<AssetRef>, options: &Options) -> Result<Arc<Asset>> {
        self.resolve(reference, options, false)?
            .ok_or_else(|| AssetError::invalid_argument("Asset cannot be null."))
    }

    /// Template function `tryAsset()`: `None` when not found.
    pub fn try_asset(&self, reference: impl Into<AssetRef>, options: &Options) -> Result<Option<Arc<Asset>>> {
        self.resolve(reference, options, true)
    }

    /// Render the import element; entry assets append their preloads and
    /// imports in declaration order.
    pub fn render_asset(&self, asset: &Asset) -> Result<String> {
        let renderable = asset
            .renderable()
            .ok_or_else(|| AssetError::Render("This asset type cannot be rendered as HTML.".into()))?;

        let mut html = self.with_nonce_applied(renderable.import_element()).to_string();

        if let Some(entry) = asset.as_entry() {
            for dep in &entry.preloads {
                if let Some(dep) = dep.renderable() {
                    html.push_str(&self.with_nonce_applied(dep.preload_element()).to_string());
                }
            }
            for dep in &entry.imports {
                if let Some(dep) = dep.renderable() {
                    html.push_str(&self.with_nonce_applied(dep.import_element()).to_string());
                }
            }
        }
        Ok(html)
    }

    /// Render only the preload hint.
    pub fn render_asset_preload(&self, asset: &Asset) -> Result<String> {
        let renderable = asset
            .renderable()
            .ok_or_else(|| AssetError::Render("This asset type cannot be preloaded.".into()))?;
        Ok(self.with_nonce_applied(renderable.preload_element()).to_string())
    }

    /// Attributes to inject into a `<tag_name>` element written in a template.
    ///
    /// Attributes the template already sets are left out. Width and height
    /// are completed proportionally when exactly one is given literally.
    pub fn render_attributes(&self, asset: &Asset, tag_name: &str, used: &UsedAttributes) -> Result<String> {
        let renderable = asset.renderable().ok_or_else(|| {
            AssetError::Render("This asset type cannot be rendered with attributes.".into())
        })?;

        let mut el = renderable.import_element();
        if el.name() != tag_name {
            el = match tag_name {
                "link" => renderable.preload_element(),
                "a" => Element::new("a").attr("href", asset.url()),
                _ => {
                    return Err(AssetError::Render(format!(
                        "Tag <{tag_name}> is not allowed for this asset. Use <{}> instead.",
                        el.name()
                    )));
                }
            };
        }

        let mut el = self.with_nonce_applied(el);
        complete_dimensions(&mut el, used);
        el.attrs.retain(|name, _| !used.contains_key(name));
        Ok(el.attributes())
    }

    fn nonce(&self) -> Option<&str> {
        self.nonce
            .get_or_init(|| self.nonce_provider.as_ref().and_then(|p| p.nonce()))
            .as_deref()
    }

    fn with_nonce_applied(&self, mut el: Element) -> Element {
        if NONCE_ELEMENTS.contains(&el.name())
            && let Some(nonce) = self.nonce()
        {
            el.set("nonce", nonce);
        }
        el
    }
}

/// Reconcile width/height with the ones written in the template.
///
/// If exactly one dimension is given literally and the element knows both,
/// the other is scaled to keep the aspect ratio. Otherwise any template
/// dimension drops both computed ones.
fn complete_dimensions(el: &mut Element, used: &UsedAttributes) {
    let width = used.get("width");
    let height = used.get("height");

    if width.is_some() != height.is_some() {
        let known = |name: &str| {
            el.get(name)
                .filter(|v| !v.is_empty())
                .and_then(|v| v.as_text())
                .and_then(|v| v.parse::<f64>().ok())
        };
        let scaled = match (known("width"), known("height"), width, height) {
            (Some(w), Some(h), Some(UsedAttribute::Literal(given)), None) => {
                given.trim().parse::<f64>().ok().map(|g| ("height", g / w * h))
            }
            (Some(w), Some(h), None, Some(UsedAttribute::Literal(given))) => {
                given.trim().parse::<f64>().ok().map(|g| ("width", g / h * w))
            }
            _ => None,
        };
        if let Some((name, value)) = scaled {
            el.set(name, format!("{}", value.round() as i64));
            return;
        }
    }

    if width.is_some() || height.is_some() {
        el.remove("width");
        el.remove("height");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{EntryAsset, GenericAsset, ImageAsset, ScriptAsset, StyleAsset};

    fn runtime() -> Runtime {
        Runtime::new(Arc::new(Registry::new()))
    }

    fn used(pairs: &[(&str, Option<&str>)]) -> UsedAttributes {
        pairs
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    Some(v) => UsedAttribute::Literal(v.to_string()),
                    None => UsedAttribute::Dynamic,
                };
                (name.to_string(), value)
            })
            .collect()
    }

    fn image(width: u32, height: u32) -> Asset {
        Asset::Image(ImageAsset::new("/img.png").with_size(Some(width), Some(height)))
    }

    #[test]
    fn test_resolve_passthrough_and_null() {
        let rt = runtime();
        let asset = Arc::new(Asset::Style(StyleAsset::new("/a.css")));
        let resolved = rt.resolve(Arc::clone(&asset), &Options::new(), false).unwrap().unwrap();
        assert!(Arc::ptr_eq(&asset, &resolved));

        let err = rt.resolve(AssetRef::Null, &Options::new(), false).unwrap_err();
        assert_eq!(err.to_string(), "Asset cannot be null.");
        assert!(rt.resolve(None::<&str>, &Options::new(), true).unwrap().is_none());
    }

    #[test]
    fn test_render_script_crossorigin_default() {
        let rt = runtime();
        let with_integrity =
            Asset::Script(ScriptAsset::new("/a.js").with_integrity(Some("sha384-x".into())));
        assert_eq!(
            rt.render_asset(&with_integrity).unwrap(),
            r#"<script src="/a.js" integrity="sha384-x" crossorigin></script>"#
        );

        let plain = Asset::Script(ScriptAsset::new("/a.js"));
        assert!(!rt.render_asset(&plain).unwrap().contains("crossorigin"));
    }

    #[test]
    fn test_render_entry_order() {
        let rt = runtime();
        let entry = EntryAsset::new("/main.js")
            .with_preloads(vec![Asset::Script(
                ScriptAsset::new("/chunk.js").with_type(Some("module".into())),
            )])
            .with_imports(vec![Asset::Style(StyleAsset::new("/main.css"))]);
        assert_eq!(
            rt.render_asset(&Asset::Entry(entry)).unwrap(),
            concat!(
                r#"<script src="/main.js" type="module"></script>"#,
                r#"<link rel="modulepreload" href="/chunk.js">"#,
                r#"<link rel="stylesheet" href="/main.css">"#,
            )
        );
    }

    #[test]
    fn test_render_generic_fails() {
        let rt = runtime();
        let asset = Asset::Generic(GenericAsset::new("/doc.pdf"));
        assert_eq!(
            rt.render_asset(&asset).unwrap_err().to_string(),
            "This asset type cannot be rendered as HTML."
        );
        assert_eq!(
            rt.render_asset_preload(&asset).unwrap_err().to_string(),
            "This asset type cannot be preloaded."
        );
        assert!(rt.render_attributes(&asset, "a", &UsedAttributes::new()).is_err());
    }

    #[test]
    fn test_nonce_applied_to_script_and_link_only() {
        let rt = runtime().with_nonce(StaticNonce("abc".into()));
        let script = Asset::Script(ScriptAsset::new("/a.js"));
        assert_eq!(
            rt.render_asset(&script).unwrap(),
            r#"<script src="/a.js" nonce="abc"></script>"#
        );
        let style = Asset::Style(StyleAsset::new("/a.css"));
        assert_eq!(
            rt.render_asset_preload(&style).unwrap(),
            r#"<link rel="preload" href="/a.css" as="style" nonce="abc">"#
        );
        assert_eq!(
            rt.render_asset(&image(10, 10)).unwrap(),
            r#"<img src="/img.png" width="10" height="10">"#
        );
    }

    #[test]
    fn test_nonce_lookup_is_memoized() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let rt = runtime().with_nonce(|| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            None
        });
        let script = Asset::Script(ScriptAsset::new("/a.js"));
        rt.render_asset(&script).unwrap();
        rt.render_asset(&script).unwrap();
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_attributes_width_scales_height() {
        let rt = runtime();
        let attrs = rt
            .render_attributes(&image(200, 100), "img", &used(&[("width", Some("100"))]))
            .unwrap();
        assert_eq!(attrs, r#" src="/img.png" height="50""#);
    }

    #[test]
    fn test_attributes_height_scales_width() {
        let rt = runtime();
        let attrs = rt
            .render_attributes(&image(200, 100), "img", &used(&[("height", Some("33"))]))
            .unwrap();
        assert_eq!(attrs, r#" src="/img.png" width="66""#);
    }

    #[test]
    fn test_attributes_dynamic_dimension_drops_both() {
        let rt = runtime();
        let attrs = rt
            .render_attributes(&image(200, 100), "img", &used(&[("width", None)]))
            .unwrap();
        assert_eq!(attrs, r#" src="/img.png""#);

        let attrs = rt
            .render_attributes(
                &image(200, 100),
                "img",
                &used(&[("width", Some("10")), ("height", Some("10"))]),
            )
            .unwrap();
        assert_eq!(attrs, r#" src="/img.png""#);
    }

    #[test]
    fn test_attributes_skip_used() {
        let rt = runtime();
        let attrs = rt
            .render_attributes(&image(20, 10), "img", &used(&[("src", Some("x"))]))
            .unwrap();
        assert_eq!(attrs, r#" width="20" height="10""#);
    }

    #[test]
    fn test_attributes_tag_fallbacks() {
        let rt = runtime();
        let script = Asset::Script(ScriptAsset::new("/a.js").with_type(Some("module".into())));

        let attrs = rt.render_attributes(&script, "link", &UsedAttributes::new()).unwrap();
        assert_eq!(attrs, r#" rel="modulepreload" href="/a.js""#);

        let attrs = rt.render_attributes(&script, "a", &UsedAttributes::new()).unwrap();
        assert_eq!(attrs, r#" href="/a.js""#);

        let err = rt.render_attributes(&script, "img", &UsedAttributes::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Tag <img> is not allowed for this asset. Use <script> instead."
        );
    }
}
