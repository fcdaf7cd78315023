//! Asset tags in HTML templates.
//!
//! A small tag expander, not a template language. It understands:
//!
//! | Syntax                              | Output                               |
//! |-------------------------------------|--------------------------------------|
//! | `{asset 'app.js'}`                  | import element(s)                    |
//! | `{preload 'app.js'}`                | preload hint                         |
//! | `{asset ?'maybe.js'}`               | nothing when the asset is missing    |
//! | `<img src="{asset 'a.png'}">`       | just the URL inside an HTML tag      |
//! | `<img n:asset="logo.png" alt="x">`  | asset attributes merged into the tag |
//! | `<img n:asset?="logo.png">`         | whole element dropped when missing   |
//!
//! Options follow the reference: `{asset 'a.js', version: false}`; both
//! `key: value` and `key => value` are accepted.

mod parser;

use thiserror::Error;

use crate::error::Result;
use crate::html::escape_attr;
use crate::mapper::Options;
use crate::registry::QualifiedRef;
use crate::runtime::{Runtime, UsedAttributes};

/// Template compile error; offsets are byte positions in the source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Unterminated {what} starting at offset {offset}")]
    Unterminated { what: &'static str, offset: usize },

    #[error("Invalid arguments at offset {offset}: {message}")]
    Arguments { offset: usize, message: String },

    #[error("Attribute n:asset is not allowed on <{name}> (offset {offset})")]
    UnsupportedElement { name: String, offset: usize },

    #[error("Missing closing tag </{name}> for element at offset {offset}")]
    Unclosed { name: String, offset: usize },
}

/// `{asset}` or `{preload}`.
#[derive(Debug, Clone)]
struct AssetTag {
    reference: QualifiedRef,
    options: Options,
    optional: bool,
    preload: bool,
    /// Inside an HTML start tag, only the URL is printed.
    in_tag: bool,
}

/// An element carrying `n:asset`.
#[derive(Debug, Clone)]
struct AssetElement {
    tag_name: String,
    reference: QualifiedRef,
    options: Options,
    optional: bool,
    used: UsedAttributes,
    /// Start tag up to the `n:asset` attribute.
    head: Vec<Node>,
    /// Rest of the start tag.
    tail: Vec<Node>,
    /// Content and closing tag; empty for void elements.
    body: Vec<Node>,
}

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Asset(AssetTag),
    Element(AssetElement),
}

/// A compiled template.
#[derive(Debug, Clone)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parse `source` once; render as often as needed.
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        let nodes = parser::Parser::new(source).parse()?;
        Ok(Self { nodes })
    }

    /// Expand all asset tags using `runtime`.
    pub fn render(&self, runtime: &Runtime) -> Result<String> {
        let mut out = String::new();
        render_nodes(&self.nodes, runtime, &mut out)?;
        Ok(out)
    }
}

fn render_nodes(nodes: &[Node], runtime: &Runtime, out: &mut String) -> Result<()> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Asset(tag) => {
                let Some(asset) = runtime.resolve(tag.reference.clone(), &tag.options, tag.optional)? else {
                    continue;
                };
                if tag.in_tag {
                    out.push_str(&escape_attr(asset.url()));
                } else if tag.preload {
                    out.push_str(&runtime.render_asset_preload(&asset)?);
                } else {
                    out.push_str(&runtime.render_asset(&asset)?);
                }
            }
            Node::Element(el) => {
                let Some(asset) = runtime.resolve(el.reference.clone(), &el.options, el.optional)? else {
                    continue;
                };
                render_nodes(&el.head, runtime, out)?;
                out.push_str(&runtime.render_attributes(&asset, &el.tag_name, &el.used)?);
                render_nodes(&el.tail, runtime, out)?;
                render_nodes(&el.body, runtime, out)?;
            }
        }
    }
    Ok(())
}
