//! Minimal HTML element model used to render assets.
//!
//! Provides:
//! - `Element` - tag name plus insertion-ordered attributes
//! - `AttrValue` - text or boolean attribute values
//! - `escape_attr()` - HTML entity escaping for attribute values
//! - `is_void_element()` - elements rendered without a closing tag

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Characters that require HTML escaping.
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Get the HTML entity for a special character.
#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML attribute values.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Check if tag is a void element (no closing tag).
#[inline]
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

// =============================================================================
// Element
// =============================================================================

/// Attribute value: `Text` renders `name="value"`, `Bool(true)` renders a
/// bare `name`, `Bool(false)` is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    Bool(bool),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Bool(_) => None,
        }
    }

    /// Empty text and `false` count as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty() || s == "0",
            Self::Bool(b) => !b,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// An HTML element with insertion-ordered attributes and no children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    pub attrs: IndexMap<String, AttrValue>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builder-style attribute setter.
    pub fn attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set the attribute only when a value is present.
    pub fn attr_opt<V: Into<AttrValue>>(mut self, name: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.set(name, value);
        }
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.attrs.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    /// Remove an attribute, keeping the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.attrs.shift_remove(name)
    }

    /// Render attributes as ` name="value"` pairs, each with a leading space.
    pub fn attributes(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.attrs {
            match value {
                AttrValue::Bool(false) => {}
                AttrValue::Bool(true) => {
                    out.push(' ');
                    out.push_str(name);
                }
                AttrValue::Text(text) => {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(text));
                    out.push('"');
                }
            }
        }
        out
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}{}>", self.name, self.attributes())?;
        if !is_void_element(&self.name) {
            write!(f, "</{}>", self.name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr("normal"), "normal");
        assert_eq!(escape_attr("a\"b&c"), "a&quot;b&amp;c");
        assert_eq!(escape_attr("it's"), "it&#39;s");
    }

    #[test]
    fn test_render_void_element() {
        let el = Element::new("img").attr("src", "/a.png").attr("alt", "A & B");
        assert_eq!(el.to_string(), r#"<img src="/a.png" alt="A &amp; B">"#);
    }

    #[test]
    fn test_render_boolean_attributes() {
        let el = Element::new("script")
            .attr("src", "/app.js")
            .attr("crossorigin", true)
            .attr("defer", false);
        assert_eq!(el.to_string(), r#"<script src="/app.js" crossorigin></script>"#);
    }

    #[test]
    fn test_attr_opt_skips_none() {
        let el = Element::new("link").attr_opt("media", None::<&str>);
        assert!(el.attrs.is_empty());
        assert_eq!(el.attributes(), "");
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut el = Element::new("img")
            .attr("src", "a")
            .attr("width", "1")
            .attr("height", "2");
        el.remove("width");
        assert_eq!(el.attributes(), r#" src="a" height="2""#);
    }
}
