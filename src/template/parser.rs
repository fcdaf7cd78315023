//! Template scanner.
//!
//! Text is copied through untouched. Only `{asset ...}` / `{preload ...}`
//! tags and HTML start tags carrying `n:asset` become nodes. Comments and
//! the bodies of `<script>` / `<style>` are never scanned for start tags.

use serde_json::{Number, Value};

use super::{AssetElement, AssetTag, Node, TemplateError};
use crate::html::is_void_element;
use crate::mapper::Options;
use crate::registry::QualifiedRef;
use crate::runtime::{UsedAttribute, UsedAttributes};

/// Elements that accept `n:asset`.
const ASSET_ELEMENTS: [&str; 6] = ["link", "script", "img", "video", "audio", "a"];

/// Elements whose content is raw text.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

type ParseResult<T> = Result<T, TemplateError>;

/// Attribute of a start tag, as byte ranges into the source.
struct RawAttr {
    name: String,
    start: usize,
    end: usize,
    value: Option<(usize, usize)>,
}

struct StartTag {
    name: String,
    start: usize,
    end: usize,
    self_closing: bool,
    attrs: Vec<RawAttr>,
}

pub(super) struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    pub fn parse(mut self) -> ParseResult<Vec<Node>> {
        self.parse_nodes(None)
    }

    /// Parse until EOF, or until the closing tag matching `closing`.
    fn parse_nodes(&mut self, closing: Option<(&str, usize)>) -> ParseResult<Vec<Node>> {
        let mut nodes = Vec::new();
        let mut text_start = self.pos;
        let mut depth = 0usize;

        while self.pos < self.src.len() {
            let rest = &self.src[self.pos..];

            if let Some(preload) = asset_tag_kind(rest) {
                push_text(&mut nodes, &self.src[text_start..self.pos]);
                let (tag, next) = self.asset_tag_at(self.pos, preload, false)?;
                nodes.push(Node::Asset(tag));
                self.pos = next;
                text_start = next;
            } else if let Some(body) = rest.strip_prefix("<!--") {
                let end = body.find("-->").map_or(self.src.len(), |i| self.pos + 4 + i + 3);
                push_text(&mut nodes, &self.src[text_start..self.pos]);
                nodes.extend(self.inline_nodes(self.pos, end, false)?);
                self.pos = end;
                text_start = end;
            } else if rest.starts_with("</") {
                if let Some((name, _)) = closing
                    && closes(rest, name)
                {
                    if depth == 0 {
                        let end = self.pos + rest.find('>').map_or(rest.len(), |i| i + 1);
                        push_text(&mut nodes, &self.src[text_start..end]);
                        self.pos = end;
                        return Ok(nodes);
                    }
                    depth -= 1;
                }
                self.pos += 2;
            } else if rest.starts_with('<') && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
                push_text(&mut nodes, &self.src[text_start..self.pos]);
                let tag = self.scan_start_tag()?;
                let plain = !tag.self_closing && !tag.attrs.iter().any(|a| is_asset_attribute(&a.name));
                if let Some((name, _)) = closing
                    && plain
                    && tag.name.eq_ignore_ascii_case(name)
                {
                    depth += 1;
                }
                let raw_text = (plain && is_raw_text_element(&tag.name))
                    .then(|| (tag.name.to_ascii_lowercase(), tag.start));
                self.push_start_tag(&mut nodes, tag)?;
                if let Some((name, offset)) = raw_text {
                    nodes.extend(self.raw_text(&name, offset)?);
                }
                text_start = self.pos;
            } else {
                self.pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }

        if let Some((name, offset)) = closing {
            return Err(TemplateError::Unclosed {
                name: name.to_string(),
                offset,
            });
        }
        push_text(&mut nodes, &self.src[text_start..]);
        Ok(nodes)
    }

    fn push_start_tag(&mut self, nodes: &mut Vec<Node>, tag: StartTag) -> ParseResult<()> {
        let Some(index) = tag.attrs.iter().position(|a| is_asset_attribute(&a.name)) else {
            nodes.extend(self.inline_nodes(tag.start, tag.end, true)?);
            return Ok(());
        };

        let tag_name = tag.name.to_ascii_lowercase();
        if !ASSET_ELEMENTS.contains(&tag_name.as_str()) {
            return Err(TemplateError::UnsupportedElement {
                name: tag.name,
                offset: tag.start,
            });
        }

        let attr = &tag.attrs[index];
        let (value_start, value_end) = attr.value.ok_or_else(|| TemplateError::Arguments {
            offset: attr.start,
            message: format!("{} requires an asset reference", attr.name),
        })?;
        let (reference, options) = parse_arguments(&self.src[value_start..value_end], value_start)?;
        let optional = attr.name.ends_with('?') || attr.name == "n:tryasset";

        let used: UsedAttributes = tag
            .attrs
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, a)| {
                let value = match a.value {
                    Some((s, e)) if !self.src[s..e].contains('{') => {
                        UsedAttribute::Literal(self.src[s..e].to_string())
                    }
                    _ => UsedAttribute::Dynamic,
                };
                (a.name.clone(), value)
            })
            .collect();

        let head_end = tag.start + self.src[tag.start..attr.start].trim_end().len();
        let head = self.inline_nodes(tag.start, head_end, true)?;
        let tail = self.inline_nodes(attr.end, tag.end, true)?;
        let body = if tag.self_closing || is_void_element(&tag_name) {
            Vec::new()
        } else if is_raw_text_element(&tag_name) {
            self.raw_text(&tag_name, tag.start)?
        } else {
            self.parse_nodes(Some((tag_name.as_str(), tag.start)))?
        };

        nodes.push(Node::Element(AssetElement {
            tag_name,
            reference,
            options,
            optional,
            used,
            head,
            tail,
            body,
        }));
        Ok(())
    }

    /// Scan an HTML start tag at `self.pos` and move past its `>`.
    fn scan_start_tag(&mut self) -> ParseResult<StartTag> {
        let src = self.src;
        let start = self.pos;
        let mut pos = start + 1;
        pos += take_while(&src[pos..], |c| c.is_ascii_alphanumeric() || c == '-' || c == ':');
        let name = src[start + 1..pos].to_string();
        let unterminated = TemplateError::Unterminated {
            what: "HTML tag",
            offset: start,
        };

        let mut attrs = Vec::new();
        let self_closing;
        loop {
            pos += take_while(&src[pos..], char::is_whitespace);
            let rest = &src[pos..];
            if rest.is_empty() {
                return Err(unterminated);
            } else if rest.starts_with("/>") {
                self_closing = true;
                pos += 2;
                break;
            } else if rest.starts_with('>') {
                self_closing = false;
                pos += 1;
                break;
            } else if asset_tag_kind(rest).is_some() {
                pos = find_tag_end(src, pos).ok_or(unterminated.clone())? + 1;
                continue;
            }

            let attr_start = pos;
            let len = take_while(rest, |c| !c.is_whitespace() && !matches!(c, '=' | '>' | '/'));
            if len == 0 {
                pos += rest.chars().next().map_or(1, char::len_utf8);
                continue;
            }
            pos += len;
            let name = src[attr_start..pos].to_string();

            let after_ws = pos + take_while(&src[pos..], char::is_whitespace);
            let mut value = None;
            if src[after_ws..].starts_with('=') {
                pos = after_ws + 1;
                pos += take_while(&src[pos..], char::is_whitespace);
                let rest = &src[pos..];
                if let Some(quote) = rest.chars().next().filter(|c| matches!(c, '"' | '\'')) {
                    let value_end = find_quote_end(src, pos + 1, quote).ok_or(TemplateError::Unterminated {
                        what: "attribute value",
                        offset: pos,
                    })?;
                    value = Some((pos + 1, value_end));
                    pos = value_end + 1;
                } else {
                    let len = take_while(rest, |c| !c.is_whitespace() && c != '>');
                    value = Some((pos, pos + len));
                    pos += len;
                }
            }
            attrs.push(RawAttr {
                name,
                start: attr_start,
                end: pos,
                value,
            });
        }

        self.pos = pos;
        Ok(StartTag {
            name,
            start,
            end: pos,
            self_closing,
            attrs,
        })
    }

    /// Content of a raw text element up to and including `</name>`.
    ///
    /// Only asset tags are recognized inside.
    fn raw_text(&mut self, name: &str, offset: usize) -> ParseResult<Vec<Node>> {
        let mut nodes = Vec::new();
        let mut text_start = self.pos;

        while self.pos < self.src.len() {
            let rest = &self.src[self.pos..];
            if let Some(preload) = asset_tag_kind(rest) {
                push_text(&mut nodes, &self.src[text_start..self.pos]);
                let (tag, next) = self.asset_tag_at(self.pos, preload, false)?;
                nodes.push(Node::Asset(tag));
                self.pos = next;
                text_start = next;
            } else if rest.starts_with("</") && closes(rest, name) {
                let end = self.pos + rest.find('>').map_or(rest.len(), |i| i + 1);
                push_text(&mut nodes, &self.src[text_start..end]);
                self.pos = end;
                return Ok(nodes);
            } else {
                self.pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }

        Err(TemplateError::Unclosed {
            name: name.to_string(),
            offset,
        })
    }

    /// Nodes for `src[from..to]`, a piece of a start tag or a comment.
    ///
    /// With `in_tag`, asset tags print only the URL.
    fn inline_nodes(&self, from: usize, to: usize, in_tag: bool) -> ParseResult<Vec<Node>> {
        let mut nodes = Vec::new();
        let mut text_start = from;
        let mut pos = from;
        while pos < to {
            let rest = &self.src[pos..to];
            if let Some(preload) = asset_tag_kind(rest) {
                push_text(&mut nodes, &self.src[text_start..pos]);
                let (tag, next) = self.asset_tag_at(pos, preload, in_tag)?;
                nodes.push(Node::Asset(tag));
                pos = next;
                text_start = next;
            } else {
                pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
        push_text(&mut nodes, &self.src[text_start..to]);
        Ok(nodes)
    }

    /// Parse the `{asset ...}` tag at `start`; returns the position after `}`.
    fn asset_tag_at(&self, start: usize, preload: bool, in_tag: bool) -> ParseResult<(AssetTag, usize)> {
        let end = find_tag_end(self.src, start).ok_or(TemplateError::Unterminated {
            what: "tag",
            offset: start,
        })?;
        let keyword = if preload { "preload" } else { "asset" };
        let args_start = start + 1 + keyword.len();
        let args = &self.src[args_start..end];
        let leading = args.len() - args.trim_start().len();

        let (optional, args, offset) = match args.trim_start().strip_prefix('?') {
            Some(rest) => (true, rest, args_start + leading + 1),
            None => (false, args.trim_start(), args_start + leading),
        };
        let (reference, options) = parse_arguments(args, offset)?;

        let tag = AssetTag {
            reference,
            options,
            optional,
            preload,
            in_tag,
        };
        Ok((tag, end + 1))
    }
}

// ============================================================================
// Arguments
// ============================================================================

/// Parse `ref[, key: value, ...]`.
fn parse_arguments(text: &str, offset: usize) -> ParseResult<(QualifiedRef, Options)> {
    let mut cur = Cursor { text, pos: 0, offset };

    cur.skip_ws();
    let reference = cur
        .string_or_word(|c| !c.is_whitespace() && c != ',')?
        .ok_or_else(|| cur.error("missing asset reference"))?;

    let mut options = Options::new();
    cur.skip_ws();
    while !cur.at_end() {
        if !cur.eat(",") {
            return Err(cur.error("expected ','"));
        }
        cur.skip_ws();
        if cur.at_end() {
            break;
        }
        let key = cur
            .string_or_word(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')?
            .ok_or_else(|| cur.error("expected option name"))?;
        cur.skip_ws();
        if !(cur.eat("=>") || cur.eat(":")) {
            return Err(cur.error("expected ':' or '=>' after option name"));
        }
        cur.skip_ws();
        let value = cur.value()?;
        options.insert(key, value);
        cur.skip_ws();
    }

    Ok((QualifiedRef::from(reference), options))
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn skip_ws(&mut self) {
        self.pos += take_while(self.rest(), char::is_whitespace);
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn error(&self, message: &str) -> TemplateError {
        TemplateError::Arguments {
            offset: self.offset + self.pos,
            message: message.to_string(),
        }
    }

    /// A quoted string, or a bare word of chars accepted by `word`.
    fn string_or_word(&mut self, word: impl Fn(char) -> bool) -> ParseResult<Option<String>> {
        if let Some(s) = self.quoted()? {
            return Ok(Some(s));
        }
        let len = take_while(self.rest(), word);
        if len == 0 {
            return Ok(None);
        }
        let s = self.rest()[..len].to_string();
        self.pos += len;
        Ok(Some(s))
    }

    fn quoted(&mut self) -> ParseResult<Option<String>> {
        let Some(quote) = self.rest().chars().next().filter(|c| matches!(c, '"' | '\'')) else {
            return Ok(None);
        };
        let start = self.pos;
        let mut out = String::new();
        let mut chars = self.rest()[1..].char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, next)) if next == quote || next == '\\' => out.push(next),
                    Some((_, next)) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => break,
                },
                c if c == quote => {
                    self.pos += 1 + i + c.len_utf8();
                    return Ok(Some(out));
                }
                c => out.push(c),
            }
        }
        self.pos = start;
        Err(self.error("unterminated string"))
    }

    fn value(&mut self) -> ParseResult<Value> {
        if let Some(s) = self.quoted()? {
            return Ok(Value::String(s));
        }
        let len = take_while(self.rest(), |c| !c.is_whitespace() && c != ',');
        let word = &self.rest()[..len];
        let value = match word {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            _ => parse_number(word).ok_or_else(|| self.error(&format!("unsupported option value '{word}'")))?,
        };
        self.pos += len;
        Ok(value)
    }
}

fn parse_number(word: &str) -> Option<Value> {
    if let Ok(n) = word.parse::<i64>() {
        return Some(Value::Number(n.into()));
    }
    word.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number)
}

// ============================================================================
// Scanning helpers
// ============================================================================

/// `Some(preload)` if `rest` starts an `{asset ...}` or `{preload ...}` tag.
fn asset_tag_kind(rest: &str) -> Option<bool> {
    let body = rest.strip_prefix('{')?;
    for (keyword, preload) in [("asset", false), ("preload", true)] {
        if let Some(after) = body.strip_prefix(keyword)
            && after.starts_with(|c: char| c.is_whitespace() || c == '}' || c == '?')
        {
            return Some(preload);
        }
    }
    None
}

fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|n| n.eq_ignore_ascii_case(name))
}

fn is_asset_attribute(name: &str) -> bool {
    matches!(name, "n:asset" | "n:asset?" | "n:tryasset")
}

/// Does `rest` (starting with `</`) close a `name` element?
fn closes(rest: &str, name: &str) -> bool {
    let after = &rest[2..];
    after.get(..name.len()).is_some_and(|n| n.eq_ignore_ascii_case(name))
        && after[name.len()..].starts_with(|c: char| c == '>' || c.is_whitespace())
}

/// Position of the `}` closing the tag that opens at `start`, skipping quoted strings.
fn find_tag_end(src: &str, start: usize) -> Option<usize> {
    let mut quote = None;
    let mut escaped = false;
    for (i, c) in src[start + 1..].char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == '}' => return Some(start + 1 + i),
            None => {}
        }
    }
    None
}

/// Position of the closing `quote` of an attribute value, skipping asset tags.
fn find_quote_end(src: &str, from: usize, quote: char) -> Option<usize> {
    let mut pos = from;
    while pos < src.len() {
        let rest = &src[pos..];
        if asset_tag_kind(rest).is_some() {
            pos = find_tag_end(src, pos)? + 1;
            continue;
        }
        let c = rest.chars().next()?;
        if c == quote {
            return Some(pos);
        }
        pos += c.len_utf8();
    }
    None
}

fn take_while(s: &str, pred: impl Fn(char) -> bool) -> usize {
    s.char_indices()
        .find(|&(_, c)| !pred(c))
        .map_or(s.len(), |(i, _)| i)
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(Node::Text(text.to_string()));
    }
}
