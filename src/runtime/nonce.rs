//! CSP nonce discovery.
//!
//! The runtime asks a [`NonceProvider`] once and memoizes the answer, so
//! rendering never inspects response state directly.

use std::sync::LazyLock;

use regex::Regex;

static CSP_NONCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^Content-Security-Policy(?:-Report-Only)?:.*'nonce-([^']+)'").expect("valid regex")
});

/// Source of the nonce for the current response.
pub trait NonceProvider: Send + Sync {
    fn nonce(&self) -> Option<String>;
}

impl<F> NonceProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn nonce(&self) -> Option<String> {
        self()
    }
}

/// A fixed nonce, e.g. generated by the caller per response.
#[derive(Debug, Clone)]
pub struct StaticNonce(pub String);

impl NonceProvider for StaticNonce {
    fn nonce(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Outgoing response headers scanned for a CSP `'nonce-...'` source.
#[derive(Debug, Clone, Default)]
pub struct CspHeaders {
    lines: Vec<String>,
}

impl CspHeaders {
    /// Build from `(name, value)` header pairs.
    pub fn from_pairs<I, N, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let lines = headers
            .into_iter()
            .map(|(name, value)| format!("{}: {}", name.as_ref(), value.as_ref()))
            .collect();
        Self { lines }
    }

    /// Build from raw `Name: value` header lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl NonceProvider for CspHeaders {
    fn nonce(&self) -> Option<String> {
        self.lines
            .iter()
            .find_map(|line| CSP_NONCE_RE.captures(line))
            .map(|caps| caps[1].to_string())
    }
}
