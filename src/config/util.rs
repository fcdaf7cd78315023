//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Resolve a mapper URL against `base_url`.
///
/// `base_url` always acts as a directory. Absolute base URLs are joined
/// with the `url` crate; path-only ones are concatenated unless `relative`
/// is itself rooted. Trailing slashes are trimmed from the result.
///
/// # Examples
/// ```ignore
/// resolve_url("https://example.com/app", "assets") -> "https://example.com/app/assets"
/// resolve_url("https://example.com/", "/static")   -> "https://example.com/static"
/// resolve_url("/app", "assets")                    -> "/app/assets"
/// resolve_url("/", "")                             -> ""
/// ```
pub fn resolve_url(base_url: &str, relative: &str) -> String {
    let base = format!("{}/", base_url.trim_end_matches('/'));

    let resolved = match url::Url::parse(&base) {
        Ok(parsed) => parsed
            .join(relative)
            .map(String::from)
            .unwrap_or_else(|_| format!("{base}{relative}")),
        Err(_) if relative.starts_with('/') || url::Url::parse(relative).is_ok() => {
            relative.to_string()
        }
        Err(_) => format!("{base}{relative}"),
    };

    resolved.trim_end_matches('/').to_string()
}

/// Join `base` with `path` (absolute `path` wins) and trim trailing separators.
pub fn resolve_path(base: Option<&Path>, path: Option<&str>) -> Option<PathBuf> {
    let joined = match (base, path) {
        (Some(base), Some(path)) => base.join(path),
        (None, Some(path)) => PathBuf::from(path),
        (Some(base), None) => base.to_path_buf(),
        (None, None) => return None,
    };
    let text = joined.to_string_lossy();
    let trimmed = text.trim_end_matches(['/', '\\']);
    // keep a bare root intact
    if trimmed.is_empty() {
        return Some(joined);
    }
    Some(PathBuf::from(trimmed))
}

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/site/templates/  ← cwd
/// /home/user/site/assets.toml ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.exists())
}

// ============================================================================
// tests
// ============================================================================
