//! Asset resolution and rendering errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T, E = AssetError> = std::result::Result<T, E>;

/// Errors raised while resolving or rendering assets.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The selected mapper could not resolve the reference.
    ///
    /// This is the only recoverable kind: `try_*` lookups turn it into `None`.
    #[error("{0}")]
    NotFound(String),

    /// Unsupported or missing options, unknown or duplicate mappers, bad URLs.
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Failed to read Vite manifest from '{}'. Did you run 'npm run build'?", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read Vite manifest from '{}'. Did you run 'npm run build'?", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid Vite manifest format in '{}'", .0.display())]
    InvalidManifest(PathBuf),

    #[error("Failed to open file '{}'", .0.display())]
    FileOpen(PathBuf, #[source] io::Error),

    #[error("{0}")]
    Mp3(String),

    /// Asset type and requested HTML shape do not match.
    #[error("{0}")]
    Render(String),
}

impl AssetError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Rewrite `'reference'` to `'mapper:reference'` in a not-found message.
    ///
    /// Other variants and an empty mapper name pass through unchanged.
    pub fn qualify_reference(self, mapper: &str, reference: &str) -> Self {
        match self {
            Self::NotFound(message) if !mapper.is_empty() => Self::NotFound(message.replace(
                &format!("'{reference}'"),
                &format!("'{mapper}:{reference}'"),
            )),
            other => other,
        }
    }
}
