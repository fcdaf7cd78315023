//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::AssetError;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),

    /// A mapper rejected its settings.
    #[error(transparent)]
    Asset(#[from] AssetError),
}
