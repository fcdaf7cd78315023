//! Mappers resolve a reference string into an [`Asset`].
//!
//! # Implementations
//!
//! | Mapper             | Backend                                        |
//! |--------------------|------------------------------------------------|
//! | `FilesystemMapper` | files under a base directory, mtime versioning |
//! | `ViteMapper`       | Vite build manifest, or the Vite dev server    |

mod filesystem;
mod vite;

use serde_json::Value;

pub use filesystem::FilesystemMapper;
pub use vite::ViteMapper;

use crate::asset::Asset;
use crate::error::Result;

/// Per-call options, keyed by name in insertion order.
pub type Options = serde_json::Map<String, Value>;

/// Resolves mapper-specific references to assets.
pub trait Mapper: Send + Sync {
    /// Resolve `reference` to an asset.
    ///
    /// # Errors
    ///
    /// `AssetError::NotFound` when the reference cannot be resolved;
    /// `AssetError::InvalidArgument` for unsupported options.
    fn get_asset(&self, reference: &str, options: &Options) -> Result<Asset>;
}

impl<M: Mapper + ?Sized> Mapper for Box<M> {
    fn get_asset(&self, reference: &str, options: &Options) -> Result<Asset> {
        (**self).get_asset(reference, options)
    }
}

/// Loose truthiness of an option value.
///
/// `null`, `false`, `0`, `""`, `"0"` and empty collections are false.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("0")));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!([])));
    }
}
