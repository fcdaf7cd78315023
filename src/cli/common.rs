//! Common utilities shared across CLI commands.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde_json::Value as JsonValue;

use assetmap::config::AssetsConfig;
use assetmap::mapper::Options;
use assetmap::runtime::{Runtime, StaticNonce};

use super::Cli;

/// Load the config and build a runtime for it.
pub fn load_runtime(cli: &Cli) -> Result<Runtime> {
    let config = AssetsConfig::load(&cli.config)?;
    let registry = config
        .build_registry()
        .with_context(|| format!("Failed to set up mappers from {}", config.config_path.display()))?;

    assetmap::debug!("config"; "mappers: {}", registry.mapper_names().collect::<Vec<_>>().join(", "));

    let runtime = Runtime::new(Arc::new(registry));
    Ok(match &cli.nonce {
        Some(nonce) => runtime.with_nonce(StaticNonce(nonce.clone())),
        None => runtime,
    })
}

/// Parse `key=value` pairs; values are JSON scalars when they parse as such.
pub fn parse_options(pairs: &[String]) -> Result<Options> {
    let mut options = Options::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid option '{pair}', expected key=value");
        };
        let value = match serde_json::from_str::<JsonValue>(value) {
            Ok(v) if !v.is_array() && !v.is_object() => v,
            _ => JsonValue::String(value.to_string()),
        };
        options.insert(key.trim().to_string(), value);
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let options = parse_options(&[
            "version=false".into(),
            "width=100".into(),
            "alt=Company logo".into(),
            "type=\"module\"".into(),
            "list=[1]".into(),
        ])
        .unwrap();
        assert_eq!(options["version"], JsonValue::Bool(false));
        assert_eq!(options["width"], JsonValue::from(100));
        assert_eq!(options["alt"], JsonValue::from("Company logo"));
        assert_eq!(options["type"], JsonValue::from("module"));
        assert_eq!(options["list"], JsonValue::from("[1]"));
    }

    #[test]
    fn test_parse_options_rejects_missing_equals() {
        assert!(parse_options(&["version".into()]).is_err());
    }
}
