//! Development server discovery.

use std::fs;
use std::path::Path;

use serde_json::Value;

/// Read the dev server URL from a JSON info file written by the bundler plugin.
///
/// Returns `None` when the file is missing, unparseable, lacks a `devServer`
/// string, or the value is not a valid URL.
pub fn detect_dev_server(info_file: &Path) -> Option<String> {
    let content = fs::read_to_string(info_file).ok()?;
    let info: Value = serde_json::from_str(&content).ok()?;
    let server = info.get("devServer")?.as_str()?;
    url::Url::parse(server).ok()?;
    Some(server.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_dev_server() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("nette.json");
        fs::write(&file, r#"{"devServer": "http://localhost:5173"}"#).unwrap();
        assert_eq!(
            detect_dev_server(&file).as_deref(),
            Some("http://localhost:5173")
        );
    }

    #[test]
    fn test_detect_dev_server_failures() {
        let dir = TempDir::new().unwrap();
        assert_eq!(detect_dev_server(&dir.path().join("missing.json")), None);

        let file = dir.path().join("broken.json");
        fs::write(&file, "{not json").unwrap();
        assert_eq!(detect_dev_server(&file), None);

        fs::write(&file, r#"{"other": 1}"#).unwrap();
        assert_eq!(detect_dev_server(&file), None);

        fs::write(&file, r#"{"devServer": 5173}"#).unwrap();
        assert_eq!(detect_dev_server(&file), None);
    }
}
