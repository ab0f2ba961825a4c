//! Input and state documents
//!
//! Configuration documents may be YAML or JSON; state documents are written
//! as pretty-printed JSON.

use std::fs;
use std::path::Path;

use serde_json::Value as JsonValue;

use crate::error::{CliError, Result};

/// Read a YAML or JSON document
pub fn read(path: &Path) -> Result<JsonValue> {
    let text = fs::read_to_string(path)?;
    parse(&text).map_err(|e| CliError::document(path.display().to_string(), e))
}

/// Read a state document; a missing file means no prior state
pub fn read_state(path: &Path) -> Result<Option<JsonValue>> {
    if !path.exists() {
        return Ok(None);
    }
    let value = read(path)?;
    Ok((!value.is_null()).then_some(value))
}

fn parse(text: &str) -> std::result::Result<JsonValue, serde_yaml::Error> {
    if text.trim().is_empty() {
        return Ok(JsonValue::Null);
    }
    serde_yaml::from_str(text)
}

/// Write `state` to `path`, or remove the file when there is no state
pub fn write_state(path: &Path, state: Option<&JsonValue>) -> Result<()> {
    match state {
        Some(value) => {
            let text = serde_json::to_string_pretty(value)
                .map_err(|e| CliError::internal(e.to_string()))?;
            fs::write(path, format!("{}\n", text))?;
        }
        None if path.exists() => fs::remove_file(path)?,
        None => {}
    }
    Ok(())
}

/// Print a document to stdout
pub fn print(value: &JsonValue) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| CliError::internal(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_and_json_inputs() {
        let dir = TempDir::new().unwrap();
        let yaml = dir.path().join("bs.yaml");
        fs::write(&yaml, "name: bs-a\npath: /data/a\nsoft_quota:\n  type: spaceUsedQuota\n  limit_bytes: 10\n").unwrap();
        assert_eq!(
            read(&yaml).unwrap(),
            json!({"name": "bs-a", "path": "/data/a", "soft_quota": {"type": "spaceUsedQuota", "limit_bytes": 10}})
        );

        let json_file = dir.path().join("bs.json");
        fs::write(&json_file, r#"{"name": "bs-b"}"#).unwrap();
        assert_eq!(read(&json_file).unwrap(), json!({"name": "bs-b"}));
    }

    #[test]
    fn test_state_file_lifecycle() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");
        assert!(read_state(&state).unwrap().is_none());

        write_state(&state, Some(&json!({"name": "bs-a"}))).unwrap();
        assert_eq!(read_state(&state).unwrap(), Some(json!({"name": "bs-a"})));

        write_state(&state, None).unwrap();
        assert!(!state.exists());
    }

    #[test]
    fn test_invalid_document() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("bad.yaml");
        fs::write(&bad, "name: [unclosed").unwrap();
        let err = read(&bad).unwrap_err();
        assert!(matches!(err, CliError::Document { .. }));
    }
}
