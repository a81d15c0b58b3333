//! Env-file parsing. Values are read, never exported into the process.

use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{ConfigError, Result};

pub const DEFAULT_ENV_FILE: &str = ".env";

/// Parse a dotenv file into ordered key/value pairs.
///
/// A missing file yields an empty map.
pub fn load(path: &Path) -> Result<IndexMap<String, String>> {
    if !path.is_file() {
        debug!(path = %path.display(), "no env file");
        return Ok(IndexMap::new());
    }

    let invalid = |err: dotenvy::Error| ConfigError::InvalidValue {
        field: path.display().to_string(),
        hint: err.to_string(),
    };

    let mut values = IndexMap::new();
    for item in dotenvy::from_path_iter(path).map_err(invalid)? {
        let (key, value) = item.map_err(invalid)?;
        values.insert(key, value);
    }

    debug!(path = %path.display(), count = values.len(), "loaded env file");
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let values = load(&dir.path().join(".env")).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn parses_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "API_URL=https://api.local\n# comment\nFEATURE_X=\"on\"\n").unwrap();

        let values = load(&path).unwrap();
        let keys: Vec<_> = values.keys().cloned().collect();
        assert_eq!(keys, ["API_URL", "FEATURE_X"]);
        assert_eq!(values["FEATURE_X"], "on");
    }
}
