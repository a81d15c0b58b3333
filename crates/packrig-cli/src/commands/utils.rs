//! Helpers shared by the commands.

use std::io::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::error::{CliError, Result, ResultExt};
use crate::ui;

/// Resolve a path relative to a base directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Absolute project root: `--cwd` if given, otherwise the current directory.
pub fn resolve_project_root(explicit_cwd: Option<&Path>) -> Result<PathBuf> {
    let current_dir = std::env::current_dir()?;

    let Some(cwd_path) = explicit_cwd else {
        return Ok(current_dir);
    };

    let absolute = resolve_path(cwd_path, &current_dir);
    if !absolute.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "Specified --cwd is not a directory: {}",
            absolute.display()
        )));
    }

    debug!(root = %absolute.display(), "using project root from --cwd");
    Ok(absolute)
}

/// Dev-server port requested through `PORT`.
///
/// Unset, empty, zero and non-numeric values mean no request.
pub fn requested_port(value: Option<&str>) -> Option<u16> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    match value.parse::<u16>() {
        Ok(0) => None,
        Ok(port) => Some(port),
        Err(_) => {
            ui::warning(&format!("Ignoring PORT={value}: not a valid port number"));
            None
        }
    }
}

/// Raw `PORT` value. The process environment wins over the env file.
pub fn port_variable<'a>(
    environment: &'a IndexMap<String, String>,
    env_file: &'a IndexMap<String, String>,
) -> Option<&'a str> {
    environment
        .get("PORT")
        .or_else(|| env_file.get("PORT"))
        .map(String::as_str)
}

/// Snapshot of the process environment, skipping non-UTF-8 entries.
pub fn environment_snapshot() -> IndexMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// Pretty-print `value` as JSON to `out`, or to stdout without one.
pub fn write_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    let Some(path) = out else {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{json}")?;
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_path(parent)?;
    }
    std::fs::write(path, json + "\n").with_path(path)?;
    ui::success(&format!("Wrote {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_path_absolute() {
        let abs_path = PathBuf::from("/absolute/path");
        let resolved = resolve_path(&abs_path, Path::new("/some/dir"));
        assert_eq!(resolved, abs_path);
    }

    #[test]
    fn test_resolve_path_relative() {
        let resolved = resolve_path(Path::new("app"), Path::new("/work"));
        assert_eq!(resolved, PathBuf::from("/work/app"));
    }

    #[test]
    fn test_explicit_root_must_be_a_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        std::fs::write(&file, "").unwrap();

        assert!(resolve_project_root(Some(temp.path())).is_ok());
        assert!(matches!(
            resolve_project_root(Some(&file)),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_requested_port_parsing() {
        assert_eq!(requested_port(None), None);
        assert_eq!(requested_port(Some("")), None);
        assert_eq!(requested_port(Some("0")), None);
        assert_eq!(requested_port(Some("abc")), None);
        assert_eq!(requested_port(Some("70000")), None);
        assert_eq!(requested_port(Some(" 3000 ")), Some(3000));
    }

    #[test]
    fn test_port_variable_falls_back_to_env_file() {
        let from_file = IndexMap::from([("PORT".to_string(), "4567".to_string())]);
        let empty = IndexMap::new();
        assert_eq!(port_variable(&empty, &from_file), Some("4567"));
        assert_eq!(port_variable(&empty, &empty), None);

        let process = IndexMap::from([("PORT".to_string(), "3000".to_string())]);
        assert_eq!(port_variable(&process, &from_file), Some("3000"));
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("nested/dir/config.json");

        write_json(&serde_json::json!({ "name": "client" }), Some(&out)).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written["name"], "client");
    }
}
