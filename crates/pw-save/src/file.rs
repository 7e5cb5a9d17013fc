//! Crash-safe JSON file writes shared by saves and profiles.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use crate::error::{SaveError, SaveResult};

/// The backup path for a record: same name with a `.bak` extension.
pub(crate) fn backup_path(path: &Path) -> PathBuf {
    path.with_extension("bak")
}

fn io_error(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> SaveError {
    let path = path.to_path_buf();
    move |source| SaveError::Io {
        action,
        path,
        source,
    }
}

/// Serialize `value` to `path` through a temporary file in the same
/// directory. The previous file, if any, is copied to the backup first.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> SaveResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(io_error("failed to create", &dir))?;

    let json = serde_json::to_string_pretty(value).map_err(|e| SaveError::Corrupt {
        path: path.to_path_buf(),
        message: format!("cannot serialize: {e}"),
    })?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(io_error("failed to create temp file in", &dir))?;
    tmp.write_all(json.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(io_error("failed to write", tmp.path()))?;

    if path.exists() {
        let backup = backup_path(path);
        fs::copy(path, &backup).map_err(io_error("failed to back up", path))?;
    }

    tmp.persist(path)
        .map_err(|e| io_error("failed to replace", path)(e.error))?;
    tracing::debug!(path = %path.display(), "record written");
    Ok(())
}

/// Read and parse a JSON file. `Ok(None)` when it does not exist.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> SaveResult<Option<T>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error("failed to read", path)(e)),
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| SaveError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_write_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");
        write_json_atomic(&path, &vec![1]).unwrap();
        assert!(!backup_path(&path).exists());

        write_json_atomic(&path, &vec![2]).unwrap();
        let current: Vec<i32> = read_json(&path).unwrap().unwrap();
        let previous: Vec<i32> = read_json(&backup_path(&path)).unwrap().unwrap();
        assert_eq!(current, vec![2]);
        assert_eq!(previous, vec![1]);
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let got: Option<Vec<i32>> = read_json(&dir.path().join("absent.json")).unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let err = read_json::<Vec<i32>>(&path).unwrap_err();
        assert!(matches!(err, SaveError::Corrupt { .. }));
    }
}
