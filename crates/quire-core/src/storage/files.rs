//! Filesystem helpers shared by the JSON stores

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::{StorageError, StorageResult};

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Serialize `value` as pretty JSON and write it atomically
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let json = serde_json::to_vec_pretty(value)?;
    atomic_write(path, &json)
}

/// Read and parse a JSON file, returning `None` if it does not exist
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let bytes = fs::read(path).map_err(|source| StorageError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| StorageError::InvalidFormat {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("file.txt");

        atomic_write(&nested_path, b"test data").unwrap();

        assert!(nested_path.exists());
        assert!(!nested_path.with_extension("tmp").exists());
        assert_eq!(fs::read_to_string(&nested_path).unwrap(), "test data");
    }

    #[test]
    fn test_json_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("map.json");

        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1u32);
        write_json(&path, &map).unwrap();

        let loaded: BTreeMap<String, u32> = read_json(&path).unwrap().unwrap();
        assert_eq!(loaded, map);
    }

    #[test]
    fn test_read_json_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let loaded: Option<Vec<u8>> = read_json(&temp_dir.path().join("none.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_read_json_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "{oops").unwrap();

        let err = read_json::<Vec<u8>>(&path).unwrap_err();
        assert!(matches!(err, StorageError::InvalidFormat { .. }));
    }
}
