//! Whole-collection JSON persistence.
//!
//! Collections are small, so every write replaces the entire file. Writes go
//! to a sibling temp file which is synced and then renamed over the target,
//! leaving either the old or the new contents on disk after a crash.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{MonitorError, MonitorResult};

/// Load a collection from `path`.
///
/// A missing file yields `T::default()`. A present but unreadable or corrupt
/// file is an error.
pub fn load_json<T>(path: &Path) -> MonitorResult<T>
where
    T: DeserializeOwned + Default,
{
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(MonitorError::storage(path, e)),
    };

    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        MonitorError::storage(
            path,
            io::Error::new(io::ErrorKind::InvalidData, format!("corrupt data: {}", e)),
        )
    })
}

/// Atomically replace the contents of `path` with `value`.
pub fn save_json_atomic<T>(path: &Path, value: &T) -> MonitorResult<()>
where
    T: Serialize + ?Sized,
{
    write_atomic(path, value).map_err(|e| MonitorError::storage(path, e))
}

fn write_atomic<T>(path: &Path, value: &T) -> io::Result<()>
where
    T: Serialize + ?Sized,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("tmp");
    let result = (|| {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value).map_err(io::Error::other)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_default() {
        let dir = TempDir::new().unwrap();
        let loaded: Vec<String> = load_json(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("values.json");

        save_json_atomic(&path, &vec![1u32, 2, 3]).unwrap();
        let loaded: Vec<u32> = load_json(&path).unwrap();

        assert_eq!(loaded, vec![1, 2, 3]);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("values.json");
        fs::write(&path, "{ not json").unwrap();

        let result: MonitorResult<Vec<u32>> = load_json(&path);
        assert!(matches!(result, Err(MonitorError::Storage { .. })));
    }

    #[test]
    fn test_unwritable_target_leaves_previous_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("values.json");
        save_json_atomic(&path, &vec![1u32]).unwrap();

        // A directory where the temp file should go makes the write fail.
        fs::create_dir(path.with_extension("tmp")).unwrap();
        assert!(save_json_atomic(&path, &vec![2u32]).is_err());

        let loaded: Vec<u32> = load_json(&path).unwrap();
        assert_eq!(loaded, vec![1]);
    }
}
