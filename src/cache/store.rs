// Key-value storage backends for cached snapshots.
// The file backend stands in for browser local storage, one JSON file per key.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::error::Result;

use super::paths::key_path;

/// String key-value store with local-storage semantics.
pub trait Storage: Send + Sync {
    /// Read the raw value for `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value for `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = key_path(&self.dir, key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)?;
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = key_path(&self.dir, key);

        // Write atomically via temp file
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &path)?;

        Ok(())
    }
}

#[cfg(test)]
pub use memory::MemoryStorage;


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read_file_storage() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("nested"));

        storage.set("leaderboardData", r#"{"data":[],"timestamp":1}"#).unwrap();

        let read = storage.get("leaderboardData").unwrap();
        assert_eq!(read.as_deref(), Some(r#"{"data":[],"timestamp":1}"#));
        assert!(temp_dir.path().join("nested/leaderboardData.json").exists());
        assert!(!temp_dir.path().join("nested/leaderboardData.tmp").exists());
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.set("github_stats", "first").unwrap();
        storage.set("github_stats", "second").unwrap();

        assert_eq!(storage.get("github_stats").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_read_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        assert!(storage.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert!(storage.get("k").unwrap().is_none());
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_failing_memory_storage_rejects_writes() {
        let storage = MemoryStorage::failing();
        assert!(storage.set("k", "v").is_err());
        assert!(storage.get("k").unwrap().is_none());
    }
}
