//! File store for cached API responses
//!
//! Provides a `CacheManager` that keeps one JSON file per key. Files are written
//! whole and never expire; keys that encode a date make stale data age out on
//! their own.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Manages reading and writing cached documents on disk
///
/// Each key maps to `<cache_dir>/<key>.json`. The directory is created the
/// first time something is written to it.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a CacheManager rooted at `cache_dir`
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Directory where cache files are stored
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to a cache file for the given key
    pub fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Replaces the contents stored under `key`
    ///
    /// The document is written to a temporary file and renamed into place, so
    /// readers see either the old contents or the new ones.
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if directory creation or file writing fails
    pub fn write(&self, key: &str, contents: &str) -> io::Result<()> {
        self.ensure_dir()?;

        let path = self.cache_path(key);
        let tmp_path = self
            .cache_dir
            .join(format!("{}.json.{}.tmp", key, std::process::id()));

        fs::write(&tmp_path, contents)?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        Ok(())
    }

    /// Reads the contents stored under `key`
    ///
    /// # Returns
    /// * `Ok(Some(contents))` if the entry exists
    /// * `Ok(None)` if there is no entry for the key
    /// * `Err` if the file exists but cannot be read
    pub fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.cache_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_cache() -> (CacheManager, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::new(temp_dir.path());
        (cache, temp_dir)
    }

    #[test]
    fn test_write_creates_file_in_cache_directory() {
        let (cache, temp_dir) = create_test_cache();

        cache
            .write("2024-05-06-LUNCH", "{\"value\": 42}")
            .expect("Write should succeed");

        let expected_path = temp_dir.path().join("2024-05-06-LUNCH.json");
        assert!(expected_path.exists(), "Cache file should exist");

        let content = fs::read_to_string(&expected_path).expect("Should read file");
        assert_eq!(content, "{\"value\": 42}");
    }

    #[test]
    fn test_read_returns_none_for_missing_key() {
        let (cache, _temp_dir) = create_test_cache();

        let result = cache.read("nonexistent_key").expect("Read should succeed");

        assert!(result.is_none(), "Should return None for missing key");
    }

    #[test]
    fn test_read_returns_none_when_directory_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::new(temp_dir.path().join("never-created"));

        assert!(cache.read("any").expect("Read should succeed").is_none());
    }

    #[test]
    fn test_contents_survive_roundtrip_verbatim() {
        let (cache, _temp_dir) = create_test_cache();
        let original = "{ \"Menu\":  {\"MenuStations\": []},\n \"SelectedPeriodId\": 1 }";

        cache.write("roundtrip_key", original).expect("Write should succeed");

        let result = cache.read("roundtrip_key").expect("Read should succeed");
        assert_eq!(result.as_deref(), Some(original), "Data should survive roundtrip");
    }

    #[test]
    fn test_write_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache").join("dir");
        let cache = CacheManager::new(nested_path.clone());

        cache.write("nested_key", "[]").expect("Write should succeed");

        assert!(nested_path.exists(), "Nested directory should be created");
        assert!(nested_path.join("nested_key.json").exists(), "Cache file should exist");
    }

    #[test]
    fn test_overwrite_replaces_whole_file() {
        let (cache, _temp_dir) = create_test_cache();

        cache
            .write("overwrite_key", "{\"first\": \"a much longer document\"}")
            .expect("First write should succeed");
        cache
            .write("overwrite_key", "{}")
            .expect("Second write should succeed");

        let result = cache.read("overwrite_key").expect("Read should succeed");
        assert_eq!(result.as_deref(), Some("{}"), "Cache should contain latest data only");
    }

    #[test]
    fn test_write_leaves_no_temporary_files() {
        let (cache, temp_dir) = create_test_cache();

        cache.write("tidy", "{}").expect("Write should succeed");

        let names: Vec<String> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["tidy.json".to_string()]);
    }
}
