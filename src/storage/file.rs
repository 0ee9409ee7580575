//! File-backed durable store
//!
//! One file per key inside a directory. File names are the hex encoding of
//! the key so arbitrary keys (including canonical JSON) stay filesystem-safe
//! and `list_keys` can recover them.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CacheError, Result};
use crate::storage::DurableStore;

const TMP_EXTENSION: &str = "tmp";

// == File Store ==
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    quota_bytes: Option<u64>,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>, quota_bytes: Option<u64>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), ?quota_bytes, "Opened file store");
        Ok(Self { dir, quota_bytes })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(hex::encode(key.as_bytes()))
    }

    /// Total size of stored records, skipping `except`.
    fn used_bytes(&self, except: &Path) -> Result<u64> {
        let mut used = 0;
        for dir_entry in fs::read_dir(&self.dir)? {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();
            if path == except || path.extension().is_some() {
                continue;
            }
            used += dir_entry.metadata()?.len();
        }
        Ok(used)
    }
}

impl DurableStore for FileStore {
    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);

        if let Some(quota) = self.quota_bytes {
            let used = self.used_bytes(&path)?;
            let requested = value.len() as u64;
            if used + requested > quota {
                return Err(CacheError::QuotaExceeded {
                    used,
                    requested,
                    quota,
                });
            }
        }

        // Write then rename so a crash never leaves a half-written record
        let tmp = path.with_extension(TMP_EXTENSION);
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read(self.path_for(key)) {
            // Invalid UTF-8 surfaces later as an unparsable record
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for dir_entry in fs::read_dir(&self.dir)? {
            let name = dir_entry?.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Ok(bytes) = hex::decode(name) else {
                continue;
            };
            let Ok(key) = String::from_utf8(bytes) else {
                continue;
            };
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_read_delete() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path().join("store"), None).unwrap();

        store.write(r#"ns:entry:CATS_{"a":1}"#, "payload").unwrap();
        assert_eq!(
            store.read(r#"ns:entry:CATS_{"a":1}"#).unwrap(),
            Some("payload".to_string())
        );

        store.delete(r#"ns:entry:CATS_{"a":1}"#).unwrap();
        assert_eq!(store.read(r#"ns:entry:CATS_{"a":1}"#).unwrap(), None);
        store.delete(r#"ns:entry:CATS_{"a":1}"#).unwrap();
    }

    #[test]
    fn test_list_keys_recovers_original_keys() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path(), None).unwrap();

        store.write("ns:entry:A_1", "1").unwrap();
        store.write("ns:stats", "2").unwrap();
        store.write("other", "3").unwrap();
        // Stray files are ignored
        fs::write(tmp.path().join("README"), "not a record").unwrap();

        let mut keys = store.list_keys("ns:").unwrap();
        keys.sort();
        assert_eq!(keys, vec!["ns:entry:A_1".to_string(), "ns:stats".to_string()]);
    }

    #[test]
    fn test_quota() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path(), Some(10)).unwrap();

        store.write("a", "123456").unwrap();
        assert!(matches!(
            store.write("b", "123456"),
            Err(CacheError::QuotaExceeded { .. })
        ));
        // Overwriting the same key does not count its old size
        store.write("a", "1234567890").unwrap();
    }

    #[test]
    fn test_invalid_utf8_is_read_lossily() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path(), None).unwrap();

        fs::write(store.path_for("k"), [0xff, 0xfe]).unwrap();
        assert!(store.read("k").unwrap().is_some());
    }
}
