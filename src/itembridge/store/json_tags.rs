use super::TagStore;
use crate::error::{BridgeError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

const TAGS_FILENAME: &str = "tags.json";
const LOCK_FILENAME: &str = "tags.lock";

/// Tag store backed by a single `tags.json` in a directory that several
/// processes can reach.
///
/// Every call re-reads the file, so writes made by another process are seen
/// on the next call. Writes go to a uniquely named temporary file that is
/// then renamed over `tags.json`: readers see either the old or the new map,
/// never a partial one.
///
/// Read-modify-write cycles hold an exclusive advisory lock on `tags.lock`
/// next to the map, so writers in different processes take turns and an
/// update to one key never drops a concurrent update to another. Processes
/// that write `tags.json` without taking the lock are not covered.
pub struct JsonTagStore {
    dir: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonTagStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            write_lock: Mutex::new(()),
        }
    }

    pub fn file_path(&self) -> PathBuf {
        self.dir.join(TAGS_FILENAME)
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILENAME)
    }

    /// Runs `update` on the current map while holding both locks, and saves
    /// the map when `update` reports a change.
    fn modify<F>(&self, update: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _guard = self.write_lock.lock();
        ensure_dir(&self.dir)?;
        let lock_file = open_lock_file(&self.lock_path())?;
        lock_file.lock().map_err(BridgeError::Io)?;

        let result = self.load().and_then(|mut tags| {
            if update(&mut tags) {
                self.save(&tags)
            } else {
                Ok(())
            }
        });

        if let Err(e) = lock_file.unlock() {
            warn!(target: "itembridge::tags", error = %e, "could not release tag lock");
        }
        result
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let tags_file = self.file_path();
        if !tags_file.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(tags_file).map_err(BridgeError::Io)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        let tags = serde_json::from_str(&content).map_err(BridgeError::Serialization)?;
        Ok(tags)
    }

    fn save(&self, tags: &BTreeMap<String, String>) -> Result<()> {
        ensure_dir(&self.dir)?;
        let content = serde_json::to_string_pretty(tags).map_err(BridgeError::Serialization)?;

        // Atomic write
        let tmp_file = self.dir.join(format!(".tags-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(BridgeError::Io)?;
        if let Err(e) = fs::rename(&tmp_file, self.file_path()) {
            let _ = fs::remove_file(&tmp_file);
            return Err(BridgeError::Io(e));
        }
        Ok(())
    }
}

fn open_lock_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .map_err(BridgeError::Io)
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(BridgeError::Io)?;
    }
    Ok(())
}

impl TagStore for JsonTagStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let tags = self.load()?;
        match tags.get(key) {
            Some(encoded) => {
                let bytes = STANDARD
                    .decode(encoded)
                    .map_err(|e| BridgeError::Store(format!("corrupt tag for {}: {}", key, e)))?;
                Ok(Some(bytes).filter(|b| !b.is_empty()))
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: Option<&[u8]>) -> Result<()> {
        let Some(bytes) = value.filter(|b| !b.is_empty()) else {
            return self.remove(key);
        };
        let encoded = STANDARD.encode(bytes);
        self.modify(|tags| {
            tags.insert(key.to_string(), encoded);
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.file_path().exists() {
            return Ok(());
        }
        self.modify(|tags| tags.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonTagStore::new(dir.path().join("shared"));
        assert_eq!(store.get("a.jpg").unwrap(), None);
        // Removing from an empty store writes nothing.
        store.remove("a.jpg").unwrap();
        assert!(!store.file_path().exists());
    }

    #[test]
    fn values_are_base64_on_disk() {
        let dir = TempDir::new().unwrap();
        let store = JsonTagStore::new(dir.path().to_path_buf());
        store.set("a/b.jpg", Some(&[0xff, 0x00, 0x10])).unwrap();

        let raw = fs::read_to_string(store.file_path()).unwrap();
        let parsed: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.get("a/b.jpg").map(String::as_str), Some("/wAQ"));
        assert_eq!(store.get("a/b.jpg").unwrap(), Some(vec![0xff, 0x00, 0x10]));
    }

    #[test]
    fn empty_value_removes_key() {
        let dir = TempDir::new().unwrap();
        let store = JsonTagStore::new(dir.path().to_path_buf());
        store.set("k", Some(b"v")).unwrap();
        store.set("k", Some(b"")).unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", Some(b"v")).unwrap();
        store.set("k", None).unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn writes_from_another_handle_are_visible() {
        let dir = TempDir::new().unwrap();
        let host = JsonTagStore::new(dir.path().to_path_buf());
        let app = JsonTagStore::new(dir.path().to_path_buf());
        app.set("scan.jpg", Some(b"red")).unwrap();
        assert_eq!(host.get("scan.jpg").unwrap(), Some(b"red".to_vec()));
    }

    #[test]
    fn no_tmp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = JsonTagStore::new(dir.path().to_path_buf());
        store.set("a", Some(b"1")).unwrap();
        store.set("b", Some(b"2")).unwrap();
        store.remove("a").unwrap();
        for entry in fs::read_dir(dir.path()).unwrap() {
            let name = entry.unwrap().file_name().into_string().unwrap();
            assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
        }
    }

    #[test]
    fn separate_handles_never_drop_each_others_keys() {
        // Each handle has its own in-process mutex, like two processes would.
        let dir = TempDir::new().unwrap();
        let first = JsonTagStore::new(dir.path().to_path_buf());
        let second = JsonTagStore::new(dir.path().to_path_buf());

        std::thread::scope(|s| {
            for (name, store) in [("first", &first), ("second", &second)] {
                for worker in 0..3 {
                    s.spawn(move || {
                        for i in 0..10 {
                            let key = format!("{}/{}/{}.jpg", name, worker, i);
                            store.set(&key, Some(b"x")).unwrap();
                        }
                    });
                }
            }
        });

        let raw = fs::read_to_string(first.file_path()).unwrap();
        let parsed: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 60);
        assert!(dir.path().join(LOCK_FILENAME).exists());
    }

    #[test]
    fn corrupt_value_is_a_store_error() {
        let dir = TempDir::new().unwrap();
        let store = JsonTagStore::new(dir.path().to_path_buf());
        fs::write(store.file_path(), r#"{"a": "not base64!"}"#).unwrap();
        assert!(matches!(store.get("a"), Err(BridgeError::Store(_))));
    }
}
