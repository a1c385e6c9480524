//! Directory-backed key-value store.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::warn;

use super::KeyValueStore;

const LOCK_FILE: &str = ".lock";

/// Key-value store keeping one file per key inside a directory.
///
/// Writes go to a temporary file renamed into place while holding an
/// exclusive lock on `<dir>/.lock`, so concurrent processes never read a
/// half-written value. The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `key`. Characters outside `[A-Za-z0-9_-]` map to `_`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(name)
    }

    fn try_set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.dir.join(LOCK_FILE))?;
        lock.lock_exclusive()?;

        let path = self.path_for(key);
        let result = write_atomic(&path, value);
        FileExt::unlock(&lock)?;
        result
    }
}

fn write_atomic(path: &Path, value: &str) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    {
        let mut file = File::create(&tmp)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Some(value),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read stored value");
                None
            }
        }
    }

    fn set(&self, key: &str, value: String) {
        if let Err(err) = self.try_set(key, &value) {
            warn!(key, dir = %self.dir.display(), error = %err, "failed to store value");
        }
    }

    fn remove(&self, key: &str) {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to remove stored value");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn absent_key_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("cart"), None);
        store.remove("cart");
    }

    #[test]
    fn set_get_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        store.set("cart", r#"{"a":1}"#.to_string());
        assert_eq!(store.get("cart").as_deref(), Some(r#"{"a":1}"#));

        store.set("cart", "{}".to_string());
        assert_eq!(store.get("cart").as_deref(), Some("{}"));

        store.remove("cart");
        assert_eq!(store.get("cart"), None);
    }

    #[test]
    fn keys_are_sanitized_into_file_names() {
        let store = FileStore::new("/data");
        assert_eq!(store.path_for("../etc/passwd"), PathBuf::from("/data/___etc_passwd"));
        assert_eq!(store.path_for("authToken"), PathBuf::from("/data/authToken"));
    }
}
