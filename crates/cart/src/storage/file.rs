//! JSON file-backed key-value store.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::{debug, info, instrument};

use super::{KeyValueStore, StorageError};

/// Key-value store persisted as one JSON object on local disk.
///
/// The whole map is loaded when the store is opened and rewritten on every
/// `set`, through a temporary file renamed over the original. A failed write
/// leaves both the file and the in-memory map at their previous value.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// A missing file is treated as an empty store; it is created on the
    /// first `set`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the file cannot be read or
    /// does not contain a JSON object of strings.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| unavailable(&path, "create directory for", &e))?;
        }

        let entries = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StorageError::Unavailable(format!(
                    "store file {} is not a JSON object of strings: {e}",
                    path.display()
                ))
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Store file not found, starting empty");
                BTreeMap::new()
            }
            Err(e) => return Err(unavailable(&path, "read", &e)),
        };

        info!(keys = entries.len(), "File store opened");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Temporary file written before being renamed over the store file.
    ///
    /// Appends to the full file name, so `cart.json` and `cart.yaml` in one
    /// directory never share a temporary file.
    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn write_file(&self, contents: &[u8]) -> io::Result<()> {
        let tmp = self.tmp_path();
        fs::write(&tmp, contents).await?;
        fs::rename(&tmp, &self.path).await
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        let needed = value.len();
        let previous = entries.insert(key.to_string(), value);

        let result = match serde_json::to_vec_pretty(&*entries) {
            Ok(contents) => self
                .write_file(&contents)
                .await
                .map_err(|e| write_error(&self.path, key, needed, &e)),
            Err(e) => Err(StorageError::Unavailable(format!(
                "failed to encode store file: {e}"
            ))),
        };

        if result.is_err() {
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
        } else {
            debug!("Value written to disk");
        }

        result
    }
}

/// Map a failed write of `needed` bytes for `key` to a storage error.
///
/// A full disk becomes [`StorageError::Full`]; the free space is not known.
fn write_error(path: &Path, key: &str, needed: usize, err: &io::Error) -> StorageError {
    if err.kind() == io::ErrorKind::StorageFull {
        StorageError::Full {
            key: key.to_string(),
            needed,
            available: 0,
        }
    } else {
        unavailable(path, "write", err)
    }
}

fn unavailable(path: &Path, action: &str, err: &io::Error) -> StorageError {
    StorageError::Unavailable(format!("failed to {action} {}: {err}", path.display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store.json")).await.unwrap();
        assert_eq!(store.get("cart:products").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::open(&path).await.unwrap();
        store.set("a", "1".to_string()).await.unwrap();
        store.set("b", "[2]".to_string()).await.unwrap();
        store.set("a", "10".to_string()).await.unwrap();
        drop(store);

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("a").await.unwrap().as_deref(), Some("10"));
        assert_eq!(reopened.get("b").await.unwrap().as_deref(), Some("[2]"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileStore::open(&path).await.unwrap();
        store.set("k", "old".to_string()).await.unwrap();

        // A directory where the temporary file should go makes the write fail.
        std::fs::create_dir(dir.path().join("store.json.tmp")).unwrap();

        let err = store.set("k", "new".to_string()).await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_sibling_stores_use_separate_tmp_files() {
        let dir = tempfile::tempdir().unwrap();
        let json = FileStore::open(dir.path().join("cart.json")).await.unwrap();
        let yaml = FileStore::open(dir.path().join("cart.yaml")).await.unwrap();

        assert_eq!(json.tmp_path(), dir.path().join("cart.json.tmp"));
        assert_ne!(json.tmp_path(), yaml.tmp_path());

        // A blocked temporary file for one store does not affect the other.
        std::fs::create_dir(dir.path().join("cart.yaml.tmp")).unwrap();
        json.set("k", "v".to_string()).await.unwrap();
        assert!(yaml.set("k", "v".to_string()).await.is_err());
    }

    #[test]
    fn test_write_error_maps_full_disk() {
        let path = Path::new("/data/cart.json");
        let full = io::Error::from(io::ErrorKind::StorageFull);

        let err = write_error(path, "cart:products", 128, &full);
        assert!(matches!(
            err,
            StorageError::Full { ref key, needed: 128, available: 0 } if key == "cart:products"
        ));

        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        let err = write_error(path, "cart:products", 128, &denied);
        assert!(matches!(
            err,
            StorageError::Unavailable(ref msg) if msg.contains("/data/cart.json")
        ));
    }
}
