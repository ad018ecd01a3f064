//! Blob storage abstraction.
//!
//! The analysis core only needs "fetch raw bytes by key". Storage backends
//! are injected through [`BlobStore`] so no SDK leaks into the pipeline.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

/// Errors that can occur during blob store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("blob not found: {0}")]
    NotFound(String),
    #[error("invalid blob key: {0}")]
    InvalidKey(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Trait for blob storage backends.
///
/// Implementations must be shareable across request handlers.
pub trait BlobStore: Send + Sync {
    /// Fetches the bytes stored under `key`.
    fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Stores `bytes` under `key`, replacing any existing blob.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Removes the blob stored under `key`.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Rejects empty keys and keys that could escape a storage root.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let bad = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\', '\0'])
        || key.starts_with('.');
    if bad {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// In-memory store used by tests and the default server.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("memory store lock poisoned".to_string())
}

impl BlobStore for MemoryStore {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        validate_key(key)?;
        let blobs = self.blobs.read().map_err(|_| poisoned())?;
        blobs
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut blobs = self.blobs.write().map_err(|_| poisoned())?;
        blobs.insert(key.to_string(), bytes.to_vec());
        tracing::debug!(key, bytes = bytes.len(), "Stored blob in memory");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut blobs = self.blobs.write().map_err(|_| poisoned())?;
        blobs
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}

/// Stores each blob as a file directly under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        tracing::info!(root = %root.display(), "Opened directory store");
        Ok(Self { root })
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

fn not_found_or_io(key: &str, err: std::io::Error) -> StoreError {
    if err.kind() == std::io::ErrorKind::NotFound {
        StoreError::NotFound(key.to_string())
    } else {
        StoreError::Io(err)
    }
}

impl BlobStore for DirectoryStore {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(key)?;
        std::fs::read(path).map_err(|e| not_found_or_io(key, e))
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        std::fs::write(&path, bytes)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Stored blob");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        std::fs::remove_file(path).map_err(|e| not_found_or_io(key, e))
    }
}

/// Read-only store backed by a fetch closure.
///
/// Lets callers hand the analyzer any "bytes by key" capability without
/// implementing the full trait.
pub struct FetchFn<F>(pub F);

impl<F> BlobStore for FetchFn<F>
where
    F: Fn(&str) -> Result<Vec<u8>, StoreError> + Send + Sync,
{
    fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        (self.0)(key)
    }

    fn put(&self, key: &str, _bytes: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::Backend(format!("read-only source, cannot store {key}")))
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend(format!("read-only source, cannot delete {key}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_lifecycle() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.put("photo.png", b"abc").unwrap();
        assert_eq!(store.fetch("photo.png").unwrap(), b"abc");
        assert_eq!(store.len(), 1);

        store.delete("photo.png").unwrap();
        assert!(matches!(
            store.fetch("photo.png"),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("photo.png"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_key_validation() {
        assert!(validate_key("upload-1700000000.png").is_ok());
        for bad in ["", "..", "../etc/passwd", "a/b", "a\\b", ".hidden"] {
            assert!(
                matches!(validate_key(bad), Err(StoreError::InvalidKey(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_directory_store_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::open(dir.path().join("blobs")).unwrap();

        store.put("image.bmp", &[1, 2, 3]).unwrap();
        assert!(store.root().join("image.bmp").exists());
        assert_eq!(store.fetch("image.bmp").unwrap(), vec![1, 2, 3]);

        store.delete("image.bmp").unwrap();
        assert!(matches!(
            store.fetch("image.bmp"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_directory_store_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::open(dir.path()).unwrap();

        assert!(matches!(
            store.put("../escape", b"x"),
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_fetch_fn_is_read_only() {
        let source = FetchFn(|key: &str| {
            if key == "known" {
                Ok(vec![9])
            } else {
                Err(StoreError::NotFound(key.to_string()))
            }
        });

        assert_eq!(source.fetch("known").unwrap(), vec![9]);
        assert!(source.fetch("other").is_err());
        assert!(matches!(source.put("known", &[]), Err(StoreError::Backend(_))));
    }
}
