//! Artifact storage.
//!
//! A finished list is handed to a [`ListStorage`] as compressed bytes
//! together with its rating image buffer. [`FsStorage`] lays artifacts out
//! as `<root>/<region code>/<language code>/dllist.bin`, the path the channel
//! server serves them from, with the images beside it in `ratings.bin`.
//!
//! The image file starts where the decompressed list ends: a rating record
//! with `jpeg_offset` `o` and `jpeg_size` `n` refers to bytes
//! `o - filesize .. o - filesize + n` of `ratings.bin`.

use dllist_core::error::{DllistError, Result};
use dllist_core::types::BuildTarget;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tracing::debug;

/// File name of every stored list.
pub const LIST_FILE_NAME: &str = "dllist.bin";

/// File name of the rating images stored beside each list.
pub const IMAGES_FILE_NAME: &str = "ratings.bin";

/// Root directory used when `DLLIST_OUTPUT_DIR` is unset.
pub const DEFAULT_OUTPUT_DIR: &str = "lists";

/// Future returned by [`ListStorage::store`].
pub type StorageFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// Destination for finished lists.
pub trait ListStorage: Send + Sync {
    /// Persist `list` as the list for `target`, with `images` as its rating
    /// image buffer, and return the list's location.
    ///
    /// A failed store must not leave a partial artifact behind.
    fn store<'a>(
        &'a self,
        target: &'a BuildTarget,
        list: &'a [u8],
        images: &'a [u8],
    ) -> StorageFuture<'a>;
}

/// Stores lists on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Store under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store under `DLLIST_OUTPUT_DIR`, or [`DEFAULT_OUTPUT_DIR`].
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("DLLIST_OUTPUT_DIR").unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.to_string()),
        )
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the list for `target` is written.
    pub fn path_for(&self, target: &BuildTarget) -> PathBuf {
        self.target_dir(target).join(LIST_FILE_NAME)
    }

    /// Where the rating images for `target` are written.
    pub fn images_path_for(&self, target: &BuildTarget) -> PathBuf {
        self.target_dir(target).join(IMAGES_FILE_NAME)
    }

    fn target_dir(&self, target: &BuildTarget) -> PathBuf {
        self.root
            .join(target.region.code().to_string())
            .join(target.language.code().to_string())
    }

    async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("bin.tmp");
        let written = match tokio::fs::write(&tmp, bytes).await {
            Ok(()) => tokio::fs::rename(&tmp, path).await,
            Err(e) => Err(e),
        };
        if written.is_err() {
            let _ = tokio::fs::remove_file(&tmp).await;
        }
        written
    }

    async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
        Self::write_atomic(path, bytes)
            .await
            .map_err(|e| DllistError::Storage {
                path: path.to_path_buf(),
                cause: e.to_string(),
            })
    }
}

impl ListStorage for FsStorage {
    fn store<'a>(
        &'a self,
        target: &'a BuildTarget,
        list: &'a [u8],
        images: &'a [u8],
    ) -> StorageFuture<'a> {
        Box::pin(async move {
            // Images first so a visible list never points past its images.
            let images_path = self.images_path_for(target);
            Self::write_file(&images_path, images).await?;

            let path = self.path_for(target);
            Self::write_file(&path, list).await?;

            debug!(
                path = %path.display(),
                bytes = list.len(),
                image_bytes = images.len(),
                "Stored list"
            );
            Ok(path.display().to_string())
        })
    }
}

#[derive(Debug)]
struct StoredList {
    list: Vec<u8>,
    images: Vec<u8>,
}

/// Keeps lists in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    artifacts: RwLock<HashMap<BuildTarget, StoredList>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored bytes for `target`.
    pub fn get(&self, target: &BuildTarget) -> Option<Vec<u8>> {
        self.artifacts.read().get(target).map(|s| s.list.clone())
    }

    /// Stored rating images for `target`.
    pub fn images(&self, target: &BuildTarget) -> Option<Vec<u8>> {
        self.artifacts.read().get(target).map(|s| s.images.clone())
    }

    /// Whether a list was stored for `target`.
    pub fn contains(&self, target: &BuildTarget) -> bool {
        self.artifacts.read().contains_key(target)
    }

    /// Number of stored lists.
    pub fn len(&self) -> usize {
        self.artifacts.read().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.artifacts.read().is_empty()
    }
}

impl ListStorage for MemoryStorage {
    fn store<'a>(
        &'a self,
        target: &'a BuildTarget,
        list: &'a [u8],
        images: &'a [u8],
    ) -> StorageFuture<'a> {
        Box::pin(async move {
            self.artifacts.write().insert(
                *target,
                StoredList {
                    list: list.to_vec(),
                    images: images.to_vec(),
                },
            );
            Ok(format!(
                "memory://{}/{}",
                target.region.code(),
                target.language.code()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dllist_core::types::{Language, Region};

    #[tokio::test]
    async fn fs_layout_uses_codes() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path());
        let target = BuildTarget::new(Region::Pal, Language::Italian);

        let location = storage.store(&target, b"list", b"jpeg").await.unwrap();

        let expected = dir.path().join("2").join("5").join("dllist.bin");
        assert_eq!(location, expected.display().to_string());
        assert_eq!(std::fs::read(&expected).unwrap(), b"list");
        assert!(!expected.with_extension("bin.tmp").exists());

        let images = dir.path().join("2").join("5").join("ratings.bin");
        assert_eq!(storage.images_path_for(&target), images);
        assert_eq!(std::fs::read(&images).unwrap(), b"jpeg");
    }

    #[tokio::test]
    async fn fs_store_replaces_previous_list() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path());
        let target = BuildTarget::new(Region::Japan, Language::Japanese);

        storage.store(&target, b"old", b"").await.unwrap();
        storage.store(&target, b"new", b"").await.unwrap();
        assert_eq!(std::fs::read(storage.path_for(&target)).unwrap(), b"new");
    }

    #[tokio::test]
    async fn fs_store_failure_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the region directory should be.
        std::fs::write(dir.path().join("1"), b"").unwrap();
        let storage = FsStorage::new(dir.path());

        let err = storage
            .store(&BuildTarget::new(Region::Ntsc, Language::English), b"x", b"")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E401");
    }

    #[tokio::test]
    async fn failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path());
        let target = BuildTarget::new(Region::Pal, Language::Dutch);

        // A non-empty directory where the list file should go.
        let path = storage.path_for(&target);
        std::fs::create_dir_all(path.join("occupied")).unwrap();

        let err = storage.store(&target, b"list", b"").await.unwrap_err();
        assert_eq!(err.code(), "E401");
        assert!(!path.with_extension("bin.tmp").exists());
    }

    #[test]
    fn from_env_uses_output_dir_or_default() {
        let expected = std::env::var("DLLIST_OUTPUT_DIR")
            .unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.to_string());
        assert_eq!(FsStorage::from_env().root(), Path::new(&expected));
    }

    #[tokio::test]
    async fn memory_storage_keeps_bytes() {
        let storage = MemoryStorage::new();
        let target = BuildTarget::new(Region::Ntsc, Language::Spanish);
        assert!(storage.is_empty());

        let location = storage.store(&target, &[1, 2], &[3]).await.unwrap();
        assert_eq!(location, "memory://1/4");
        assert_eq!(storage.get(&target), Some(vec![1, 2]));
        assert_eq!(storage.images(&target), Some(vec![3]));
        assert!(storage.contains(&target));
        assert_eq!(storage.len(), 1);
    }
}
