//! Filesystem image store rooted in a capability directory.
//!
//! Every path is resolved relative to the media root through `cap-std`, so
//! a crafted [`ImagePath`] cannot reach outside it; malformed paths are
//! rejected before any filesystem call.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use crate::domain::ImagePath;
use crate::domain::ports::{ImageStore, ImageStoreError};

/// [`ImageStore`] writing files below a media root directory.
#[derive(Clone)]
pub struct FsImageStore {
    root: Arc<Dir>,
}

impl FsImageStore {
    /// Open `root`, creating it when missing.
    ///
    /// # Errors
    /// Returns the I/O error when the directory cannot be created or opened.
    pub fn open(root: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            root: Arc::new(dir),
        })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, ImageStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> io::Result<T> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || op(&root))
            .await
            .map_err(|err| ImageStoreError::io(format!("image store task failed: {err}")))?
            .map_err(|err| ImageStoreError::io(err.to_string()))
    }
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Validate `path` and turn it into a relative filesystem path.
fn relative_path(path: &ImagePath) -> Result<PathBuf, ImageStoreError> {
    let raw = path.as_ref();
    if raw.split('/').all(is_safe_segment) {
        Ok(raw.split('/').collect())
    } else {
        Err(ImageStoreError::invalid_path(raw))
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn store(&self, path: &ImagePath, content: &[u8]) -> Result<(), ImageStoreError> {
        let relative = relative_path(path)?;
        let content = content.to_vec();
        debug!(path = %path, bytes = content.len(), "storing image");
        self.blocking(move |root| {
            if let Some(parent) = relative.parent().filter(|p| !p.as_os_str().is_empty()) {
                root.create_dir_all(parent)?;
            }
            root.write(&relative, content)
        })
        .await
    }

    async fn read(&self, path: &ImagePath) -> Result<Option<Vec<u8>>, ImageStoreError> {
        let relative = relative_path(path)?;
        self.blocking(move |root| match root.read(&relative) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        })
        .await
    }

    async fn remove(&self, path: &ImagePath) -> Result<(), ImageStoreError> {
        let relative = relative_path(path)?;
        self.blocking(move |root| match root.remove_file(&relative) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn media() -> (TempDir, FsImageStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FsImageStore::open(&dir.path().join("media")).expect("open store");
        (dir, store)
    }

    #[rstest]
    #[tokio::test]
    async fn stored_images_read_back_until_removed(media: (TempDir, FsImageStore)) {
        let (_dir, store) = media;
        let path = ImagePath::new("plants/owner-1/abc123.png");

        store.store(&path, b"png-bytes").await.expect("store");
        assert_eq!(
            store.read(&path).await.expect("read").as_deref(),
            Some(b"png-bytes".as_slice())
        );

        store.remove(&path).await.expect("remove");
        assert!(store.read(&path).await.expect("read").is_none());
        store.remove(&path).await.expect("removing twice is fine");
    }

    #[rstest]
    #[case("../escape.png")]
    #[case("plants/../../etc/passwd")]
    #[case("/absolute.png")]
    #[case("plants//double.png")]
    #[case("plants/with space.png")]
    #[case("plants\\windows.png")]
    #[case("")]
    #[tokio::test]
    async fn unsafe_paths_are_rejected(media: (TempDir, FsImageStore), #[case] raw: &str) {
        let (_dir, store) = media;
        let err = store
            .read(&ImagePath::new(raw))
            .await
            .expect_err("unsafe path");
        assert!(matches!(err, ImageStoreError::InvalidPath { .. }));
    }
}
