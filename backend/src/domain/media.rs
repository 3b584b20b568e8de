//! Image storage orchestration shared by the record services.
//!
//! A record update stages its image first, commits the record, and only then
//! discards the superseded file. If the record write fails the freshly staged
//! file is rolled back instead.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::ports::{ImageStore, ImageStoreError, MediaQuery};
use crate::domain::{AccountId, Caller, Error, ImageChange, ImageKind, ImagePath};

/// Outcome of staging an [`ImageChange`] against a record's current image.
#[derive(Debug, Default)]
#[must_use]
pub(crate) struct ImageSwap {
    next: Option<ImagePath>,
    fresh: Option<ImagePath>,
    stale: Option<ImagePath>,
}

impl ImageSwap {
    /// Image the record should reference after the write.
    pub(crate) fn next(&self) -> Option<ImagePath> {
        self.next.clone()
    }

    /// Record write succeeded: drop the superseded file.
    pub(crate) async fn commit<S: ImageStore + ?Sized>(self, store: &S) {
        if let Some(path) = self.stale {
            discard(store, &path).await;
        }
    }

    /// Record write failed: drop the file staged for it.
    pub(crate) async fn rollback<S: ImageStore + ?Sized>(self, store: &S) {
        if let Some(path) = self.fresh {
            discard(store, &path).await;
        }
    }
}

/// Write any replacement image and work out what the record should point at.
pub(crate) async fn stage_image<S: ImageStore + ?Sized>(
    store: &S,
    kind: ImageKind,
    owner: &AccountId,
    current: Option<&ImagePath>,
    change: ImageChange,
) -> Result<ImageSwap, Error> {
    match change {
        ImageChange::Keep => Ok(ImageSwap {
            next: current.cloned(),
            ..ImageSwap::default()
        }),
        ImageChange::Clear => Ok(ImageSwap {
            stale: current.cloned(),
            ..ImageSwap::default()
        }),
        ImageChange::Replace(upload) => {
            let path = upload.storage_path(kind, owner);
            store
                .store(&path, upload.content())
                .await
                .map_err(map_image_store_error)?;
            Ok(ImageSwap {
                next: Some(path.clone()),
                fresh: Some(path),
                stale: current.cloned(),
            })
        }
    }
}

/// Best-effort removal; failures are logged and otherwise ignored.
pub(crate) async fn discard<S: ImageStore + ?Sized>(store: &S, path: &ImagePath) {
    if let Err(error) = store.remove(path).await {
        warn!(%path, %error, "failed to remove image");
    }
}

pub(crate) fn map_image_store_error(error: ImageStoreError) -> Error {
    match error {
        ImageStoreError::InvalidPath { path } => {
            Error::internal(format!("invalid image path: {path}"))
        }
        ImageStoreError::Io { message } => Error::internal(format!("image store error: {message}")),
    }
}

/// Serves stored images read-only.
#[derive(Clone)]
pub struct MediaLibrary<S> {
    store: Arc<S>,
}

impl<S> MediaLibrary<S> {
    /// Wrap an image store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ImageStore> MediaQuery for MediaLibrary<S> {
    async fn fetch(
        &self,
        caller: &Caller,
        path: &ImagePath,
    ) -> Result<Option<Vec<u8>>, Error> {
        if path.owner().as_ref() != Some(caller.account_id()) {
            return Ok(None);
        }
        match self.store.read(path).await {
            Ok(content) => Ok(content),
            Err(ImageStoreError::InvalidPath { .. }) => Ok(None),
            Err(error) => Err(map_image_store_error(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ImageUpload;
    use crate::domain::ports::MockImageStore;
    use mockall::predicate::eq;

    fn gif(body: &[u8]) -> ImageUpload {
        let mut content = b"GIF89a".to_vec();
        content.extend_from_slice(body);
        ImageUpload::from_bytes(ImageKind::Plant, content).expect("gif")
    }

    #[tokio::test]
    async fn replace_stages_new_file_and_marks_old_stale() {
        let owner = AccountId::random();
        let upload = gif(b"new");
        let expected = upload.storage_path(ImageKind::Plant, &owner);
        let old = ImagePath::new("plants/x/old.gif");

        let mut store = MockImageStore::new();
        let staged = expected.clone();
        store
            .expect_store()
            .withf(move |path, _| *path == staged)
            .times(1)
            .return_once(|_, _| Ok(()));
        store
            .expect_remove()
            .with(eq(old.clone()))
            .times(1)
            .return_once(|_| Ok(()));

        let swap = stage_image(
            &store,
            ImageKind::Plant,
            &owner,
            Some(&old),
            ImageChange::Replace(upload),
        )
        .await
        .expect("staged");
        assert_eq!(swap.next(), Some(expected));
        swap.commit(&store).await;
    }

    #[tokio::test]
    async fn rollback_removes_only_the_fresh_file() {
        let owner = AccountId::random();
        let upload = gif(b"fresh");
        let fresh = upload.storage_path(ImageKind::Plant, &owner);

        let mut store = MockImageStore::new();
        store.expect_store().times(1).return_once(|_, _| Ok(()));
        store
            .expect_remove()
            .with(eq(fresh))
            .times(1)
            .return_once(|_| Ok(()));

        let swap = stage_image(
            &store,
            ImageKind::Plant,
            &owner,
            Some(&ImagePath::new("plants/x/kept.gif")),
            ImageChange::Replace(upload),
        )
        .await
        .expect("staged");
        swap.rollback(&store).await;
    }

    #[tokio::test]
    async fn reuploading_identical_content_gets_its_own_file() {
        let owner = AccountId::random();
        let current = gif(b"same").storage_path(ImageKind::Plant, &owner);
        let upload = gif(b"same");
        let replacement = upload.storage_path(ImageKind::Plant, &owner);
        assert_ne!(current, replacement);

        let mut store = MockImageStore::new();
        store
            .expect_store()
            .withf(move |path, _| *path == replacement)
            .times(1)
            .return_once(|_, _| Ok(()));
        store
            .expect_remove()
            .with(eq(current.clone()))
            .times(1)
            .return_once(|_| Ok(()));

        let swap = stage_image(
            &store,
            ImageKind::Plant,
            &owner,
            Some(&current),
            ImageChange::Replace(upload),
        )
        .await
        .expect("staged");
        swap.commit(&store).await;
    }

    #[tokio::test]
    async fn clear_drops_reference_and_tolerates_remove_failure() {
        let old = ImagePath::new("plants/x/old.gif");
        let mut store = MockImageStore::new();
        store
            .expect_remove()
            .times(1)
            .return_once(|_| Err(ImageStoreError::io("disk full")));

        let swap = stage_image(
            &store,
            ImageKind::Plant,
            &AccountId::random(),
            Some(&old),
            ImageChange::Clear,
        )
        .await
        .expect("staged");
        assert_eq!(swap.next(), None);
        swap.commit(&store).await;
    }

    fn caller() -> Caller {
        crate::inbound::http::test_utils::caller_for(
            &crate::domain::Email::parse("a@x.com").expect("email"),
        )
    }

    #[tokio::test]
    async fn media_library_hides_invalid_paths() {
        let caller = caller();
        let raw = format!("plants/{}/../x.gif", caller.account_id());
        let mut store = MockImageStore::new();
        let rejected = raw.clone();
        store
            .expect_read()
            .times(1)
            .return_once(move |_| Err(ImageStoreError::invalid_path(rejected)));
        let library = MediaLibrary::new(Arc::new(store));
        let found = library
            .fetch(&caller, &ImagePath::new(raw))
            .await
            .expect("lookup succeeds");
        assert!(found.is_none());
    }

    #[rstest::rstest]
    #[case("plants/00000000-0000-0000-0000-000000000000/a.gif")]
    #[case("../etc/passwd")]
    #[tokio::test]
    async fn media_library_never_reads_other_owners_files(#[case] raw: &str) {
        let mut store = MockImageStore::new();
        store.expect_read().never();
        let library = MediaLibrary::new(Arc::new(store));
        let found = library
            .fetch(&caller(), &ImagePath::new(raw))
            .await
            .expect("lookup succeeds");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn media_library_reads_the_callers_own_files() {
        let caller = caller();
        let path = ImagePath::new(format!("users/{}/me.png", caller.account_id()));
        let mut store = MockImageStore::new();
        store
            .expect_read()
            .with(eq(path.clone()))
            .times(1)
            .return_once(|_| Ok(Some(b"png".to_vec())));
        let library = MediaLibrary::new(Arc::new(store));
        let found = library.fetch(&caller, &path).await.expect("lookup succeeds");
        assert_eq!(found.as_deref(), Some(b"png".as_slice()));
    }
}
