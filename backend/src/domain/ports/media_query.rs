//! Driving port for serving stored images.

use async_trait::async_trait;

use crate::domain::{Caller, Error, ImagePath};

/// Read access to uploaded media, limited to the caller's own files.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaQuery: Send + Sync {
    /// Bytes stored at `path`, or `None` when nothing is stored there or the
    /// path belongs to another account.
    async fn fetch(&self, caller: &Caller, path: &ImagePath)
    -> Result<Option<Vec<u8>>, Error>;
}
