//! Port for binary image storage.

use async_trait::async_trait;

use crate::domain::ImagePath;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// The path does not name a file below the store root.
        InvalidPath { path: String } => "invalid image path: {path}",
        /// Reading or writing the backing store failed.
        Io { message: String } => "image store i/o failed: {message}",
    }
}

/// Content store keyed by [`ImagePath`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Write `content` at `path`, creating parent directories. Writing the
    /// same content twice is harmless.
    async fn store(&self, path: &ImagePath, content: &[u8]) -> Result<(), ImageStoreError>;

    /// Read the file at `path`, or `None` when it does not exist.
    async fn read(&self, path: &ImagePath) -> Result<Option<Vec<u8>>, ImageStoreError>;

    /// Delete the file at `path`. Missing files are not an error.
    async fn remove(&self, path: &ImagePath) -> Result<(), ImageStoreError>;
}
