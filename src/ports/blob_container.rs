//! Blob container port for remote artifact storage.

use std::future::Future;
use std::pin::Pin;

use crate::error::StorageError;

/// Result of a "create if absent" call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerCreation {
    /// The container did not exist and was created.
    Created,
    /// The container already existed; nothing changed.
    AlreadyExists,
}

/// Metadata returned by the storage service for an uploaded blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobContentInfo {
    /// Entity tag of the new blob.
    pub etag: Option<String>,
    /// `Last-Modified` header as sent by the service.
    pub last_modified: Option<String>,
    /// Storage-assigned sequence number. Only page blobs carry one.
    pub sequence_number: Option<i64>,
}

/// Boxed future type returned by [`BlobContainer`] operations.
pub type BlobFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// A named container of blobs in a remote storage service.
pub trait BlobContainer: Send + Sync {
    /// Container name.
    fn name(&self) -> &str;

    /// Create the container unless it already exists.
    fn create_if_not_exists(&self) -> BlobFuture<'_, ContainerCreation>;

    /// Upload `data` as a new blob called `blob_name`.
    ///
    /// Never overwrites: an existing blob yields [`StorageError::AlreadyExists`].
    fn upload_blob(&self, blob_name: &str, data: Vec<u8>) -> BlobFuture<'_, BlobContentInfo>;
}
