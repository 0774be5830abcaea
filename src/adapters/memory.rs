//! In-process blob container.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::StorageError;
use crate::ports::blob_container::BlobFuture;
use crate::ports::{BlobContainer, BlobContentInfo, ContainerCreation};

/// Keeps blobs in memory. Optionally fails every upload with a fixed message.
#[derive(Default)]
pub struct MemoryBlobContainer {
    state: Mutex<State>,
    upload_failure: Option<String>,
}

#[derive(Default)]
struct State {
    create_calls: usize,
    exists: bool,
    blobs: BTreeMap<String, Vec<u8>>,
}

impl MemoryBlobContainer {
    /// A container whose uploads all fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self { upload_failure: Some(message.into()), ..Self::default() }
    }

    /// Stored blob contents, if any.
    pub fn blob(&self, name: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().blobs.get(name).cloned()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().blobs.len()
    }

    /// How many times `create_if_not_exists` was called.
    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }
}

impl BlobContainer for MemoryBlobContainer {
    fn name(&self) -> &str {
        "memory"
    }

    fn create_if_not_exists(&self) -> BlobFuture<'_, ContainerCreation> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.create_calls += 1;
            if state.exists {
                Ok(ContainerCreation::AlreadyExists)
            } else {
                state.exists = true;
                Ok(ContainerCreation::Created)
            }
        })
    }

    fn upload_blob(&self, blob_name: &str, data: Vec<u8>) -> BlobFuture<'_, BlobContentInfo> {
        let blob_name = blob_name.to_string();
        Box::pin(async move {
            if let Some(message) = &self.upload_failure {
                return Err(StorageError::Api {
                    status: 503,
                    code: "ServerBusy".into(),
                    message: message.clone(),
                });
            }
            let mut state = self.state.lock().unwrap();
            if state.blobs.contains_key(&blob_name) {
                return Err(StorageError::AlreadyExists(blob_name));
            }
            state.blobs.insert(blob_name, data);
            Ok(BlobContentInfo { etag: Some("\"memory\"".into()), ..BlobContentInfo::default() })
        })
    }
}
