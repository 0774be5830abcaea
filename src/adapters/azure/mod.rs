//! Azure Blob Storage adapter.
//!
//! - `connection`: connection string parsing
//! - `shared_key`: Shared Key request signing
//! - `container`: the `BlobContainer` implementation

pub mod connection;
pub mod container;
pub mod shared_key;

pub use connection::StorageAccount;
pub use container::AzureBlobContainer;
