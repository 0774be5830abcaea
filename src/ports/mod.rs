//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the check generator and an
//! external system. Implementations live in `src/adapters/`.

pub mod blob_container;
pub mod font_source;

pub use blob_container::{BlobContainer, BlobContentInfo, ContainerCreation};
pub use font_source::FontSource;
