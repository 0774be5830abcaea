//! Adapter implementations for port traits.
//!
//! - `azure/`: Azure Blob Storage over REST
//! - `fs_font`: Font file on the local filesystem
//! - `memory`: In-process blob container for tests

pub mod azure;
pub mod fs_font;
#[cfg(test)]
pub mod memory;
