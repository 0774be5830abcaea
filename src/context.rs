//! Service context that bundles all port trait objects.

use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::azure::{AzureBlobContainer, StorageAccount};
use crate::adapters::fs_font::FileFontSource;
use crate::config::{Config, STORAGE_CONNECTION_ENV};
use crate::error::CheckError;
use crate::generator::CheckGenerator;
use crate::ports::{BlobContainer, FontSource};

/// Bundles all port trait objects into a single context.
pub struct ServiceContext {
    /// Font source port.
    pub font: Box<dyn FontSource>,
    /// Blob container port.
    pub container: Arc<dyn BlobContainer>,
    /// Local sink folder, when the local sink is enabled.
    pub local_folder: Option<PathBuf>,
}

impl ServiceContext {
    /// Create a live context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no storage connection is configured, the
    /// connection string is invalid, or the working directory is unknown.
    pub fn live(config: &Config) -> Result<Self, CheckError> {
        let conn = config.storage.connection_string.as_deref().ok_or_else(|| {
            CheckError::Config(format!(
                "No storage connection. Set {STORAGE_CONNECTION_ENV} or [storage] connection_string."
            ))
        })?;
        let account = StorageAccount::from_connection_string(conn)?;
        let container = AzureBlobContainer::new(account, config.storage.container.clone());

        let local_folder = if config.local.enabled { Some(config.local_folder()?) } else { None };

        Ok(Self {
            font: Box::new(FileFontSource::new(config.render.font_path.clone())),
            container: Arc::new(container),
            local_folder,
        })
    }

    /// Load the font and build the generator.
    ///
    /// # Errors
    ///
    /// Returns an error if the font cannot be loaded.
    pub fn into_generator(self) -> Result<CheckGenerator, CheckError> {
        CheckGenerator::new(self.font.as_ref(), self.container, self.local_folder)
    }
}
