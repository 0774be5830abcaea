//! Unified error types for checkgen.

use thiserror::Error;

/// Errors that can occur while generating a check image.
///
/// Variants raised before persistence (`Font`, `Render`, `InvalidMessage`)
/// are fatal for an invocation. Persistence failures are reported through
/// [`crate::generator::GenerationReport`] instead of this type.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The font resource could not be loaded or parsed.
    #[error("Font error: {0}")]
    Font(String),

    /// The render task panicked or was cancelled.
    #[error("Render error: {0}")]
    Render(String),

    /// PNG encoding failed.
    #[error("Encode error: {0}")]
    Encode(#[from] image::ImageError),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Blob storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The inbound message could not be read from the invocation payload.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

/// Errors raised by a blob container.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage service returned an error response.
    #[error("Storage API error ({status} {code}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Service error code (`x-ms-error-code`), or empty.
        code: String,
        /// Response body or reason phrase.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The connection string is malformed or incomplete.
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// The account key is not valid base64.
    #[error("Invalid account key: {0}")]
    InvalidAccountKey(String),

    /// A computed header value was not valid.
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// A blob with the same name already exists in the container.
    #[error("Blob '{0}' already exists")]
    AlreadyExists(String),
}
