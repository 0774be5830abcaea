//! Font file read from the local filesystem.

use std::path::PathBuf;

use crate::error::CheckError;
use crate::ports::FontSource;

/// Default location of the bundled display font, relative to the working
/// directory of the process.
pub const DEFAULT_FONT_PATH: &str = "fonts/DejaVuSerif-BoldItalic.ttf";

/// Reads the font from a path on disk.
#[derive(Debug, Clone)]
pub struct FileFontSource {
    path: PathBuf,
}

impl FileFontSource {
    /// Create a font source for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FontSource for FileFontSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load_bytes(&self) -> Result<Vec<u8>, CheckError> {
        std::fs::read(&self.path)
            .map_err(|e| CheckError::Font(format!("Failed to read font {}: {e}", self.describe())))
    }
}
