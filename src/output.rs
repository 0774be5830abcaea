//! Artifact naming, PNG encoding and the local folder sink.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use image::{ImageFormat, RgbaImage};

use crate::error::CheckError;

/// Timestamp pattern for artifact names. The hour field is 12-hour with no
/// AM/PM marker, so 02:00 and 14:00 produce the same name.
const ARTIFACT_TIME_FORMAT: &str = "%Y-%m-%d-%I-%M-%S";

/// Build the artifact name for a check completed at `at`.
#[must_use]
pub fn artifact_name(at: DateTime<Utc>) -> String {
    format!("{}.png", at.format(ARTIFACT_TIME_FORMAT))
}

/// Encode the canvas as PNG bytes.
///
/// # Errors
///
/// Returns an error if the encoder fails.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CheckError> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Write `png` as `file_name` inside `folder`, creating the folder if needed.
///
/// An existing file with the same name is replaced.
///
/// # Errors
///
/// Returns an error if the folder cannot be created or the file written.
pub async fn write_local(
    folder: &Path,
    file_name: &str,
    png: &[u8],
) -> Result<PathBuf, CheckError> {
    tokio::fs::create_dir_all(folder).await?;
    let path = folder.join(file_name);
    tokio::fs::write(&path, png).await?;
    Ok(path)
}
