//! Font source port for the display font used to draw amounts.

use ab_glyph::FontVec;

use crate::error::CheckError;

/// Supplies the font the check amount is drawn with.
pub trait FontSource: Send + Sync {
    /// Human-readable origin of the font, used in logs and errors.
    fn describe(&self) -> String;

    /// Load the raw font file bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the font resource is unavailable.
    fn load_bytes(&self) -> Result<Vec<u8>, CheckError>;

    /// Load and parse the font.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be loaded or are not a valid font.
    fn load(&self) -> Result<FontVec, CheckError> {
        let bytes = self.load_bytes()?;
        FontVec::try_from_vec(bytes)
            .map_err(|e| CheckError::Font(format!("Invalid font {}: {e}", self.describe())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticFont(Vec<u8>);

    impl FontSource for StaticFont {
        fn describe(&self) -> String {
            "static".into()
        }

        fn load_bytes(&self) -> Result<Vec<u8>, CheckError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn garbage_bytes_are_a_font_error() {
        let err = StaticFont(vec![0, 1, 2, 3]).load().unwrap_err();
        assert!(matches!(err, CheckError::Font(_)));
        assert!(err.to_string().contains("static"));
    }
}
