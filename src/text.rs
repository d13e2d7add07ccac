//! Bitmap glyph sheets for text overlay rendering.
//!
//! A sheet file stores one byte per pixel, row-major, 35x35 per glyph, with
//! `'Y'` marking lit pixels. Lowercase and uppercase sheets carry 26 glyphs
//! each, the digit sheet 10.

use std::fmt;
use std::path::Path;

/// Glyph masks are square, `GLYPH_SIZE` pixels per side.
pub const GLYPH_SIZE: usize = 35;

const GLYPH_PIXELS: usize = GLYPH_SIZE * GLYPH_SIZE;

/// Horizontal advance for letters, in pixels.
pub const LETTER_ADVANCE: i32 = 25;
/// Horizontal advance for digits, in pixels.
pub const DIGIT_ADVANCE: i32 = 20;
/// Per-character stride used by the line-wrap check.
pub const WRAP_STRIDE: i32 = 28;

/// Errors from glyph sheet parsing.
#[derive(Debug)]
pub enum GlyphError {
    /// A sheet buffer is not `glyphs * 35 * 35` bytes.
    SheetSize {
        sheet: &'static str,
        expected: usize,
        actual: usize,
    },
    Io(std::io::Error),
}

impl fmt::Display for GlyphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlyphError::SheetSize {
                sheet,
                expected,
                actual,
            } => write!(f, "{sheet} sheet is {actual} bytes, expected {expected}"),
            GlyphError::Io(e) => write!(f, "failed to read glyph sheet: {e}"),
        }
    }
}

impl std::error::Error for GlyphError {}

impl From<std::io::Error> for GlyphError {
    fn from(e: std::io::Error) -> Self {
        GlyphError::Io(e)
    }
}

/// Boolean pixel masks for the three renderable character classes.
pub struct GlyphSheet {
    lowercase: Vec<bool>,
    uppercase: Vec<bool>,
    digits: Vec<bool>,
}

impl GlyphSheet {
    /// Parse the three sheet buffers delivered by an external sheet loader.
    pub fn from_sheets(
        lowercase: &[u8],
        uppercase: &[u8],
        digits: &[u8],
    ) -> Result<Self, GlyphError> {
        Ok(Self {
            lowercase: parse_sheet("lowercase", lowercase, 26)?,
            uppercase: parse_sheet("uppercase", uppercase, 26)?,
            digits: parse_sheet("digit", digits, 10)?,
        })
    }

    /// Read the three sheet files from disk.
    pub fn from_files<P: AsRef<Path>>(
        lowercase: P,
        uppercase: P,
        digits: P,
    ) -> Result<Self, GlyphError> {
        let low = std::fs::read(lowercase)?;
        let up = std::fs::read(uppercase)?;
        let dig = std::fs::read(digits)?;
        Self::from_sheets(&low, &up, &dig)
    }

    /// Look up the mask and horizontal advance for a character.
    ///
    /// Returns `None` for characters outside the three renderable classes;
    /// the caller still advances the pen for those.
    pub fn glyph(&self, c: char) -> Option<(&[bool], i32)> {
        let (sheet, index, advance) = match c {
            'a'..='z' => (&self.lowercase, c as usize - 'a' as usize, LETTER_ADVANCE),
            'A'..='Z' => (&self.uppercase, c as usize - 'A' as usize, LETTER_ADVANCE),
            '0'..='9' => (&self.digits, c as usize - '0' as usize, DIGIT_ADVANCE),
            _ => return None,
        };
        Some((
            &sheet[index * GLYPH_PIXELS..(index + 1) * GLYPH_PIXELS],
            advance,
        ))
    }
}

fn parse_sheet(name: &'static str, bytes: &[u8], glyphs: usize) -> Result<Vec<bool>, GlyphError> {
    let expected = glyphs * GLYPH_PIXELS;
    if bytes.len() != expected {
        return Err(GlyphError::SheetSize {
            sheet: name,
            expected,
            actual: bytes.len(),
        });
    }
    Ok(bytes.iter().map(|&b| b == b'Y').collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_sheets() -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        (
            vec![b'.'; 26 * GLYPH_PIXELS],
            vec![b'.'; 26 * GLYPH_PIXELS],
            vec![b'.'; 10 * GLYPH_PIXELS],
        )
    }

    #[test]
    fn rejects_truncated_sheet() {
        let (low, up, _) = blank_sheets();
        let result = GlyphSheet::from_sheets(&low, &up, &[0u8; 100]);
        assert!(matches!(
            result,
            Err(GlyphError::SheetSize { sheet: "digit", .. })
        ));
    }

    #[test]
    fn y_bytes_become_lit_pixels() {
        let (mut low, up, dig) = blank_sheets();
        // Light the first pixel of 'b' (glyph index 1).
        low[GLYPH_PIXELS] = b'Y';
        let sheet = GlyphSheet::from_sheets(&low, &up, &dig).unwrap();
        let (mask, advance) = sheet.glyph('b').unwrap();
        assert!(mask[0]);
        assert!(!mask[1]);
        assert_eq!(advance, LETTER_ADVANCE);
    }

    #[test]
    fn digits_use_digit_advance() {
        let (low, up, dig) = blank_sheets();
        let sheet = GlyphSheet::from_sheets(&low, &up, &dig).unwrap();
        let (_, advance) = sheet.glyph('7').unwrap();
        assert_eq!(advance, DIGIT_ADVANCE);
    }

    #[test]
    fn unknown_characters_have_no_glyph() {
        let (low, up, dig) = blank_sheets();
        let sheet = GlyphSheet::from_sheets(&low, &up, &dig).unwrap();
        assert!(sheet.glyph('!').is_none());
        assert!(sheet.glyph(' ').is_none());
    }
}
