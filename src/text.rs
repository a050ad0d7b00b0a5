//! Text drawing onto a [`Canvas`] with fontdue.

use std::path::Path;

use fontdue::{Font, FontSettings};

use crate::canvas::{Canvas, Color};
use crate::error::FontError;

/// Rasterizes single lines of text with one loaded font.
pub struct TextPainter {
    font: Font,
}

impl TextPainter {
    /// Load a TTF/OTF font from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Load a font from in-memory TTF/OTF data.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FontError> {
        let font = Font::from_bytes(data, FontSettings::default()).map_err(FontError::Parse)?;
        Ok(Self { font })
    }

    /// Width in pixels of `text` at `size`.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        text.chars()
            .map(|ch| self.font.metrics(ch, size).advance_width)
            .sum()
    }

    /// Draw `text` with its top-left corner at (x, y). Returns the drawn width.
    pub fn draw(&self, canvas: &mut Canvas, text: &str, x: f32, y: f32, size: f32, color: Color) -> f32 {
        let mut cursor_x = x;
        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, size);

            let gx = cursor_x as i32 + metrics.xmin;
            let gy = y as i32 + (size as i32 - metrics.height as i32 - metrics.ymin);

            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let coverage = bitmap[row * metrics.width + col];
                    canvas.blend_pixel(gx + col as i32, gy + row as i32, color, coverage);
                }
            }

            cursor_x += metrics.advance_width;
        }
        cursor_x - x
    }

    /// Draw `text` horizontally centered on `center_x`.
    pub fn draw_centered(&self, canvas: &mut Canvas, text: &str, center_x: f32, y: f32, size: f32, color: Color) {
        let width = self.measure(text, size);
        self.draw(canvas, text, center_x - width / 2.0, y, size, color);
    }
}
