//! Glyph faces used to measure and draw slide text.
//!
//! A [`FontBook`] holds an optional regular and bold outline font loaded from disk.
//! Whenever one is missing it falls back to a built-in 8×8 bitmap face, so a slide
//! can always be drawn, only less prettily.

use std::path::Path;

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};

use super::layout::Measure;
use crate::error::SlideError;

/// A typeface that can measure and draw a single line of text.
pub trait Face: Measure + Send + Sync {
    /// Draw `text` centered on (`center_x`, `center_y`).
    fn draw_line(
        &self,
        canvas: &mut RgbImage,
        text: &str,
        size: f32,
        center_x: f32,
        center_y: f32,
        color: Rgb<u8>,
    );
}

/// Horizontal advance of a bitmap glyph, in ems.
const BITMAP_ADVANCE: f32 = 0.6;

/// The built-in monospaced face, scaled up from 8×8 glyph cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapFace {
    bold: bool,
}

impl BitmapFace {
    /// Regular weight.
    #[must_use]
    pub const fn regular() -> Self {
        Self { bold: false }
    }

    /// Bold weight, drawn as a one-column double strike.
    #[must_use]
    pub const fn bold() -> Self {
        Self { bold: true }
    }

    fn glyph(&self, c: char) -> [u8; 8] {
        let c = ascii_stand_in(c);
        let rows = BASIC_FONTS
            .get(c)
            .or_else(|| LATIN_FONTS.get(c))
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);
        if self.bold {
            rows.map(|row| row | (row << 1))
        } else {
            rows
        }
    }
}

/// Map typographic punctuation the bitmap tables lack onto plain ASCII.
fn ascii_stand_in(c: char) -> char {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{00AB}' | '\u{00BB}' => '"',
        '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
        '\u{2026}' => '.',
        '\u{00A0}' | '\t' | '\n' | '\r' => ' ',
        other => other,
    }
}

impl Measure for BitmapFace {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * BITMAP_ADVANCE
    }
}

impl Face for BitmapFace {
    fn draw_line(
        &self,
        canvas: &mut RgbImage,
        text: &str,
        size: f32,
        center_x: f32,
        center_y: f32,
        color: Rgb<u8>,
    ) {
        let advance = size * BITMAP_ADVANCE;
        let cell_x = advance / 8.0;
        let cell_y = size / 8.0;
        let left = center_x - self.text_width(text, size) / 2.0;
        let top = center_y - size / 2.0;
        let (width, height) = (canvas.width() as i64, canvas.height() as i64);

        for (i, c) in text.chars().enumerate() {
            let rows = self.glyph(c);
            if rows == [0; 8] {
                continue;
            }
            let x0 = left + i as f32 * advance;
            let px_range = (x0.floor() as i64).max(0)..((x0 + advance).ceil() as i64).min(width);
            let py_range = (top.floor() as i64).max(0)..((top + size).ceil() as i64).min(height);

            for py in py_range {
                let row = ((py as f32 + 0.5 - top) / cell_y).floor();
                if !(0.0..8.0).contains(&row) {
                    continue;
                }
                let bits = rows[row as usize];
                for px in px_range.clone() {
                    let col = ((px as f32 + 0.5 - x0) / cell_x).floor();
                    if (0.0..8.0).contains(&col) && bits & (1 << col as u8) != 0 {
                        canvas.put_pixel(px as u32, py as u32, color);
                    }
                }
            }
        }
    }
}

/// A TrueType/OpenType face rendered with anti-aliasing.
pub struct OutlineFace {
    font: FontVec,
}

impl OutlineFace {
    /// Parse font bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not a usable font.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, String> {
        FontVec::try_from_vec(data).map(|font| Self { font }).map_err(|e| e.to_string())
    }

    /// Load a font file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        let data = std::fs::read(path)
            .map_err(|e| format!("Failed to read font {}: {e}", path.display()))?;
        Self::from_bytes(data).map_err(|e| format!("Failed to parse font {}: {e}", path.display()))
    }

    /// Scale for an em size of `size` pixels, as a CSS `px` font size means it.
    fn scale(&self, size: f32) -> PxScale {
        match self.font.units_per_em() {
            Some(upem) if upem > 0.0 => PxScale::from(size * self.font.height_unscaled() / upem),
            _ => PxScale::from(size),
        }
    }
}

impl Measure for OutlineFace {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        let scaled = self.font.as_scaled(self.scale(size));
        let mut width = 0.0;
        let mut previous = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }
}

impl Face for OutlineFace {
    fn draw_line(
        &self,
        canvas: &mut RgbImage,
        text: &str,
        size: f32,
        center_x: f32,
        center_y: f32,
        color: Rgb<u8>,
    ) {
        let scale = self.scale(size);
        let scaled = self.font.as_scaled(scale);
        // Middle of the ascent/descent box sits on center_y.
        let baseline = center_y + (scaled.ascent() + scaled.descent()) / 2.0;
        let mut caret = center_x - self.text_width(text, size) / 2.0;
        let (width, height) = (canvas.width() as i32, canvas.height() as i32);

        let mut previous = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled.h_advance(id);
            previous = Some(id);

            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i32 + gx as i32;
                let y = bounds.min.y as i32 + gy as i32;
                if x < 0 || y < 0 || x >= width || y >= height {
                    return;
                }
                let pixel = canvas.get_pixel_mut(x as u32, y as u32);
                *pixel = blend(*pixel, color, coverage.clamp(0.0, 1.0));
            });
        }
    }
}

fn blend(under: Rgb<u8>, over: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let mix = |a: u8, b: u8| (f32::from(a) * (1.0 - alpha) + f32::from(b) * alpha).round() as u8;
    Rgb([mix(under[0], over[0]), mix(under[1], over[1]), mix(under[2], over[2])])
}

/// Regular and bold faces for a render session.
pub struct FontBook {
    regular: Option<OutlineFace>,
    bold: Option<OutlineFace>,
    fallback_regular: BitmapFace,
    fallback_bold: BitmapFace,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FontBook {
    /// Only the built-in bitmap faces.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            regular: None,
            bold: None,
            fallback_regular: BitmapFace::regular(),
            fallback_bold: BitmapFace::bold(),
        }
    }

    /// Load outline fonts from disk. Either path may be absent.
    ///
    /// # Errors
    ///
    /// Returns an error if a given font file cannot be read or parsed.
    pub fn load(regular: Option<&Path>, bold: Option<&Path>) -> Result<Self, SlideError> {
        let load = |path: Option<&Path>| {
            path.map(OutlineFace::load).transpose().map_err(SlideError::Config)
        };
        let book = Self { regular: load(regular)?, bold: load(bold)?, ..Self::builtin() };
        tracing::debug!(
            regular = book.regular.is_some(),
            bold = book.bold.is_some(),
            "font book loaded"
        );
        Ok(book)
    }

    /// Whether any outline font was loaded.
    #[must_use]
    pub fn has_outline_fonts(&self) -> bool {
        self.regular.is_some() || self.bold.is_some()
    }

    /// The face to draw with. A missing bold font falls back to the regular outline
    /// font before falling back to the bitmap face.
    #[must_use]
    pub fn face(&self, bold: bool) -> &dyn Face {
        match (bold, &self.bold, &self.regular) {
            (true, Some(face), _) | (_, _, Some(face)) => face as &dyn Face,
            (true, None, None) => &self.fallback_bold,
            (false, _, None) => &self.fallback_regular,
        }
    }
}
