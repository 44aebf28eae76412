//! Slide rasterizer: text in, 1080×1080 JPEG out.

pub mod font;
pub mod layout;

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use crate::deck::SlideStyle;
use crate::error::SlideError;

pub use font::FontBook;
pub use layout::CANVAS_SIZE;

/// JPEG quality used for every exported slide.
pub const JPEG_QUALITY: u8 = 95;

/// Draw one slide. Blank text yields a plain background fill.
#[must_use]
pub fn render_slide(text: &str, style: &SlideStyle, fonts: &FontBook) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, style.background.to_pixel());
    if text.trim().is_empty() {
        return canvas;
    }

    let face = fonts.face(style.bold);
    let block = layout::layout(text, style.font_size, face);
    let color = style.foreground.to_pixel();
    let center_x = CANVAS_SIZE as f32 / 2.0;

    for (i, line) in block.lines.iter().enumerate() {
        let center_y = block.first_center_y + i as f32 * block.line_height;
        face.draw_line(&mut canvas, line, block.font_size as f32, center_x, center_y, color);
    }
    canvas
}

/// Encode a rendered slide as JPEG.
///
/// # Errors
///
/// Returns an error if the encoder fails.
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, SlideError> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
        .encode_image(image)
        .map_err(|e| SlideError::ImageEncoding(format!("Failed to encode JPEG: {e}")))?;
    Ok(buf)
}

/// Render and encode in one step.
///
/// # Errors
///
/// Returns an error if the encoder fails.
pub fn render_jpeg(
    text: &str,
    style: &SlideStyle,
    fonts: &FontBook,
) -> Result<Vec<u8>, SlideError> {
    encode_jpeg(&render_slide(text, style, fonts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn style(bold: bool) -> SlideStyle {
        SlideStyle {
            background: Color::rgb(0xFF, 0xE4, 0xE1),
            foreground: Color::rgb(0x1a, 0x1a, 0x1a),
            font_size: 48,
            bold,
        }
    }

    fn ink(image: &RgbImage, style: &SlideStyle) -> usize {
        let bg = style.background.to_pixel();
        image.pixels().filter(|p| **p != bg).count()
    }

    #[test]
    fn blank_text_is_background_only() {
        let fonts = FontBook::builtin();
        for text in ["", "   ", "\t \n"] {
            for (bg, fg) in [
                (Color::rgb(0, 0, 0), Color::rgb(255, 255, 255)),
                (Color::rgb(12, 200, 99), Color::rgb(12, 200, 98)),
            ] {
                let s = SlideStyle { background: bg, foreground: fg, font_size: 60, bold: true };
                let image = render_slide(text, &s, &fonts);
                assert_eq!(image.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
                assert!(image.pixels().all(|p| *p == bg.to_pixel()));
            }
        }
    }

    #[test]
    fn text_leaves_ink_within_padding() {
        let fonts = FontBook::builtin();
        let s = style(false);
        let image = render_slide("Ciao mondo", &s, &fonts);
        assert!(ink(&image, &s) > 0);

        let inset = layout::padding() as u32;
        for (x, y, p) in image.enumerate_pixels() {
            if *p != s.background.to_pixel() {
                assert!(x >= inset && x < CANVAS_SIZE - inset, "ink at x={x}");
                assert!(y >= inset && y < CANVAS_SIZE - inset, "ink at y={y}");
            }
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let fonts = FontBook::builtin();
        let s = style(true);
        let text = "Il lunedì è solo un giorno come un altro, ma con più caffè";
        let a = render_slide(text, &s, &fonts);
        let b = render_slide(text, &s, &fonts);
        assert_eq!(a.as_raw(), b.as_raw());
        assert_eq!(render_jpeg(text, &s, &fonts).unwrap(), render_jpeg(text, &s, &fonts).unwrap());
    }

    #[test]
    fn bold_lays_down_more_ink() {
        let fonts = FontBook::builtin();
        let regular = render_slide("weekend", &style(false), &fonts);
        let bold = render_slide("weekend", &style(true), &fonts);
        assert!(ink(&bold, &style(true)) > ink(&regular, &style(false)));
    }

    #[test]
    fn long_text_still_fits_vertically() {
        let fonts = FontBook::builtin();
        let s = SlideStyle { font_size: 120, ..style(false) };
        let text = vec!["parola"; 120].join(" ");
        let image = render_slide(&text, &s, &fonts);

        let inset = layout::padding() as u32;
        for (_, y, p) in image.enumerate_pixels() {
            if *p != s.background.to_pixel() {
                assert!(y >= inset && y < CANVAS_SIZE - inset, "ink at y={y}");
            }
        }
    }

    fn outline_book() -> FontBook {
        let font = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("test_fixtures/fonts/DejaVuSans.ttf");
        FontBook::load(Some(&font), None).unwrap()
    }

    #[test]
    fn outline_text_stays_within_padding() {
        let fonts = outline_book();
        let s = SlideStyle { font_size: 72, ..style(false) };
        let text = "Il caffè della mattina non si discute, si beve e basta";
        let image = render_slide(text, &s, &fonts);
        assert!(ink(&image, &s) > 0);

        let inset = layout::padding() as u32;
        for (x, y, p) in image.enumerate_pixels() {
            if *p != s.background.to_pixel() {
                assert!(x >= inset && x < CANVAS_SIZE - inset, "ink at x={x}");
                assert!(y >= inset && y < CANVAS_SIZE - inset, "ink at y={y}");
            }
        }
    }

    #[test]
    fn outline_rendering_is_deterministic() {
        let fonts = outline_book();
        let s = style(true);
        let text = "Venerdì, finalmente";
        let a = render_slide(text, &s, &fonts);
        let b = render_slide(text, &s, &fonts);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn jpeg_output_decodes_to_full_canvas() {
        let fonts = FontBook::builtin();
        let bytes = render_jpeg("hello", &style(false), &fonts).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), CANVAS_SIZE);
        assert_eq!(decoded.height(), CANVAS_SIZE);
    }
}
