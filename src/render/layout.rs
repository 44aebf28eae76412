//! Greedy word wrap and shrink-to-fit for a square slide.

/// Side of the square canvas in pixels.
pub const CANVAS_SIZE: u32 = 1080;

/// Inset on every edge, as a fraction of the canvas side.
pub const PADDING_RATIO: f32 = 0.12;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_RATIO: f32 = 1.5;

/// Smallest size the shrink pass will go to. Lines that still do not fit are dropped.
pub const MIN_FONT_SIZE: u32 = 8;

/// Measures the rendered width of a run of text.
pub trait Measure {
    /// Width in pixels of `text` set at `size` pixels.
    fn text_width(&self, text: &str, size: f32) -> f32;
}

/// Inset in pixels on every edge.
#[must_use]
pub fn padding() -> f32 {
    CANVAS_SIZE as f32 * PADDING_RATIO
}

/// Room left for text along either axis once padding is removed.
#[must_use]
pub fn usable_extent() -> f32 {
    CANVAS_SIZE as f32 - 2.0 * padding()
}

/// Lines of a slide, sized and positioned.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    /// Lines in drawing order.
    pub lines: Vec<String>,
    /// Font size the lines are drawn at.
    pub font_size: u32,
    /// Distance between consecutive line centers.
    pub line_height: f32,
    /// Vertical center of the first line.
    pub first_center_y: f32,
}

impl TextBlock {
    /// Total block height.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }
}

/// Split `text` on single spaces and pack words into lines no wider than
/// `max_width`. A word that alone exceeds the width gets its own line.
pub fn wrap_words<M: Measure + ?Sized>(
    text: &str,
    size: f32,
    max_width: f32,
    measure: &M,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        let candidate =
            if current.is_empty() { word.to_string() } else { format!("{current} {word}") };
        if measure.text_width(&candidate, size) > max_width && !current.is_empty() {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Font size that makes `line_count` lines fit in `available` pixels of height.
///
/// Returns `font_size` unchanged when the block already fits. Otherwise scales it
/// down proportionally (floored) but never below [`MIN_FONT_SIZE`].
#[must_use]
pub fn fit_font_size(line_count: usize, font_size: u32, available: f32) -> u32 {
    let total = line_count as f64 * f64::from(font_size) * f64::from(LINE_HEIGHT_RATIO);
    if total <= f64::from(available) {
        return font_size;
    }
    let adjusted = (f64::from(font_size) * f64::from(available) / total).floor() as u32;
    adjusted.max(MIN_FONT_SIZE.min(font_size))
}

/// Wrap, shrink and vertically center `text` on the canvas.
///
/// Line breaks are decided at the starting size and kept after shrinking, so a
/// smaller final size only ever narrows the lines.
pub fn layout<M: Measure + ?Sized>(text: &str, font_size: u32, measure: &M) -> TextBlock {
    let extent = usable_extent();
    let mut lines = wrap_words(text, font_size as f32, extent, measure);

    let size = fit_font_size(lines.len(), font_size, extent);
    let line_height = size as f32 * LINE_HEIGHT_RATIO;

    // Starting sizes at or below the floor never shrink, so this also covers them.
    let capacity = ((extent / line_height).floor() as usize).max(1);
    lines.truncate(capacity);

    let total = lines.len() as f32 * line_height;
    let first_center_y = (CANVAS_SIZE as f32 - total) / 2.0 + line_height / 2.0;

    TextBlock { lines, font_size: size, line_height, first_center_y }
}
